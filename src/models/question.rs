// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::form::deserialize_flag;

/// One row of `questions JOIN answers`, as read for the quiz page.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionAnswerRow {
    pub question_id: i64,
    pub question_text: String,
    pub answer_id: i64,
    pub answer_text: String,
}

/// Answer key entry from the 'answers' table, used when grading.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerKey {
    pub answer_id: i64,
    pub question_id: i64,
    pub is_correct: bool,
}

/// Answer option as shown to a quiz taker (correctness hidden).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicAnswer {
    pub answer_id: i64,
    pub answer_text: String,
}

/// Question with its answer options, as shown to a quiz taker.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub question_id: i64,
    pub question_text: String,
    pub answers: Vec<PublicAnswer>,
}

/// DTO for one answer option of a new question.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAnswer {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    /// `true` or an `"on"`/`"off"` style marker.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_correct: bool,
}

/// DTO for creating a question together with its answers.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,
    #[validate(nested)]
    #[serde(default)]
    pub answers: Vec<NewAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_on_off_markers() {
        let req: CreateQuestionRequest = serde_json::from_str(
            r#"{
                "questionText": "Capital of France?",
                "answers": [
                    {"text": "Paris", "isCorrect": "on"},
                    {"text": "Lyon", "isCorrect": "off"},
                    {"text": "Nice"}
                ]
            }"#,
        )
        .unwrap();

        let flags: Vec<bool> = req.answers.iter().map(|a| a.is_correct).collect();
        assert_eq!(flags, vec![true, false, false]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_question_text_is_invalid() {
        let req = CreateQuestionRequest {
            question_text: String::new(),
            answers: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_answer_text_is_invalid() {
        let req = CreateQuestionRequest {
            question_text: "Q".to_string(),
            answers: vec![NewAnswer {
                text: String::new(),
                is_correct: true,
            }],
        };
        assert!(req.validate().is_err());
    }
}
