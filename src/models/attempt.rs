// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::question::PublicQuestion;

/// One selected answer in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub answer_id: i64,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<SubmittedAnswer>,
}

/// A graded answer, ready to be written to 'user_answers'.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub selected_answer: i64,
    pub is_correct: bool,
}

/// Row of the admin score list: non-admin users joined with 'user_scores'.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub username: String,
    pub highest_score: i32,
}

/// What the user dashboard shows.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DashboardView {
    /// Answers are on record: show the best score.
    #[serde(rename_all = "camelCase")]
    Taken { highest_score: i32 },
    /// No answers on record: show the quiz.
    Pending { questions: Vec<PublicQuestion> },
}
