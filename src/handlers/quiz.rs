// src/handlers/quiz.rs

use std::collections::{HashMap, HashSet};
use std::fmt;

use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::{
        attempt::{DashboardView, GradedAnswer, SubmitAnswersRequest, SubmittedAnswer},
        question::{AnswerKey, PublicAnswer, PublicQuestion, QuestionAnswerRow},
    },
    utils::{form::Payload, jwt::Identity},
};

/// Why a submitted pair could not be graded.
/// Any of these aborts the whole submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeError {
    UnknownQuestion(i64),
    MissingAnswer { question_id: i64 },
    UnknownAnswer(i64),
    AnswerMismatch { question_id: i64, answer_id: i64 },
}

impl fmt::Display for GradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeError::UnknownQuestion(id) => write!(f, "Invalid question ID: {}", id),
            GradeError::MissingAnswer { question_id } => {
                write!(f, "Answer ID missing for question {}", question_id)
            }
            GradeError::UnknownAnswer(id) => write!(f, "Invalid answer ID {}", id),
            GradeError::AnswerMismatch {
                question_id,
                answer_id,
            } => write!(
                f,
                "Answer {} does not belong to question {}",
                answer_id, question_id
            ),
        }
    }
}

impl From<GradeError> for AppError {
    fn from(err: GradeError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Groups joined question/answer rows by question, keeping row order.
/// Rows are expected sorted by question id.
fn group_questions(rows: Vec<QuestionAnswerRow>) -> Vec<PublicQuestion> {
    let mut questions: Vec<PublicQuestion> = Vec::new();

    for row in rows {
        let answer = PublicAnswer {
            answer_id: row.answer_id,
            answer_text: row.answer_text,
        };
        match questions.last_mut() {
            Some(last) if last.question_id == row.question_id => last.answers.push(answer),
            _ => questions.push(PublicQuestion {
                question_id: row.question_id,
                question_text: row.question_text,
                answers: vec![answer],
            }),
        }
    }

    questions
}

/// A question may be answered at most once per submission.
fn ensure_distinct_questions(answers: &[SubmittedAnswer]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(answers.len());
    for answer in answers {
        if !seen.insert(answer.question_id) {
            return Err(AppError::BadRequest(format!(
                "Question {} answered more than once",
                answer.question_id
            )));
        }
    }
    Ok(())
}

/// Grades a submission against the answer key.
///
/// Returns the score (one point per correct answer) and one graded row per
/// submitted pair. Fails on the first pair that does not check out.
fn grade_submission(
    submitted: &[SubmittedAnswer],
    valid_question_ids: &HashSet<i64>,
    answer_keys: &HashMap<i64, AnswerKey>,
) -> Result<(i32, Vec<GradedAnswer>), GradeError> {
    let mut score = 0;
    let mut graded = Vec::with_capacity(submitted.len());

    for pair in submitted {
        if !valid_question_ids.contains(&pair.question_id) {
            return Err(GradeError::UnknownQuestion(pair.question_id));
        }

        if pair.answer_id == 0 {
            return Err(GradeError::MissingAnswer {
                question_id: pair.question_id,
            });
        }

        let key = answer_keys
            .get(&pair.answer_id)
            .ok_or(GradeError::UnknownAnswer(pair.answer_id))?;

        if key.question_id != pair.question_id {
            return Err(GradeError::AnswerMismatch {
                question_id: pair.question_id,
                answer_id: pair.answer_id,
            });
        }

        if key.is_correct {
            score += 1;
        }

        graded.push(GradedAnswer {
            question_id: pair.question_id,
            selected_answer: pair.answer_id,
            is_correct: key.is_correct,
        });
    }

    Ok((score, graded))
}

/// Shows either the user's best score (answers on record) or the quiz.
#[utoipa::path(
    get,
    path = "/user-dashboard",
    responses(
        (status = 200, description = "Score or question set", body = DashboardView),
        (status = 303, description = "Not logged in, redirect to /login"),
        (status = 500, description = "Failed to load user dashboard")
    ),
    tag = "quiz"
)]
pub async fn dashboard(
    State(pool): State<PgPool>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let has_answers = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM user_answers WHERE user_id = $1)",
    )
    .bind(identity.user_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to check recorded answers: {:?}", e);
        AppError::from(e)
    })?;

    if has_answers {
        let highest_score = sqlx::query_scalar::<_, i32>(
            "SELECT highest_score FROM user_scores WHERE user_id = $1",
        )
        .bind(identity.user_id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch highest score: {:?}", e);
            AppError::from(e)
        })?
        .unwrap_or(0);

        return Ok(Json(DashboardView::Taken { highest_score }));
    }

    let rows = sqlx::query_as::<_, QuestionAnswerRow>(
        r#"
        SELECT q.question_id, q.question_text, a.answer_id, a.answer_text
        FROM questions q
        JOIN answers a ON q.question_id = a.question_id
        ORDER BY q.question_id, a.answer_id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch quiz questions: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(DashboardView::Pending {
        questions: group_questions(rows),
    }))
}

/// Grades a quiz attempt and records it.
///
/// * Every pair must reference a known question and one of its answers.
/// * One `user_answers` row per pair, written in the same transaction.
/// * The best score only ever goes up.
#[utoipa::path(
    post,
    path = "/submit-answers",
    request_body = SubmitAnswersRequest,
    responses(
        (status = 303, description = "Attempt recorded, redirect to /user-dashboard"),
        (status = 400, description = "Invalid answer submission"),
        (status = 500, description = "Unknown question/answer or storage failure; nothing recorded")
    ),
    tag = "quiz"
)]
pub async fn submit_answers(
    State(pool): State<PgPool>,
    Extension(identity): Extension<Identity>,
    Payload(req): Payload<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.answers.is_empty() {
        return Err(AppError::BadRequest("Invalid answer submission".to_string()));
    }
    ensure_distinct_questions(&req.answers)?;

    let mut tx = pool.begin().await?;

    let valid_question_ids: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT question_id FROM questions")
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

    let answer_ids: Vec<i64> = req.answers.iter().map(|a| a.answer_id).collect();
    let answer_keys: HashMap<i64, AnswerKey> = sqlx::query_as::<_, AnswerKey>(
        "SELECT answer_id, question_id, is_correct FROM answers WHERE answer_id = ANY($1)",
    )
    .bind(answer_ids)
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(|key| (key.answer_id, key))
    .collect();

    let (score, graded) = grade_submission(&req.answers, &valid_question_ids, &answer_keys)
        .map_err(|e| {
            tracing::error!(user_id = identity.user_id, "Rejected submission: {}", e);
            AppError::from(e)
        })?;

    let mut insert = QueryBuilder::<Postgres>::new(
        "INSERT INTO user_answers (user_id, question_id, selected_answer, is_correct) ",
    );
    insert.push_values(&graded, |mut row, answer| {
        row.push_bind(identity.user_id)
            .push_bind(answer.question_id)
            .push_bind(answer.selected_answer)
            .push_bind(answer.is_correct);
    });
    insert.build().execute(&mut *tx).await.map_err(|e| {
        tracing::error!("Failed to record user answers: {:?}", e);
        AppError::from(e)
    })?;

    let existing_best = sqlx::query_scalar::<_, i32>(
        "SELECT highest_score FROM user_scores WHERE user_id = $1",
    )
    .bind(identity.user_id)
    .fetch_optional(&mut *tx)
    .await?
    .unwrap_or(0);

    if score > existing_best {
        upsert_best_score(&mut *tx, identity.user_id, score)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert best score: {:?}", e);
                AppError::from(e)
            })?;
    }

    tx.commit().await?;

    tracing::info!(
        user_id = identity.user_id,
        score,
        answered = graded.len(),
        "Quiz attempt recorded"
    );

    Ok(Redirect::to("/user-dashboard"))
}

/// Stores `score` as the user's best unless a higher one is already stored.
/// The comparison happens inside the statement, so a concurrent writer with a
/// higher score is never overwritten. Returns the number of rows written.
pub async fn upsert_best_score<'e, E>(executor: E, user_id: i64, score: i32) -> Result<u64, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO user_scores (user_id, highest_score)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET
            highest_score = EXCLUDED.highest_score,
            updated_at = NOW()
        WHERE user_scores.highest_score < EXCLUDED.highest_score
        "#,
    )
    .bind(user_id)
    .bind(score)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Clears the user's recorded answers so the quiz can be retaken.
/// The best score is kept.
#[utoipa::path(
    post,
    path = "/reset-quiz",
    responses(
        (status = 303, description = "Answers cleared, redirect to /user-dashboard"),
        (status = 500, description = "Failed to reset quiz")
    ),
    tag = "quiz"
)]
pub async fn reset_quiz(
    State(pool): State<PgPool>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM user_answers WHERE user_id = $1")
        .bind(identity.user_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reset quiz: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!(
        user_id = identity.user_id,
        removed = result.rows_affected(),
        "Quiz reset"
    );

    Ok(Redirect::to("/user-dashboard"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(answer_id: i64, question_id: i64, is_correct: bool) -> (i64, AnswerKey) {
        (
            answer_id,
            AnswerKey {
                answer_id,
                question_id,
                is_correct,
            },
        )
    }

    fn pair(question_id: i64, answer_id: i64) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            answer_id,
        }
    }

    fn fixture() -> (HashSet<i64>, HashMap<i64, AnswerKey>) {
        let questions = HashSet::from([1, 2, 3]);
        let keys = HashMap::from([
            key(10, 1, true),
            key(11, 1, false),
            key(20, 2, false),
            key(21, 2, true),
            key(30, 3, true),
        ]);
        (questions, keys)
    }

    #[test]
    fn scores_one_point_per_correct_answer() {
        let (questions, keys) = fixture();
        let (score, graded) =
            grade_submission(&[pair(1, 10), pair(2, 20)], &questions, &keys).unwrap();

        assert_eq!(score, 1);
        assert_eq!(
            graded,
            vec![
                GradedAnswer { question_id: 1, selected_answer: 10, is_correct: true },
                GradedAnswer { question_id: 2, selected_answer: 20, is_correct: false },
            ]
        );
    }

    #[test]
    fn perfect_and_zero_scores() {
        let (questions, keys) = fixture();
        let all_right = [pair(1, 10), pair(2, 21), pair(3, 30)];
        assert_eq!(grade_submission(&all_right, &questions, &keys).unwrap().0, 3);

        let all_wrong = [pair(1, 11), pair(2, 20)];
        let (score, graded) = grade_submission(&all_wrong, &questions, &keys).unwrap();
        assert_eq!(score, 0);
        assert_eq!(graded.len(), 2);
    }

    #[test]
    fn unknown_question_aborts() {
        let (questions, keys) = fixture();
        let err = grade_submission(&[pair(1, 10), pair(99, 10)], &questions, &keys).unwrap_err();
        assert_eq!(err, GradeError::UnknownQuestion(99));
    }

    #[test]
    fn zero_answer_id_aborts() {
        let (questions, keys) = fixture();
        let err = grade_submission(&[pair(2, 0)], &questions, &keys).unwrap_err();
        assert_eq!(err, GradeError::MissingAnswer { question_id: 2 });
    }

    #[test]
    fn unknown_answer_aborts() {
        let (questions, keys) = fixture();
        let err = grade_submission(&[pair(1, 10), pair(2, 999)], &questions, &keys).unwrap_err();
        assert_eq!(err, GradeError::UnknownAnswer(999));
    }

    #[test]
    fn answer_from_another_question_aborts() {
        let (questions, keys) = fixture();
        let err = grade_submission(&[pair(2, 10)], &questions, &keys).unwrap_err();
        assert_eq!(
            err,
            GradeError::AnswerMismatch { question_id: 2, answer_id: 10 }
        );
    }

    #[test]
    fn grade_errors_are_internal() {
        let err: AppError = GradeError::UnknownAnswer(5).into();
        match err {
            AppError::InternalServerError(msg) => assert_eq!(msg, "Invalid answer ID 5"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn duplicate_questions_are_rejected() {
        assert!(ensure_distinct_questions(&[pair(1, 10), pair(2, 20)]).is_ok());
        let err = ensure_distinct_questions(&[pair(1, 10), pair(1, 11)]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn groups_rows_by_question() {
        let row = |q: i64, text: &str, a: i64, answer: &str| QuestionAnswerRow {
            question_id: q,
            question_text: text.to_string(),
            answer_id: a,
            answer_text: answer.to_string(),
        };
        let grouped = group_questions(vec![
            row(1, "First?", 10, "yes"),
            row(1, "First?", 11, "no"),
            row(2, "Second?", 20, "maybe"),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].question_text, "First?");
        assert_eq!(
            grouped[0].answers.iter().map(|a| a.answer_id).collect::<Vec<_>>(),
            vec![10, 11]
        );
        assert_eq!(grouped[1].answers.len(), 1);
        assert!(group_questions(vec![]).is_empty());
    }
}
