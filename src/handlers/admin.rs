// src/handlers/admin.rs

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{attempt::ScoreEntry, question::CreateQuestionRequest},
    utils::{form::Payload, html::clean_html},
};

/// Lists every non-admin user with their best score (0 if none recorded).
/// Admin only.
#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Scores ordered by username", body = [ScoreEntry]),
        (status = 303, description = "Not logged in, redirect to /login"),
        (status = 403, description = "Access denied"),
        (status = 500, description = "Failed to load user scores")
    ),
    tag = "admin"
)]
pub async fn list_scores(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let scores = sqlx::query_as::<_, ScoreEntry>(
        r#"
        SELECT u.username, COALESCE(us.highest_score, 0) AS highest_score
        FROM users u
        LEFT JOIN user_scores us ON u.user_id = us.user_id
        WHERE u.is_admin = FALSE
        ORDER BY u.username
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch user scores: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(scores))
}

/// Creates a question together with its answer options.
/// Admin only.
#[utoipa::path(
    post,
    path = "/admin/questions",
    request_body = CreateQuestionRequest,
    responses(
        (status = 303, description = "Question created, redirect to /admin"),
        (status = 400, description = "Invalid question"),
        (status = 403, description = "Access denied"),
        (status = 500, description = "Failed to add question")
    ),
    tag = "admin"
)]
pub async fn create_question(
    State(pool): State<PgPool>,
    Payload(payload): Payload<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = pool.begin().await?;

    let question_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO questions (question_text) VALUES ($1) RETURNING question_id",
    )
    .bind(clean_html(&payload.question_text))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to add question: {:?}", e);
        AppError::from(e)
    })?;

    for answer in &payload.answers {
        sqlx::query(
            "INSERT INTO answers (question_id, answer_text, is_correct) VALUES ($1, $2, $3)",
        )
        .bind(question_id)
        .bind(clean_html(&answer.text))
        .bind(answer.is_correct)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to add answer for question {}: {:?}", question_id, e);
            AppError::from(e)
        })?;
    }

    tx.commit().await?;

    tracing::info!(
        question_id,
        answers = payload.answers.len(),
        "Question created"
    );

    Ok(Redirect::to("/admin"))
}
