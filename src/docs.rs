// src/docs.rs

use axum::Json;
use utoipa::OpenApi;

use crate::handlers::{admin, auth, pages, quiz};
use crate::models::{
    attempt::{DashboardView, ScoreEntry, SubmitAnswersRequest, SubmittedAnswer},
    question::{CreateQuestionRequest, NewAnswer, PublicAnswer, PublicQuestion},
    user::{CreateUserRequest, LoginRequest},
};

#[derive(OpenApi)]
#[openapi(
    info(title = "quizgate", description = "Quiz taking with session login and admin scoring"),
    paths(
        pages::root,
        pages::login_page,
        pages::register_page,
        auth::register,
        auth::login,
        auth::logout,
        quiz::dashboard,
        quiz::submit_answers,
        quiz::reset_quiz,
        admin::list_scores,
        admin::create_question,
    ),
    components(schemas(
        CreateUserRequest,
        LoginRequest,
        SubmittedAnswer,
        SubmitAnswersRequest,
        DashboardView,
        PublicQuestion,
        PublicAnswer,
        ScoreEntry,
        CreateQuestionRequest,
        NewAnswer,
    )),
    tags(
        (name = "pages", description = "Entry pages"),
        (name = "auth", description = "Registration and sessions"),
        (name = "quiz", description = "Taking the quiz"),
        (name = "admin", description = "Question management and scores")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
