// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    docs,
    handlers::{admin, auth, pages, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public routes: entry pages, register, login, logout, API document.
/// * Session routes: dashboard, submission, reset (behind the auth gate).
/// * Admin routes: behind the auth gate, then the admin check.
pub fn create_router(state: AppState) -> Router {
    let origin = HeaderValue::from_str(&format!("http://localhost:{}", state.config.port))
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));

    let cors = CorsLayer::new()
        .allow_origin([origin, HeaderValue::from_static("http://127.0.0.1:3000")])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let public_routes = Router::new()
        .route("/", get(pages::root))
        .route("/login", get(pages::login_page).post(auth::login))
        .route("/register", get(pages::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/api-docs/openapi.json", get(docs::openapi_json));

    let session_routes = Router::new()
        .route("/user-dashboard", get(quiz::dashboard))
        .route("/submit-answers", post(quiz::submit_answers))
        .route("/reset-quiz", post(quiz::reset_quiz))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/admin", get(admin::list_scores))
        .route("/admin/questions", post(admin::create_question))
        // Double middleware protection: Auth first, then Admin check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        // Global Middleware (applied from outside in)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
