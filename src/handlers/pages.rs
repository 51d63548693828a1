// src/handlers/pages.rs

use axum::response::{Html, Redirect};

const LOGIN_PAGE: &str = include_str!("../../templates/login.html");
const REGISTER_PAGE: &str = include_str!("../../templates/register.html");

#[utoipa::path(
    get,
    path = "/",
    responses((status = 303, description = "Redirect to /login")),
    tag = "pages"
)]
pub async fn root() -> Redirect {
    Redirect::to("/login")
}

#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Login form", body = String, content_type = "text/html")),
    tag = "pages"
)]
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

#[utoipa::path(
    get,
    path = "/register",
    responses((status = 200, description = "Registration form", body = String, content_type = "text/html")),
    tag = "pages"
)]
pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}
