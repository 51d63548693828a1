// src/handlers/auth.rs

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use sqlx::PgPool;
use tower_cookies::Cookies;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, User},
    session,
    state::AppState,
    utils::{
        form::Payload,
        hash::{hash_password, verify_against_dummy, verify_password},
        jwt::{Identity, sign_jwt},
    },
};

fn invalid_credentials() -> AppError {
    AppError::AuthError("Invalid credentials".to_string())
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it, then redirects to the
/// login page. A taken username is a 400, not a 500.
#[utoipa::path(
    post,
    path = "/register",
    request_body = CreateUserRequest,
    responses(
        (status = 303, description = "User created, redirect to /login"),
        (status = 400, description = "Invalid input or username already exists"),
        (status = 500, description = "User registration failed")
    ),
    tag = "auth"
)]
pub async fn register(
    State(pool): State<PgPool>,
    Payload(payload): Payload<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;

    sqlx::query(
        r#"
        INSERT INTO users (username, password, is_admin)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(&payload.username)
    .bind(hashed_password)
    .bind(payload.is_admin)
    .execute(&pool)
    .await
    .map_err(|e| {
        if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
            AppError::BadRequest("Username already exists".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(username = %payload.username, is_admin = payload.is_admin, "User registered");

    Ok(Redirect::to("/login"))
}

/// Authenticates a user and opens a session.
///
/// The signed token is kept server-side; the browser only receives the
/// session id in a signed cookie. Admins land on `/admin`, everyone else on
/// `/user-dashboard`.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Logged in, redirect to /admin or /user-dashboard"),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Login failed")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Payload(payload): Payload<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, password, is_admin, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(&payload.username)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::from(e)
    })?;

    // Unknown users still pay for a hash verification.
    let Some(user) = user else {
        verify_against_dummy(&payload.password);
        return Err(invalid_credentials());
    };

    if !verify_password(&payload.password, &user.password)? {
        return Err(invalid_credentials());
    }

    let identity = Identity {
        user_id: user.user_id,
        is_admin: user.is_admin,
    };
    let token = sign_jwt(identity, &state.config.jwt_secret)?;

    if let Some(previous) = session::session_id(&cookies, &state.cookie_key) {
        state.sessions.destroy(&previous).await?;
    }
    let session_id = state.sessions.create(token).await?;
    session::set_session_cookie(&cookies, &state.cookie_key, session_id);

    tracing::info!(user_id = user.user_id, is_admin = user.is_admin, "User logged in");

    let target = if user.is_admin {
        "/admin"
    } else {
        "/user-dashboard"
    };
    Ok(Redirect::to(target))
}

/// Destroys the server-side session and clears the cookie.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 303, description = "Session destroyed, redirect to /login"),
        (status = 500, description = "Logout failed")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(session_id) = session::session_id(&cookies, &state.cookie_key) {
        state.sessions.destroy(&session_id).await.map_err(|e| {
            tracing::error!("Error destroying session during logout: {}", e);
            e
        })?;
    }

    session::clear_session_cookie(&cookies, &state.cookie_key);

    Ok(Redirect::to("/login"))
}
