// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::{error::AppError, session, state::AppState};

/// Who the current request belongs to.
/// Produced by `verify_jwt` and injected into request extensions by `auth_middleware`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub is_admin: bool,
}

/// Session token payload. Carries no `exp`: a token lives exactly as long as
/// the server-side session holding it.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    pub is_admin: bool,
    /// Issued-at as Unix timestamp.
    pub iat: u64,
}

/// Signs a session token for the given identity.
pub fn sign_jwt(identity: Identity, secret: &str) -> Result<String, AppError> {
    let issued_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs();

    let claims = Claims {
        user_id: identity.user_id,
        is_admin: identity.is_admin,
        iat: issued_at,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies a session token and decodes the identity it carries.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Identity, AppError> {
    let mut validation = Validation::default();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(Identity {
        user_id: token_data.claims.user_id,
        is_admin: token_data.claims.is_admin,
    })
}

/// Axum Middleware: Authentication.
///
/// Resolves the signed session cookie to its server-side token and verifies it.
/// On success the `Identity` is inserted into request extensions; on any
/// failure the caller is redirected to `/login`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(session_id) = session::session_id(&cookies, &state.cookie_key) else {
        return Redirect::to("/login").into_response();
    };

    let token = match state.sessions.load(&session_id).await {
        Ok(Some(token)) => token,
        Ok(None) => return Redirect::to("/login").into_response(),
        Err(e) => return e.into_response(),
    };

    match verify_jwt(&token, &state.config.jwt_secret) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(_) => {
            tracing::warn!("Rejected session with an invalid token");
            Redirect::to("/login").into_response()
        }
    }
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`. Non-admin identities get 403.
pub async fn admin_middleware(req: Request, next: Next) -> Response {
    match req.extensions().get::<Identity>() {
        Some(identity) if identity.is_admin => next.run(req).await,
        Some(_) => AppError::Forbidden("Access denied".to_string()).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}
