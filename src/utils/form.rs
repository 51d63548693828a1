// src/utils/form.rs

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use crate::error::AppError;

/// Request body extractor accepting either JSON or an url-encoded HTML form.
/// Any rejection is reported as 400.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Payload(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Payload(value))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

/// Reads a checkbox-style flag: a JSON boolean, or one of `on`, `true`, `1`,
/// `yes` (case-insensitive). Anything else is false.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        ),
    })
}
