// src/session/mod.rs

//! Server-side session state.
//!
//! The browser only ever holds a random session id in a signed cookie; the
//! session token itself stays in a `SessionStore`.

mod memory;
mod postgres;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use async_trait::async_trait;
use base64::Engine;
use sha2::{Digest, Sha256, Sha512};
use tower_cookies::{Cookie, Cookies, Key, cookie::SameSite};

use crate::error::AppError;

pub use memory::MemorySessionStore;
pub use postgres::PgSessionStore;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "quizgate_session";

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `token` under a fresh session id and returns the id.
    async fn create(&self, token: String) -> Result<String, AppError>;

    /// Returns the token of a live session, `None` if unknown or expired.
    async fn load(&self, session_id: &str) -> Result<Option<String>, AppError>;

    /// Removes the session. Unknown ids are not an error.
    async fn destroy(&self, session_id: &str) -> Result<(), AppError>;
}

/// 32 random bytes from the OS, URL-safe base64 without padding.
pub(crate) fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn hash_session_id(session_id: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    hasher.finalize().to_vec()
}

/// Derives the 64-byte cookie signing key from the configured secret.
pub fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Reads the session id from the signed cookie. A forged or unsigned cookie
/// reads as absent.
pub fn session_id(cookies: &Cookies, key: &Key) -> Option<String> {
    cookies
        .signed(key)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
}

pub fn set_session_cookie(cookies: &Cookies, key: &Key, session_id: String) {
    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookies.signed(key).add(cookie);
}

pub fn clear_session_cookie(cookies: &Cookies, key: &Key) {
    let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookies.signed(key).remove(cookie);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_random_url_safe() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(a, b);

        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&a)
            .unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn hashing_is_stable() {
        assert_eq!(hash_session_id("abc"), hash_session_id("abc"));
        assert_ne!(hash_session_id("abc"), hash_session_id("abd"));
        assert_eq!(hash_session_id("abc").len(), 32);
    }

    #[test]
    fn cookie_key_depends_on_secret() {
        let a = cookie_key("0123456789abcdef0123456789abcdef");
        let b = cookie_key("0123456789abcdef0123456789abcdef");
        let c = cookie_key("fedcba9876543210fedcba9876543210");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
