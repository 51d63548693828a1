// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Default lifetime of a login session (one day).
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 86_400;

/// Upper bound on the session lifetime (one year).
pub const MAX_SESSION_TTL_SECONDS: i64 = 31_536_000;

/// Minimum length of `SESSION_SECRET`, needed to derive the cookie signing key.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Where server-side session state lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Postgres,
}

impl FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "postgres" => Ok(SessionBackend::Postgres),
            other => Err(format!("unknown session backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub session_secret: String,
    pub session_backend: SessionBackend,
    pub session_ttl_seconds: i64,
    pub port: u16,
    pub rust_log: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Reads configuration from the process environment (and `.env`).
    ///
    /// Panics when a required secret is missing: the server must not start
    /// with a guessable signing key.
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let session_secret = env::var("SESSION_SECRET")
            .expect("SESSION_SECRET must be set");

        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            panic!(
                "SESSION_SECRET must be at least {} bytes long",
                MIN_SESSION_SECRET_LEN
            );
        }

        let session_backend = env::var("SESSION_BACKEND")
            .map(|v| v.parse().expect("SESSION_BACKEND must be 'memory' or 'postgres'"))
            .unwrap_or(SessionBackend::Memory);

        let session_ttl_seconds = env::var("SESSION_TTL_SECONDS")
            .map(|v| v.parse().expect("SESSION_TTL_SECONDS must be an integer"))
            .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);

        if !(1..=MAX_SESSION_TTL_SECONDS).contains(&session_ttl_seconds) {
            panic!(
                "SESSION_TTL_SECONDS must be between 1 and {}",
                MAX_SESSION_TTL_SECONDS
            );
        }

        let port = env::var("PORT")
            .map(|v| v.parse().expect("PORT must be a valid port number"))
            .unwrap_or(3000);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let admin_username = env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());

        Self {
            database_url,
            jwt_secret,
            session_secret,
            session_backend,
            session_ttl_seconds,
            port,
            rust_log,
            admin_username,
            admin_password,
        }
    }
}
