// src/lib.rs

pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod utils;

pub use routes::create_router;
