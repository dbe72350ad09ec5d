//! # mediahub-api
//!
//! HTTP API layer for MediaHub built on Axum.
//!
//! Provides the folder endpoints, bearer-token owner extraction,
//! middleware (CORS, logging, timeouts), DTOs, and error mapping.

pub mod app;
pub mod auth;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
