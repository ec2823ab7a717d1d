//! Axum HTTP API server.
//!
//! This crate provides:
//! - Public job board and application submission
//! - Cookie-session auth with an HR role gate
//! - Job post and application management for HR users
//! - Presigned resume uploads and ownership-checked downloads
//! - Rate limiting, security headers and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
