//! Request handlers.

pub mod applications;
pub mod auth;
pub mod health;
pub mod job_posts;
pub mod resumes;

pub use health::{health, ready};
