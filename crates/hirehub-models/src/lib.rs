//! Shared data models for the HireHub backend.
//!
//! This crate provides Serde-serializable types for:
//! - Users and roles
//! - Job posts and their open/closed status
//! - Candidate applications and their status lifecycle
//! - Application payload validation (phone pattern, experience bounds)

pub mod application;
pub mod job_post;
pub mod user;

// Re-export common types
pub use application::{
    AiEvaluation, Application, ApplicationStatus, ApplicationSubmission, TransitionError,
};
pub use job_post::{JobPost, JobStatus, NewJobPost};
pub use user::{PublicUser, Role, User};
