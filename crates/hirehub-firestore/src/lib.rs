//! Firestore REST API client.
//!
//! This crate provides:
//! - Typed repositories for users, job posts and applications
//! - Service account authentication via gcp_auth
//! - Emulator support for local development and tests
//! - Field-mask updates and retry logic

pub mod applications;
pub mod client;
pub mod error;
pub mod job_posts;
pub mod retry;
pub mod token_cache;
pub mod types;
pub mod users;

#[cfg(test)]
mod client_tests;

pub use applications::{application_doc_id, ApplicationRepository};
pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use job_posts::JobPostRepository;
pub use types::{Document, FromFirestoreValue, StructuredQuery, ToFirestoreValue, Value};
pub use users::{user_doc_id, UserRepository};
