//! S3 resume storage client.
//!
//! This crate provides:
//! - Presigned PUT URL generation for direct browser uploads
//! - Resume download for authorized viewing
//! - Object key construction with file-name validation

pub mod client;
pub mod error;
pub mod keys;

pub use client::{S3Client, S3Config, DEFAULT_UPLOAD_URL_TTL};
pub use error::{StorageError, StorageResult};
pub use keys::{is_resume_key, is_valid_file_name, resume_key, RESUME_PREFIX};
