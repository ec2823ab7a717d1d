//! Resume object key construction and validation.

use chrono::Utc;

use crate::error::{StorageError, StorageResult};

/// Prefix under which all resume objects live.
pub const RESUME_PREFIX: &str = "resumes/";

/// Validate a client-supplied file name.
///
/// Valid format: alphanumeric, hyphens, underscores, dots, spaces.
/// No path traversal.
pub fn is_valid_file_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 256 {
        return false;
    }
    // Block path traversal
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == ' ')
}

/// Build a collision-free object key for an uploaded resume.
///
/// Keys look like `resumes/1700000000000_cv.pdf`: a millisecond timestamp
/// keeps two candidates uploading `cv.pdf` from clobbering each other.
pub fn resume_key(file_name: &str) -> StorageResult<String> {
    if !is_valid_file_name(file_name) {
        return Err(StorageError::invalid_key(format!(
            "Invalid file name: {file_name:?}"
        )));
    }
    let sanitized = file_name.replace(' ', "_");
    Ok(format!(
        "{}{}_{}",
        RESUME_PREFIX,
        Utc::now().timestamp_millis(),
        sanitized
    ))
}

/// Check that a stored key points into the resume prefix.
pub fn is_resume_key(key: &str) -> bool {
    key.starts_with(RESUME_PREFIX) && !key.contains("..") && key.len() > RESUME_PREFIX.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_file_names() {
        assert!(is_valid_file_name("cv.pdf"));
        assert!(is_valid_file_name("Jane Doe Resume-2026_final.pdf"));
        assert!(!is_valid_file_name(""));
        assert!(!is_valid_file_name("../etc/passwd"));
        assert!(!is_valid_file_name("path/to/cv.pdf"));
        assert!(!is_valid_file_name("cv\\..\\secret.pdf"));
        assert!(!is_valid_file_name(&"x".repeat(300)));
    }

    #[test]
    fn test_resume_key_shape() {
        let key = resume_key("Jane Doe.pdf").unwrap();
        assert!(key.starts_with("resumes/"));
        assert!(key.ends_with("_Jane_Doe.pdf"));
        assert!(is_resume_key(&key));
    }

    #[test]
    fn test_resume_key_rejects_traversal() {
        assert!(resume_key("../cv.pdf").is_err());
        assert!(!is_resume_key("exports/cv.pdf"));
        assert!(!is_resume_key("resumes/"));
        assert!(!is_resume_key("resumes/../secret"));
    }
}
