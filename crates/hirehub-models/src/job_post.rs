//! Job post model and open/closed status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Job post visibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepting applications and visible on the public board.
    #[default]
    Open,
    /// Hidden from the public listing; still viewable by direct id.
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(JobStatus::Open),
            "closed" => Some(JobStatus::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A job posting. Owned by the HR user that created it; ownership never moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPost {
    pub id: String,
    pub title: String,
    pub description: String,
    pub job_type: String,
    pub location: String,
    pub no_of_openings: u32,
    pub deadline: DateTime<Utc>,
    /// Owning user id. Set once at creation.
    pub created_by: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl JobPost {
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open
    }
}

/// Payload for creating a job post. All fields are required.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewJobPost {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "jobType is required"))]
    pub job_type: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[validate(range(min = 1, message = "noOfOpenings must be at least 1"))]
    pub no_of_openings: u32,
    pub deadline: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_post() -> NewJobPost {
        NewJobPost {
            title: "Backend Engineer".into(),
            description: "Rust services".into(),
            job_type: "full-time".into(),
            location: "Remote".into(),
            no_of_openings: 2,
            deadline: Utc::now() + chrono::Duration::days(30),
        }
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(JobStatus::parse("open"), Some(JobStatus::Open));
        assert_eq!(JobStatus::parse("closed"), Some(JobStatus::Closed));
        assert_eq!(JobStatus::parse("archived"), None);
        assert_eq!(JobStatus::default(), JobStatus::Open);
    }

    #[test]
    fn test_new_job_post_requires_fields() {
        assert!(valid_post().validate().is_ok());

        let mut missing_title = valid_post();
        missing_title.title = String::new();
        assert!(missing_title.validate().is_err());

        let mut zero_openings = valid_post();
        zero_openings.no_of_openings = 0;
        assert!(zero_openings.validate().is_err());
    }
}
