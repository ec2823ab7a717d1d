//! Candidate application model, validation and status lifecycle.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Loose international phone pattern: optional leading `+`, then at least
/// seven digits, spaces or hyphens.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s-]{7,}$").expect("valid phone pattern"));

/// Application status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Freshly submitted, awaiting triage.
    #[default]
    Applied,
    /// Picked for further consideration.
    Shortlisted,
    /// Declined. May be reverted to Applied.
    Rejected,
    /// Offer made. Terminal.
    Selected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Selected => "selected",
        }
    }

    /// Parse a status string. Anything outside the enum is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "applied" => Some(ApplicationStatus::Applied),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "rejected" => Some(ApplicationStatus::Rejected),
            "selected" => Some(ApplicationStatus::Selected),
            _ => None,
        }
    }

    /// Whether a transition to `next` is permitted.
    ///
    /// Selected is terminal. Rejected can only be reverted to Applied, which is
    /// the one revert the HR dashboard exposes.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        match (self, next) {
            (Applied, Shortlisted) | (Applied, Rejected) => true,
            (Shortlisted, Selected) | (Shortlisted, Rejected) | (Shortlisted, Applied) => true,
            (Rejected, Applied) => true,
            _ => false,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Selected)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rejected status transition.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot move application from {from} to {to}")]
pub struct TransitionError {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

/// Structured resume evaluation produced by an external process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiEvaluation {
    pub score: Option<f64>,
    pub match_percentage: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

/// A candidate application bound to exactly one job post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Document id, derived deterministically from (job post, candidate email).
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub experience: u32,
    /// Referenced job post id.
    pub job_post: String,
    /// Denormalized owner of the referenced job post. Basis for HR ownership
    /// checks without a second lookup.
    pub job_owner: String,
    /// Key of the resume blob in object storage. The gateway owns the bytes.
    pub s3_file_key: String,
    pub status: ApplicationStatus,
    pub interview_date: Option<DateTime<Utc>>,
    pub offer_letter: bool,
    pub immediate_joiner: bool,
    pub ai_evaluation: Option<AiEvaluation>,
    #[serde(default)]
    pub notes: Vec<String>,
    pub applied_at: DateTime<Utc>,
}

impl Application {
    /// Apply a status change, enforcing the transition table.
    pub fn transition_to(&mut self, next: ApplicationStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Public apply payload. Validated before any store round-trip.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmission {
    #[validate(length(min = 1, message = "firstName is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "lastName is required"))]
    pub last_name: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(custom(function = validate_phone))]
    pub phone: String,
    #[validate(range(max = 99, message = "experience must be between 0 and 99"))]
    pub experience: u32,
    #[validate(length(min = 1, message = "jobPost is required"))]
    pub job_post: String,
    #[validate(length(min = 1, message = "s3FileKey is required"))]
    pub s3_file_key: String,
    #[serde(default)]
    pub immediate_joiner: bool,
}

fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if PHONE_PATTERN.is_match(phone) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("phone")
            .with_message(format!("{phone} is not a valid phone number").into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_submission() -> ApplicationSubmission {
        ApplicationSubmission {
            first_name: "Ravi".into(),
            last_name: "Kumar".into(),
            email: "ravi@example.com".into(),
            phone: "+91 98765-43210".into(),
            experience: 4,
            job_post: "j1".into(),
            s3_file_key: "resumes/1700000000000_cv.pdf".into(),
            immediate_joiner: false,
        }
    }

    #[test]
    fn test_status_parse_rejects_arbitrary_strings() {
        assert_eq!(ApplicationStatus::parse("shortlisted"), Some(ApplicationStatus::Shortlisted));
        assert_eq!(ApplicationStatus::parse("hired"), None);
        assert_eq!(ApplicationStatus::parse("SELECTED"), None);
    }

    #[test]
    fn test_transition_table() {
        use ApplicationStatus::*;
        assert!(Applied.can_transition_to(Shortlisted));
        assert!(Applied.can_transition_to(Rejected));
        assert!(!Applied.can_transition_to(Selected));

        assert!(Shortlisted.can_transition_to(Selected));
        assert!(Shortlisted.can_transition_to(Applied));

        // Rejected may only be reverted
        assert!(Rejected.can_transition_to(Applied));
        assert!(!Rejected.can_transition_to(Selected));

        // Selected is terminal
        assert!(!Selected.can_transition_to(Applied));
        assert!(!Selected.can_transition_to(Rejected));
        assert!(Selected.is_terminal());
    }

    #[test]
    fn test_transition_to_updates_or_rejects() {
        let mut app = Application {
            id: "a1".into(),
            first_name: "Ravi".into(),
            last_name: "Kumar".into(),
            email: "ravi@example.com".into(),
            phone: "+911234567".into(),
            experience: 4,
            job_post: "j1".into(),
            job_owner: "u1".into(),
            s3_file_key: "resumes/x.pdf".into(),
            status: ApplicationStatus::Applied,
            interview_date: None,
            offer_letter: false,
            immediate_joiner: false,
            ai_evaluation: None,
            notes: vec![],
            applied_at: Utc::now(),
        };

        app.transition_to(ApplicationStatus::Shortlisted).unwrap();
        app.transition_to(ApplicationStatus::Selected).unwrap();

        let err = app.transition_to(ApplicationStatus::Applied).unwrap_err();
        assert_eq!(err.from, ApplicationStatus::Selected);
        assert_eq!(app.status, ApplicationStatus::Selected);
    }

    #[test]
    fn test_phone_validation() {
        assert!(valid_submission().validate().is_ok());

        for bad in ["12345", "abc-def-ghij", "", "+"] {
            let mut sub = valid_submission();
            sub.phone = bad.into();
            assert!(sub.validate().is_err(), "phone {bad:?} should be rejected");
        }

        for good in ["1234567", "+1 555 000 1234", "079-1234-5678"] {
            let mut sub = valid_submission();
            sub.phone = good.into();
            assert!(sub.validate().is_ok(), "phone {good:?} should be accepted");
        }
    }

    #[test]
    fn test_experience_bounds() {
        let mut sub = valid_submission();
        sub.experience = 99;
        assert!(sub.validate().is_ok());
        sub.experience = 100;
        assert!(sub.validate().is_err());
    }
}
