//! User identity and role types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform role. Fixed at signup; there is no role-change operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// HR identity, authorized to manage job posts and the applications they own.
    Hr,
    /// Candidate, submits applications through the public surface.
    #[default]
    Candidate,
}

impl Role {
    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hr => "hr",
            Role::Candidate => "candidate",
        }
    }

    /// Parse a role string. Unknown values are rejected rather than defaulted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hr" => Some(Role::Hr),
            "candidate" => Some(Role::Candidate),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user. The password hash never leaves the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document id, derived deterministically from the email address.
    pub id: String,
    pub name: String,
    pub email: String,
    /// Bcrypt hash. Skipped on serialization so it cannot leak into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public projection returned by auth endpoints.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// The public shape of a user: id, name and role only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse("hr"), Some(Role::Hr));
        assert_eq!(Role::parse("candidate"), Some(Role::Candidate));
        assert_eq!(Role::Hr.as_str(), "hr");
        assert_eq!(Role::Candidate.as_str(), "candidate");
    }

    #[test]
    fn test_role_rejects_unknown_values() {
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("HR"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: "u_abc".into(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: "$2b$10$secret".into(),
            role: Role::Hr,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password"));
    }
}
