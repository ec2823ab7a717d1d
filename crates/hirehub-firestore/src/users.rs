//! User repository.
//!
//! User documents live at `users/{id}` where the id is derived
//! deterministically from the lowercased email address. Email uniqueness is
//! therefore a document-id conflict at the store, not an index the
//! application has to maintain.

use std::collections::HashMap;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::info;

use hirehub_models::{Role, User};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, FromFirestoreValue, ToFirestoreValue, Value};

const COLLECTION: &str = "users";

/// Derive the document id for an email address.
///
/// Lowercased and hashed so the id is stable regardless of address casing
/// and always a legal Firestore document id.
pub fn user_doc_id(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("u_{}", &hex[..32])
}

/// Repository for user documents.
pub struct UserRepository {
    client: FirestoreClient,
}

impl UserRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create a user. Fails with `AlreadyExists` when the email is taken.
    pub async fn create(&self, user: &User) -> FirestoreResult<()> {
        self.client
            .create_document(COLLECTION, &user.id, user_to_fields(user))
            .await?;
        info!(user_id = %user.id, role = %user.role, "Created user");
        Ok(())
    }

    /// Get a user by id.
    pub async fn get(&self, id: &str) -> FirestoreResult<Option<User>> {
        match self.client.get_document(COLLECTION, id).await? {
            Some(doc) => Ok(Some(document_to_user(&doc)?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email address.
    pub async fn get_by_email(&self, email: &str) -> FirestoreResult<Option<User>> {
        self.get(&user_doc_id(email)).await
    }
}

// ============================================================================
// Field Conversion Helpers
// ============================================================================

fn user_to_fields(user: &User) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), user.name.to_firestore_value());
    fields.insert("email".to_string(), user.email.to_firestore_value());
    fields.insert(
        "password_hash".to_string(),
        user.password_hash.to_firestore_value(),
    );
    fields.insert("role".to_string(), user.role.as_str().to_firestore_value());
    fields.insert("created_at".to_string(), user.created_at.to_firestore_value());
    fields
}

fn document_to_user(doc: &Document) -> FirestoreResult<User> {
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::invalid_response("User document has no fields"))?;

    let get_string = |key: &str| -> String {
        fields
            .get(key)
            .and_then(String::from_firestore_value)
            .unwrap_or_default()
    };

    let role_raw = get_string("role");
    let role = Role::parse(&role_raw).ok_or_else(|| {
        FirestoreError::invalid_response(format!("User document has unknown role {role_raw:?}"))
    })?;

    Ok(User {
        id: doc.id().unwrap_or_default().to_string(),
        name: get_string("name"),
        email: get_string("email"),
        password_hash: get_string("password_hash"),
        role,
        created_at: fields
            .get("created_at")
            .and_then(chrono::DateTime::from_firestore_value)
            .unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_is_case_insensitive_and_stable() {
        let a = user_doc_id("Asha@Example.com");
        let b = user_doc_id("asha@example.com");
        let c = user_doc_id(" asha@example.com ");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert!(a.starts_with("u_"));
        assert_eq!(a.len(), 2 + 32);
    }

    #[test]
    fn test_doc_id_distinguishes_addresses() {
        assert_ne!(user_doc_id("a@example.com"), user_doc_id("b@example.com"));
    }

    #[test]
    fn test_field_round_trip() {
        let user = User {
            id: user_doc_id("asha@example.com"),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: "$2b$10$hash".into(),
            role: Role::Hr,
            created_at: Utc::now(),
        };

        let doc = Document {
            name: Some(format!(
                "projects/p/databases/(default)/documents/users/{}",
                user.id
            )),
            fields: Some(user_to_fields(&user)),
            create_time: None,
            update_time: None,
        };

        let back = document_to_user(&doc).unwrap();
        assert_eq!(back.id, user.id);
        assert_eq!(back.email, user.email);
        assert_eq!(back.role, Role::Hr);
        assert_eq!(back.password_hash, user.password_hash);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let mut fields = HashMap::new();
        fields.insert("role".to_string(), "superadmin".to_firestore_value());
        let doc = Document {
            name: Some("projects/p/databases/(default)/documents/users/u_x".into()),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };
        assert!(document_to_user(&doc).is_err());
    }
}
