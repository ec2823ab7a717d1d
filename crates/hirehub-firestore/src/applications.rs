//! Application repository.
//!
//! Application documents live at `applications/{id}` where the id encodes the
//! (job post, candidate email) pair. Duplicate submissions for the same pair
//! collapse onto the same id, so under a concurrent race the store's atomic
//! create lets exactly one through and the other observes `AlreadyExists`.

use std::collections::HashMap;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use hirehub_models::{AiEvaluation, Application, ApplicationStatus};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{
    ArrayValue, Document, FromFirestoreValue, MapValue, StructuredQuery, ToFirestoreValue, Value,
};

const COLLECTION: &str = "applications";

/// Derive the document id for a (job post, candidate email) pair.
pub fn application_doc_id(job_post_id: &str, email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("a_{}_{}", job_post_id, &hex[..16])
}

/// Repository for application documents.
pub struct ApplicationRepository {
    client: FirestoreClient,
}

impl ApplicationRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Persist a new application. Fails with `AlreadyExists` when the same
    /// candidate has already applied to the same job post.
    pub async fn create(&self, application: &Application) -> FirestoreResult<()> {
        self.client
            .create_document(COLLECTION, &application.id, application_to_fields(application))
            .await?;
        info!(
            application_id = %application.id,
            job_id = %application.job_post,
            "Created application"
        );
        Ok(())
    }

    /// Get an application by id.
    pub async fn get(&self, id: &str) -> FirestoreResult<Option<Application>> {
        match self.client.get_document(COLLECTION, id).await? {
            Some(doc) => Ok(Some(document_to_application(&doc)?)),
            None => Ok(None),
        }
    }

    /// All applications submitted against one job post.
    pub async fn list_for_job(&self, job_post_id: &str) -> FirestoreResult<Vec<Application>> {
        let query = StructuredQuery::collection_where_eq(
            COLLECTION,
            "job_post",
            Value::StringValue(job_post_id.to_string()),
        );
        self.collect(query).await
    }

    /// All applications across every job post owned by one HR identity.
    /// Served by the denormalized `job_owner` field in one query.
    pub async fn list_for_owner(&self, owner_id: &str) -> FirestoreResult<Vec<Application>> {
        let query = StructuredQuery::collection_where_eq(
            COLLECTION,
            "job_owner",
            Value::StringValue(owner_id.to_string()),
        );
        self.collect(query).await
    }

    /// Find the application holding a given resume key.
    pub async fn find_by_resume_key(&self, key: &str) -> FirestoreResult<Option<Application>> {
        let query = StructuredQuery::collection_where_eq(
            COLLECTION,
            "s3_file_key",
            Value::StringValue(key.to_string()),
        );
        Ok(self.collect(query).await?.into_iter().next())
    }

    /// Update the status of an application, returning the updated record.
    pub async fn update_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> FirestoreResult<Application> {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            status.as_str().to_firestore_value(),
        );
        let doc = self
            .client
            .update_document(COLLECTION, id, fields, &["status"])
            .await?;
        info!(application_id = %id, status = %status, "Updated application status");
        document_to_application(&doc)
    }

    async fn collect(&self, query: StructuredQuery) -> FirestoreResult<Vec<Application>> {
        let docs = self.client.run_query(query).await?;
        let mut applications = Vec::with_capacity(docs.len());
        for doc in docs {
            match document_to_application(&doc) {
                Ok(app) => applications.push(app),
                Err(e) => warn!(doc = ?doc.name, "Skipping unparseable application: {}", e),
            }
        }
        Ok(applications)
    }
}

// ============================================================================
// Field Conversion Helpers
// ============================================================================

fn application_to_fields(app: &Application) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("first_name".to_string(), app.first_name.to_firestore_value());
    fields.insert("last_name".to_string(), app.last_name.to_firestore_value());
    fields.insert("email".to_string(), app.email.to_firestore_value());
    fields.insert("phone".to_string(), app.phone.to_firestore_value());
    fields.insert("experience".to_string(), app.experience.to_firestore_value());
    fields.insert("job_post".to_string(), app.job_post.to_firestore_value());
    fields.insert("job_owner".to_string(), app.job_owner.to_firestore_value());
    fields.insert(
        "s3_file_key".to_string(),
        app.s3_file_key.to_firestore_value(),
    );
    fields.insert(
        "status".to_string(),
        app.status.as_str().to_firestore_value(),
    );
    fields.insert(
        "interview_date".to_string(),
        app.interview_date.to_firestore_value(),
    );
    fields.insert(
        "offer_letter".to_string(),
        app.offer_letter.to_firestore_value(),
    );
    fields.insert(
        "immediate_joiner".to_string(),
        app.immediate_joiner.to_firestore_value(),
    );
    if let Some(eval) = &app.ai_evaluation {
        fields.insert("ai_evaluation".to_string(), evaluation_to_value(eval));
    }
    fields.insert("notes".to_string(), app.notes.to_firestore_value());
    fields.insert("applied_at".to_string(), app.applied_at.to_firestore_value());
    fields
}

fn evaluation_to_value(eval: &AiEvaluation) -> Value {
    let mut fields = HashMap::new();
    fields.insert("score".to_string(), eval.score.to_firestore_value());
    fields.insert(
        "match_percentage".to_string(),
        eval.match_percentage.to_firestore_value(),
    );
    fields.insert("strengths".to_string(), eval.strengths.to_firestore_value());
    fields.insert(
        "weaknesses".to_string(),
        eval.weaknesses.to_firestore_value(),
    );
    Value::MapValue(MapValue {
        fields: Some(fields),
    })
}

fn value_to_evaluation(value: &Value) -> Option<AiEvaluation> {
    let Value::MapValue(MapValue {
        fields: Some(fields),
    }) = value
    else {
        return None;
    };

    let strings = |key: &str| -> Vec<String> {
        fields
            .get(key)
            .and_then(Vec::<String>::from_firestore_value)
            .unwrap_or_default()
    };

    Some(AiEvaluation {
        score: fields.get("score").and_then(f64::from_firestore_value),
        match_percentage: fields
            .get("match_percentage")
            .and_then(f64::from_firestore_value),
        strengths: strings("strengths"),
        weaknesses: strings("weaknesses"),
    })
}

fn document_to_application(doc: &Document) -> FirestoreResult<Application> {
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::invalid_response("Application document has no fields"))?;

    let get_string = |key: &str| -> String {
        fields
            .get(key)
            .and_then(String::from_firestore_value)
            .unwrap_or_default()
    };

    let get_bool = |key: &str| -> bool {
        fields
            .get(key)
            .and_then(bool::from_firestore_value)
            .unwrap_or(false)
    };

    let status_raw = get_string("status");
    let status = ApplicationStatus::parse(&status_raw).ok_or_else(|| {
        FirestoreError::invalid_response(format!(
            "Application has unknown status {status_raw:?}"
        ))
    })?;

    let notes = fields
        .get("notes")
        .map(|v| match v {
            Value::ArrayValue(ArrayValue { values }) => values
                .as_deref()
                .unwrap_or_default()
                .iter()
                .filter_map(String::from_firestore_value)
                .collect(),
            _ => Vec::new(),
        })
        .unwrap_or_default();

    Ok(Application {
        id: doc.id().unwrap_or_default().to_string(),
        first_name: get_string("first_name"),
        last_name: get_string("last_name"),
        email: get_string("email"),
        phone: get_string("phone"),
        experience: fields
            .get("experience")
            .and_then(u32::from_firestore_value)
            .unwrap_or(0),
        job_post: get_string("job_post"),
        job_owner: get_string("job_owner"),
        s3_file_key: get_string("s3_file_key"),
        status,
        interview_date: fields
            .get("interview_date")
            .and_then(chrono::DateTime::from_firestore_value),
        offer_letter: get_bool("offer_letter"),
        immediate_joiner: get_bool("immediate_joiner"),
        ai_evaluation: fields.get("ai_evaluation").and_then(value_to_evaluation),
        notes,
        applied_at: fields
            .get("applied_at")
            .and_then(chrono::DateTime::from_firestore_value)
            .unwrap_or_else(Utc::now),
    })
}
