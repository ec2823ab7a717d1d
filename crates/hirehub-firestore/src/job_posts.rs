//! Job post repository.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};

use hirehub_models::{JobPost, JobStatus};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, FromFirestoreValue, StructuredQuery, ToFirestoreValue, Value};

const COLLECTION: &str = "job_posts";

/// Repository for job post documents at `job_posts/{uuid}`.
pub struct JobPostRepository {
    client: FirestoreClient,
}

impl JobPostRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Persist a new job post.
    pub async fn create(&self, post: &JobPost) -> FirestoreResult<()> {
        self.client
            .create_document(COLLECTION, &post.id, job_post_to_fields(post))
            .await?;
        info!(job_id = %post.id, owner = %post.created_by, "Created job post");
        Ok(())
    }

    /// Get a job post by id regardless of status or owner.
    pub async fn get(&self, id: &str) -> FirestoreResult<Option<JobPost>> {
        match self.client.get_document(COLLECTION, id).await? {
            Some(doc) => Ok(Some(document_to_job_post(&doc)?)),
            None => Ok(None),
        }
    }

    /// Get a job post only if it is owned by `owner_id`.
    ///
    /// A missing post and a post owned by someone else are indistinguishable
    /// to the caller, which is what keeps other HRs' posts unenumerable.
    pub async fn get_owned(&self, id: &str, owner_id: &str) -> FirestoreResult<Option<JobPost>> {
        Ok(self.get(id).await?.filter(|post| post.created_by == owner_id))
    }

    /// All job posts created by one owner.
    pub async fn list_by_owner(&self, owner_id: &str) -> FirestoreResult<Vec<JobPost>> {
        let query = StructuredQuery::collection_where_eq(
            COLLECTION,
            "created_by",
            Value::StringValue(owner_id.to_string()),
        );
        self.collect(query).await
    }

    /// All open job posts, for the public board.
    pub async fn list_open(&self) -> FirestoreResult<Vec<JobPost>> {
        let query = StructuredQuery::collection_where_eq(
            COLLECTION,
            "status",
            Value::StringValue(JobStatus::Open.as_str().to_string()),
        );
        self.collect(query).await
    }

    /// Set the open/closed status of a post.
    pub async fn set_status(&self, id: &str, status: JobStatus) -> FirestoreResult<JobPost> {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            status.as_str().to_firestore_value(),
        );
        let doc = self
            .client
            .update_document(COLLECTION, id, fields, &["status"])
            .await?;
        info!(job_id = %id, status = %status, "Updated job post status");
        document_to_job_post(&doc)
    }

    /// Delete a job post.
    pub async fn delete(&self, id: &str) -> FirestoreResult<()> {
        self.client.delete_document(COLLECTION, id).await?;
        info!(job_id = %id, "Deleted job post");
        Ok(())
    }

    async fn collect(&self, query: StructuredQuery) -> FirestoreResult<Vec<JobPost>> {
        let docs = self.client.run_query(query).await?;
        let mut posts = Vec::with_capacity(docs.len());
        for doc in docs {
            match document_to_job_post(&doc) {
                Ok(post) => posts.push(post),
                Err(e) => warn!(doc = ?doc.name, "Skipping unparseable job post: {}", e),
            }
        }
        Ok(posts)
    }
}

// ============================================================================
// Field Conversion Helpers
// ============================================================================

fn job_post_to_fields(post: &JobPost) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("title".to_string(), post.title.to_firestore_value());
    fields.insert(
        "description".to_string(),
        post.description.to_firestore_value(),
    );
    fields.insert("job_type".to_string(), post.job_type.to_firestore_value());
    fields.insert("location".to_string(), post.location.to_firestore_value());
    fields.insert(
        "no_of_openings".to_string(),
        post.no_of_openings.to_firestore_value(),
    );
    fields.insert("deadline".to_string(), post.deadline.to_firestore_value());
    fields.insert(
        "created_by".to_string(),
        post.created_by.to_firestore_value(),
    );
    fields.insert(
        "status".to_string(),
        post.status.as_str().to_firestore_value(),
    );
    fields.insert(
        "created_at".to_string(),
        post.created_at.to_firestore_value(),
    );
    fields
}

fn document_to_job_post(doc: &Document) -> FirestoreResult<JobPost> {
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::invalid_response("Job post document has no fields"))?;

    let get_string = |key: &str| -> String {
        fields
            .get(key)
            .and_then(String::from_firestore_value)
            .unwrap_or_default()
    };

    let status_raw = get_string("status");
    let status = JobStatus::parse(&status_raw).ok_or_else(|| {
        FirestoreError::invalid_response(format!("Job post has unknown status {status_raw:?}"))
    })?;

    Ok(JobPost {
        id: doc.id().unwrap_or_default().to_string(),
        title: get_string("title"),
        description: get_string("description"),
        job_type: get_string("job_type"),
        location: get_string("location"),
        no_of_openings: fields
            .get("no_of_openings")
            .and_then(u32::from_firestore_value)
            .unwrap_or(0),
        deadline: fields
            .get("deadline")
            .and_then(chrono::DateTime::from_firestore_value)
            .unwrap_or_else(Utc::now),
        created_by: get_string("created_by"),
        status,
        created_at: fields
            .get("created_at")
            .and_then(chrono::DateTime::from_firestore_value)
            .unwrap_or_else(Utc::now),
    })
}
