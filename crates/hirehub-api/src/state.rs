//! Application state.

use std::sync::Arc;

use hirehub_firestore::{
    ApplicationRepository, FirestoreClient, JobPostRepository, UserRepository,
};
use hirehub_storage::S3Client;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub firestore: Arc<FirestoreClient>,
    pub storage: Arc<S3Client>,
    pub users: Arc<UserRepository>,
    pub job_posts: Arc<JobPostRepository>,
    pub applications: Arc<ApplicationRepository>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let firestore = FirestoreClient::from_env().await?;
        let storage = S3Client::from_env().await?;

        let users = Arc::new(UserRepository::new(firestore.clone()));
        let job_posts = Arc::new(JobPostRepository::new(firestore.clone()));
        let applications = Arc::new(ApplicationRepository::new(firestore.clone()));

        Ok(Self {
            config,
            firestore: Arc::new(firestore),
            storage: Arc::new(storage),
            users,
            job_posts,
            applications,
        })
    }
}
