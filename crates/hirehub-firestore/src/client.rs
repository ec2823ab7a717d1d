//! Firestore REST API client.
//!
//! Thin, tuned client over the Firestore REST surface:
//! - Cached OAuth tokens with refresh margin
//! - One transparent retry on mid-flight token expiry
//! - Exponential backoff with jitter for transient failures
//! - Tracing spans and request metrics
//!
//! When `FIRESTORE_EMULATOR_HOST` is set the client targets the emulator
//! (or any mock server) over plain HTTP and skips real authentication.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::error::{FirestoreError, FirestoreResult};
use crate::retry::RetryConfig;
use crate::token_cache::TokenCache;
use crate::types::{Document, RunQueryRequest, RunQueryResponse, StructuredQuery, Value};

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Emulator/mock host, e.g. "localhost:8080". Disables authentication.
    pub emulator_host: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .map_err(|_| FirestoreError::auth_error("GCP_PROJECT_ID must be set"))?;
        if project_id.is_empty() {
            return Err(FirestoreError::auth_error("GCP_PROJECT_ID cannot be empty"));
        }

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            emulator_host: std::env::var("FIRESTORE_EMULATOR_HOST")
                .ok()
                .filter(|h| !h.is_empty()),
            timeout: Duration::from_secs(
                std::env::var("FIRESTORE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            retry: RetryConfig::from_env(),
        })
    }
}

/// Firestore REST API client.
pub struct FirestoreClient {
    http: Client,
    base_url: String,
    token_cache: Option<Arc<TokenCache>>,
    retry: RetryConfig,
}

impl Clone for FirestoreClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token_cache: self.token_cache.clone(),
            retry: self.retry.clone(),
        }
    }
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub async fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("hirehub-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        let (base_url, token_cache) = match &config.emulator_host {
            Some(host) => {
                debug!("Using Firestore emulator at {}", host);
                let url = format!(
                    "http://{}/v1/projects/{}/databases/{}/documents",
                    host, config.project_id, config.database_id
                );
                (url, None)
            }
            None => {
                let url = format!(
                    "https://firestore.googleapis.com/v1/projects/{}/databases/{}/documents",
                    config.project_id, config.database_id
                );
                let auth = Self::create_auth_provider()?;
                (url, Some(Arc::new(TokenCache::new(auth))))
            }
        };

        Ok(Self {
            http,
            base_url,
            token_cache,
            retry: config.retry,
        })
    }

    fn create_auth_provider() -> FirestoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            FirestoreError::auth_error(format!("Failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(FirestoreError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    /// Create from environment variables.
    pub async fn from_env() -> FirestoreResult<Self> {
        Self::new(FirestoreConfig::from_env()?).await
    }

    async fn bearer_token(&self) -> FirestoreResult<String> {
        match &self.token_cache {
            Some(cache) => cache.get_token().await,
            // The emulator accepts any owner token
            None => Ok("owner".to_string()),
        }
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, doc_id)
    }

    // =========================================================================
    // CRUD Operations
    // =========================================================================

    /// Get a document, or None if it does not exist.
    ///
    /// Reads are idempotent, so transient failures are retried with the
    /// configured backoff. Writes go through exactly once: retrying a create
    /// that actually landed would read back as a spurious conflict.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Option<Document>> {
        let url = self.document_url(collection, doc_id);

        self.execute("get_document", collection, async {
            self.with_retry("get_document", || async {
                let response = self.send(Method::GET, &url, None).await?;
                match response.status() {
                    StatusCode::OK => Ok(Some(response.json().await?)),
                    StatusCode::NOT_FOUND => Ok(None),
                    status => Err(Self::error_from(status, &url, response).await),
                }
            })
            .await
        })
        .await
    }

    /// Create a document with an explicit id.
    ///
    /// Creation is atomic at the store: if a document with this id already
    /// exists the call fails with `AlreadyExists`, which is what the
    /// deterministic-id uniqueness constraints rely on.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        let url = format!(
            "{}/{}?documentId={}",
            self.base_url,
            collection,
            urlencoding::encode(doc_id)
        );
        let body = serde_json::to_value(Document::new(fields))?;

        self.execute("create_document", collection, async {
            let response = self.send(Method::POST, &url, Some(&body)).await?;
            match response.status() {
                StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
                StatusCode::CONFLICT => Err(FirestoreError::AlreadyExists(format!(
                    "{}/{}",
                    collection, doc_id
                ))),
                status => Err(Self::error_from(status, &url, response).await),
            }
        })
        .await
    }

    /// Patch a document, merging only the masked fields.
    pub async fn update_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
        update_mask: &[&str],
    ) -> FirestoreResult<Document> {
        let mut url = self.document_url(collection, doc_id);
        if !update_mask.is_empty() {
            let params: Vec<String> = update_mask
                .iter()
                .map(|f| format!("updateMask.fieldPaths={}", urlencoding::encode(f)))
                .collect();
            url = format!("{}?{}", url, params.join("&"));
        }
        let body = serde_json::to_value(Document::new(fields))?;

        self.execute("update_document", collection, async {
            let response = self.send(Method::PATCH, &url, Some(&body)).await?;
            match response.status() {
                StatusCode::OK => Ok(response.json().await?),
                StatusCode::NOT_FOUND => Err(FirestoreError::not_found(format!(
                    "{}/{}",
                    collection, doc_id
                ))),
                status => Err(Self::error_from(status, &url, response).await),
            }
        })
        .await
    }

    /// Delete a document. Deleting a missing document is a no-op.
    pub async fn delete_document(&self, collection: &str, doc_id: &str) -> FirestoreResult<()> {
        let url = self.document_url(collection, doc_id);

        self.execute("delete_document", collection, async {
            let response = self.send(Method::DELETE, &url, None).await?;
            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
                status => Err(Self::error_from(status, &url, response).await),
            }
        })
        .await
    }

    /// Run a structured query against the database root.
    pub async fn run_query(&self, query: StructuredQuery) -> FirestoreResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.base_url);
        let body = serde_json::to_value(RunQueryRequest {
            structured_query: query,
        })?;

        self.execute("run_query", "query", async {
            self.with_retry("run_query", || async {
                let response = self.send(Method::POST, &url, Some(&body)).await?;
                match response.status() {
                    StatusCode::OK => {
                        let text = response.text().await?;
                        // runQuery returns a JSON array of per-document envelopes
                        let responses: Vec<RunQueryResponse> =
                            serde_json::from_str(&text).map_err(|e| {
                                FirestoreError::invalid_response(format!(
                                    "Failed to parse runQuery response: {} (body prefix: {})",
                                    e,
                                    &text[..text.len().min(200)]
                                ))
                            })?;
                        Ok(responses.into_iter().filter_map(|r| r.document).collect())
                    }
                    status => Err(Self::error_from(status, &url, response).await),
                }
            })
            .await
        })
        .await
    }

    /// Check connectivity by fetching a well-known document. A clean
    /// not-found still proves the store answered.
    pub async fn check_connectivity(&self) -> FirestoreResult<()> {
        self.get_document("healthchecks", "ping").await.map(|_| ())
    }

    /// Execute an operation with the configured retry policy.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> FirestoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = FirestoreResult<T>>,
    {
        crate::retry::with_retry(&self.retry, operation, op).await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Send a request with a bearer token, retrying once on mid-flight token
    /// expiry. Returns the raw response for operation-specific status handling.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> FirestoreResult<reqwest::Response> {
        let mut token = self.bearer_token().await?;

        for attempt in 0..2 {
            let mut request = self.http.request(method.clone(), url).bearer_auth(&token);
            if let Some(b) = body {
                request = request.json(b);
            }
            let response = request.send().await?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == 0 {
                let text = response.text().await.unwrap_or_default();
                if Self::is_access_token_expired(&text) {
                    if let Some(cache) = &self.token_cache {
                        cache.invalidate().await;
                    }
                    token = self.bearer_token().await?;
                    continue;
                }
                return Err(FirestoreError::from_http_status(
                    401,
                    format!("{} failed: {}", url, text),
                ));
            }

            return Ok(response);
        }

        Err(FirestoreError::auth_error(format!(
            "{} failed: token expired and refresh did not help",
            url
        )))
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    /// Wrap an operation future with tracing and metrics.
    async fn execute<T, F>(&self, operation: &str, collection: &str, fut: F) -> FirestoreResult<T>
    where
        F: std::future::Future<Output = FirestoreResult<T>>,
    {
        let span = info_span!("firestore_request", operation = %operation, collection = %collection);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        metrics::counter!(
            "firestore_requests_total",
            "operation" => operation.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "firestore_request_duration_ms",
            "operation" => operation.to_string()
        )
        .record(latency_ms);

        result
    }

    async fn error_from(
        status: StatusCode,
        url: &str,
        response: reqwest::Response,
    ) -> FirestoreError {
        let body = response.text().await.unwrap_or_default();
        FirestoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}
