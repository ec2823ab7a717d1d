//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::applications::{apply, list_for_job, update_status};
use crate::handlers::auth::{login, signup, verify_auth};
use crate::handlers::job_posts::{
    applications_summary, close_job, create_job_post, delete_job_post, get_job_posts,
    public_job_post, public_job_posts, reopen_job,
};
use crate::handlers::resumes::{get_pdf, presigned_url};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Unauthenticated surface gets the stricter limiter: credential guessing
    // and application spam both arrive here
    let public_rate_limiter =
        std::sync::Arc::new(RateLimiterCache::new(state.config.public_rate_limit_rps));
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let public_routes = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/apply", post(apply))
        .layer(middleware::from_fn_with_state(
            public_rate_limiter,
            rate_limit_middleware,
        ));

    let board_routes = Router::new()
        .route("/public/job-posts", get(public_job_posts))
        .route("/public/job-posts/:id", get(public_job_post));

    let session_routes = Router::new().route("/verify-auth", get(verify_auth));

    let job_routes = Router::new()
        .route("/create-job-post", post(create_job_post))
        .route("/get-job-posts", get(get_job_posts))
        .route("/close-job/:job_id", put(close_job))
        .route("/reopen-job/:job_id", put(reopen_job))
        .route("/job-posts/:job_id", delete(delete_job_post))
        .route("/hr/applications-summary", get(applications_summary));

    let application_routes = Router::new()
        .route("/applications/:job_id", get(list_for_job))
        .route("/applications/:application_id/:status", put(update_status));

    let resume_routes = Router::new()
        .route("/s3-presigned-url", get(presigned_url))
        .route("/get-pdfFile/*key", get(get_pdf));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(board_routes)
        .merge(session_routes)
        .merge(job_routes)
        .merge(application_routes)
        .merge(resume_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Body size limit so unauthenticated apply cannot be used for DoS
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
