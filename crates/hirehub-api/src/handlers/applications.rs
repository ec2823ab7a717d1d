//! Application submission and triage handlers.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use validator::Validate;

use hirehub_firestore::{application_doc_id, FirestoreError};
use hirehub_models::{Application, ApplicationStatus, ApplicationSubmission};

use crate::auth::HrUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

fn not_found_or_unauthorized() -> ApiError {
    ApiError::not_found("Application not found")
}

#[derive(Serialize)]
pub struct ApplyResponse {
    pub success: bool,
    pub application: Application,
}

/// Submit an application against an open job post. Anonymous.
///
/// The (email, job post) pair maps to one deterministic document id, so a
/// duplicate submission loses the atomic create and surfaces as a 400 with
/// `isDuplicate: true`, even under a concurrent race.
pub async fn apply(
    State(state): State<AppState>,
    Json(req): Json<ApplicationSubmission>,
) -> ApiResult<Json<ApplyResponse>> {
    req.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let job = state
        .job_posts
        .get(&req.job_post)
        .await?
        .ok_or_else(|| ApiError::not_found("Job post not found"))?;

    let application = Application {
        id: application_doc_id(&job.id, &req.email),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        phone: req.phone,
        experience: req.experience,
        job_post: job.id.clone(),
        job_owner: job.created_by.clone(),
        s3_file_key: req.s3_file_key,
        status: ApplicationStatus::Applied,
        interview_date: None,
        offer_letter: false,
        immediate_joiner: req.immediate_joiner,
        ai_evaluation: None,
        notes: Vec::new(),
        applied_at: Utc::now(),
    };

    match state.applications.create(&application).await {
        Ok(()) => {}
        Err(FirestoreError::AlreadyExists(_)) => {
            return Err(ApiError::duplicate("You have already applied for this job"));
        }
        Err(e) => return Err(e.into()),
    }

    metrics::record_application_submitted();
    info!(application_id = %application.id, job_id = %job.id, "Application submitted");

    Ok(Json(ApplyResponse {
        success: true,
        application,
    }))
}

#[derive(Serialize)]
pub struct JobApplicationsResponse {
    pub applications: Vec<Application>,
    pub shortlisted: usize,
    pub interviews: usize,
    pub offers: usize,
}

/// Applications for one job post the caller owns.
pub async fn list_for_job(
    State(state): State<AppState>,
    hr: HrUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobApplicationsResponse>> {
    state
        .job_posts
        .get_owned(&job_id, &hr.user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job post not found"))?;

    let applications = state.applications.list_for_job(&job_id).await?;

    let shortlisted = applications
        .iter()
        .filter(|a| a.status == ApplicationStatus::Shortlisted)
        .count();
    let interviews = applications
        .iter()
        .filter(|a| a.interview_date.is_some())
        .count();
    let offers = applications.iter().filter(|a| a.offer_letter).count();

    Ok(Json(JobApplicationsResponse {
        applications,
        shortlisted,
        interviews,
        offers,
    }))
}

#[derive(Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub application: Application,
}

/// Move an application through the status lifecycle.
///
/// Ownership is checked against the denormalized job owner. Transition rules
/// live on the status enum; anything outside them is a 400.
pub async fn update_status(
    State(state): State<AppState>,
    hr: HrUser,
    Path((application_id, status)): Path<(String, String)>,
) -> ApiResult<Json<UpdateStatusResponse>> {
    let next = ApplicationStatus::parse(&status)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown status {status:?}")))?;

    let mut application = state
        .applications
        .get(&application_id)
        .await?
        .filter(|a| a.job_owner == hr.user.id)
        .ok_or_else(not_found_or_unauthorized)?;

    application
        .transition_to(next)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let application = state
        .applications
        .update_status(&application_id, next)
        .await?;

    metrics::record_status_transition(next.as_str());
    info!(application_id = %application_id, status = %next, "Application status updated");

    Ok(Json(UpdateStatusResponse {
        success: true,
        application,
    }))
}
