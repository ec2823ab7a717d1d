//! Job post management handlers.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use hirehub_models::{ApplicationStatus, JobPost, JobStatus, NewJobPost};

use crate::auth::HrUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Conflated not-found: a missing post and a post owned by someone else are
/// indistinguishable to the caller.
fn not_found_or_unauthorized() -> ApiError {
    ApiError::not_found("Job post not found")
}

#[derive(Serialize)]
pub struct JobPostResponse {
    pub job: JobPost,
}

/// Create a job post owned by the calling HR user.
pub async fn create_job_post(
    State(state): State<AppState>,
    hr: HrUser,
    Json(req): Json<NewJobPost>,
) -> ApiResult<Json<JobPostResponse>> {
    req.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let post = JobPost {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        description: req.description,
        job_type: req.job_type,
        location: req.location,
        no_of_openings: req.no_of_openings,
        deadline: req.deadline,
        created_by: hr.user.id.clone(),
        status: JobStatus::Open,
        created_at: Utc::now(),
    };

    state.job_posts.create(&post).await?;
    info!(job_id = %post.id, owner = %post.created_by, "Job post created");

    Ok(Json(JobPostResponse { job: post }))
}

#[derive(Serialize)]
pub struct OwnedJobPostsResponse {
    pub all: Vec<JobPost>,
    pub open: Vec<JobPost>,
}

/// All posts owned by the caller, with the open subset split out.
pub async fn get_job_posts(
    State(state): State<AppState>,
    hr: HrUser,
) -> ApiResult<Json<OwnedJobPostsResponse>> {
    let all = state.job_posts.list_by_owner(&hr.user.id).await?;
    let open = all.iter().filter(|p| p.is_open()).cloned().collect();

    Ok(Json(OwnedJobPostsResponse { all, open }))
}

#[derive(Serialize)]
pub struct PublicJobPostsResponse {
    pub jobs: Vec<JobPost>,
}

/// Public board: open posts only, no auth.
pub async fn public_job_posts(
    State(state): State<AppState>,
) -> ApiResult<Json<PublicJobPostsResponse>> {
    let jobs = state.job_posts.list_open().await?;
    Ok(Json(PublicJobPostsResponse { jobs }))
}

/// Public detail view. Closed posts stay reachable by direct id.
pub async fn public_job_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobPostResponse>> {
    let job = state
        .job_posts
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job post not found"))?;

    Ok(Json(JobPostResponse { job }))
}

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub success: bool,
    pub job: JobPost,
}

/// Close a job post, removing it from the public board.
pub async fn close_job(
    State(state): State<AppState>,
    hr: HrUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    set_job_status(&state, &hr, &job_id, JobStatus::Closed).await
}

/// Reopen a closed job post.
pub async fn reopen_job(
    State(state): State<AppState>,
    hr: HrUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    set_job_status(&state, &hr, &job_id, JobStatus::Open).await
}

async fn set_job_status(
    state: &AppState,
    hr: &HrUser,
    job_id: &str,
    status: JobStatus,
) -> ApiResult<Json<JobStatusResponse>> {
    state
        .job_posts
        .get_owned(job_id, &hr.user.id)
        .await?
        .ok_or_else(not_found_or_unauthorized)?;

    let job = state.job_posts.set_status(job_id, status).await?;
    info!(job_id = %job_id, status = %status, "Job status changed");

    Ok(Json(JobStatusResponse { success: true, job }))
}

#[derive(Serialize)]
pub struct DeleteJobResponse {
    pub success: bool,
}

/// Delete a job post the caller owns.
pub async fn delete_job_post(
    State(state): State<AppState>,
    hr: HrUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<DeleteJobResponse>> {
    state
        .job_posts
        .get_owned(&job_id, &hr.user.id)
        .await?
        .ok_or_else(not_found_or_unauthorized)?;

    state.job_posts.delete(&job_id).await?;

    Ok(Json(DeleteJobResponse { success: true }))
}

#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationsSummary {
    pub total_jobs: usize,
    pub total_applications: usize,
    pub total_shortlisted: usize,
    pub total_interviews: usize,
    pub total_offers: usize,
}

/// Roll up the caller's hiring pipeline in two queries.
pub async fn applications_summary(
    State(state): State<AppState>,
    hr: HrUser,
) -> ApiResult<Json<ApplicationsSummary>> {
    let jobs = state.job_posts.list_by_owner(&hr.user.id).await?;
    let applications = state.applications.list_for_owner(&hr.user.id).await?;

    Ok(Json(summarize(
        jobs.len(),
        applications.iter().map(|a| (a.status, a.interview_date.is_some(), a.offer_letter)),
    )))
}

/// Counts over independent predicates. Shortlisted, interviews and offers
/// overlap freely; none is a subset of another.
fn summarize(
    total_jobs: usize,
    applications: impl Iterator<Item = (ApplicationStatus, bool, bool)>,
) -> ApplicationsSummary {
    let mut summary = ApplicationsSummary {
        total_jobs,
        total_applications: 0,
        total_shortlisted: 0,
        total_interviews: 0,
        total_offers: 0,
    };

    for (status, has_interview, has_offer) in applications {
        summary.total_applications += 1;
        if status == ApplicationStatus::Shortlisted {
            summary.total_shortlisted += 1;
        }
        if has_interview {
            summary.total_interviews += 1;
        }
        if has_offer {
            summary.total_offers += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    #[test]
    fn test_summary_counts_overlapping_predicates() {
        let apps = [
            (Shortlisted, true, false),
            (Shortlisted, false, false),
            (Applied, false, false),
            (Selected, true, true),
            (Rejected, false, false),
        ];
        let summary = summarize(3, apps.into_iter());

        assert_eq!(
            summary,
            ApplicationsSummary {
                total_jobs: 3,
                total_applications: 5,
                total_shortlisted: 2,
                total_interviews: 2,
                total_offers: 1,
            }
        );
    }

    #[test]
    fn test_summary_empty() {
        let summary = summarize(0, std::iter::empty());
        assert_eq!(summary.total_applications, 0);
        assert_eq!(summary.total_jobs, 0);
    }
}
