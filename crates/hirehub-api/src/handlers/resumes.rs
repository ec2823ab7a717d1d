//! Resume upload and retrieval handlers.
//!
//! The API never stores resume bytes itself. Uploads go straight from the
//! browser to the bucket via a short-lived presigned PUT URL; downloads are
//! proxied so the ownership check cannot be bypassed with a raw bucket URL.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use hirehub_storage::{is_resume_key, resume_key};

use crate::auth::HrUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignQuery {
    pub file_name: String,
    pub file_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub upload_url: String,
    pub key: String,
}

/// Issue a presigned PUT URL for a resume upload.
pub async fn presigned_url(
    State(state): State<AppState>,
    Query(query): Query<PresignQuery>,
) -> ApiResult<Json<PresignResponse>> {
    if query.file_type != "application/pdf" {
        return Err(ApiError::bad_request("Only PDF resumes are accepted"));
    }

    let key = resume_key(&query.file_name)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let upload_url = state.storage.presign_put(&key, &query.file_type).await?;

    metrics::record_presigned_url();

    Ok(Json(PresignResponse { upload_url, key }))
}

/// Fetch a resume the caller is entitled to see.
///
/// The key must belong to an application whose parent job the caller owns; a
/// missing application and a non-owned one both read as 404.
pub async fn get_pdf(
    State(state): State<AppState>,
    hr: HrUser,
    Path(key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    // Keys outside the resume prefix can never match an application
    if !is_resume_key(&key) {
        return Err(ApiError::not_found("Resume not found"));
    }

    let application = state
        .applications
        .find_by_resume_key(&key)
        .await?
        .filter(|a| a.job_owner == hr.user.id)
        .ok_or_else(|| ApiError::not_found("Resume not found"))?;

    let bytes = state.storage.download_bytes(&key).await?;

    info!(application_id = %application.id, key = %key, "Resume downloaded");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", file_name_of(&key)),
            ),
        ],
        bytes,
    ))
}

fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_of_strips_prefix() {
        assert_eq!(file_name_of("resumes/1700000000000_cv.pdf"), "1700000000000_cv.pdf");
        assert_eq!(file_name_of("cv.pdf"), "cv.pdf");
    }

    #[test]
    fn test_download_gate_only_passes_resume_keys() {
        assert!(is_resume_key("resumes/1700000000000_cv.pdf"));
        assert!(!is_resume_key("avatars/123.png"));
        assert!(!is_resume_key("resumes/../secret"));
    }
}
