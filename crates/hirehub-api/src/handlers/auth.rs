//! Signup, login and session verification handlers.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use hirehub_firestore::{user_doc_id, FirestoreError};
use hirehub_models::{PublicUser, Role, User};

use crate::auth::{
    build_auth_cookie, hash_password, issue_session_token, verify_password, AuthUser,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub company_code: Option<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: PublicUser,
}

/// Create an account and start a session.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(CookieJar, Json<SessionResponse>)> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("name, email and password are required"));
    }

    let role = req.role.unwrap_or_default();
    let code = req.company_code.as_deref();
    if let Err(e) = check_company_code(role, code, &state.config.hr_company_code) {
        warn!(email = %req.email, "HR signup rejected: {}", e);
        return Err(e);
    }

    let user = User {
        id: user_doc_id(&req.email),
        name: req.name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        password_hash: hash_password(&req.password)?,
        role,
        created_at: Utc::now(),
    };

    match state.users.create(&user).await {
        Ok(()) => {}
        Err(FirestoreError::AlreadyExists(_)) => {
            return Err(ApiError::duplicate("An account with this email already exists"));
        }
        Err(e) => return Err(e.into()),
    }

    info!(user_id = %user.id, role = %user.role, "User signed up");

    let token = issue_session_token(&state.config, &user)?;
    let jar = jar.add(build_auth_cookie(&state.config, token));

    Ok((jar, Json(SessionResponse { user: user.public() })))
}

/// HR signups must present the configured company code; candidates never do.
/// A missing or empty code is a 400, a wrong one a 403.
fn check_company_code(role: Role, provided: Option<&str>, expected: &str) -> ApiResult<()> {
    if role != Role::Hr {
        return Ok(());
    }

    let code = provided
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("companyCode is required for the hr role"))?;
    if code != expected {
        return Err(ApiError::forbidden("Invalid company code"));
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Authenticate and start a session.
///
/// Unknown email and wrong password return the same error, so the endpoint
/// cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<SessionResponse>)> {
    let invalid = || ApiError::unauthorized("Invalid email or password");

    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(invalid());
    }

    let user = state
        .users
        .get_by_email(&req.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    info!(user_id = %user.id, "User logged in");

    let token = issue_session_token(&state.config, &user)?;
    let jar = jar.add(build_auth_cookie(&state.config, token));

    Ok((jar, Json(SessionResponse { user: user.public() })))
}

#[derive(Serialize)]
pub struct VerifyAuthResponse {
    pub role: Role,
    pub user: PublicUser,
}

/// Resolve the current session into a user.
pub async fn verify_auth(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<VerifyAuthResponse>> {
    let user = state
        .users
        .get(&auth.uid)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(Json(VerifyAuthResponse {
        role: user.role,
        user: user.public(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_signup_ignores_company_code() {
        assert!(check_company_code(Role::Candidate, None, "secret").is_ok());
        assert!(check_company_code(Role::Candidate, Some("wrong"), "secret").is_ok());
    }

    #[test]
    fn test_hr_signup_requires_company_code() {
        assert!(matches!(
            check_company_code(Role::Hr, None, "secret"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            check_company_code(Role::Hr, Some(""), "secret"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_hr_signup_rejects_wrong_company_code() {
        assert!(matches!(
            check_company_code(Role::Hr, Some("nope"), "secret"),
            Err(ApiError::Forbidden(_))
        ));
        assert!(check_company_code(Role::Hr, Some("secret"), "secret").is_ok());
    }
}
