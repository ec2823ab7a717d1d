//! Session token authentication.
//!
//! Sessions are HS256 JWTs carried in an HttpOnly `authToken` cookie. The
//! token holds the user id and role; role-gated handlers re-check the user
//! against the store so a deleted account cannot keep a live session.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use hirehub_models::{Role, User};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "authToken";

/// bcrypt work factor for password hashing.
const BCRYPT_COST: u32 = 10;

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User document id
    pub sub: String,
    /// User role at login time
    pub role: Role,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// Issue a session token for a user.
pub fn issue_session_token(config: &ApiConfig, user: &User) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user.id.clone(),
        role: user.role,
        iat: now,
        exp: now + config.session_ttl.as_secs() as i64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("Failed to sign session token: {}", e)))
}

/// Verify a session token, rejecting expired or tampered tokens.
pub fn verify_session_token(secret: &str, token: &str) -> Result<SessionClaims, ApiError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| ApiError::unauthorized(format!("Invalid session: {}", e)))?;

    Ok(data.claims)
}

/// Build the session cookie carrying a freshly issued token.
pub fn build_auth_cookie(config: &ApiConfig, token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time_duration(config.session_ttl))
        .secure(config.cookie_secure)
        .build()
}

fn time_duration(d: std::time::Duration) -> time::Duration {
    time::Duration::seconds(d.as_secs() as i64)
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    bcrypt::verify(password, hash)
        .map_err(|e| ApiError::internal(format!("Failed to verify password: {}", e)))
}

/// Authenticated user extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub role: Role,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(AUTH_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::unauthorized("Missing session cookie"))?;

        let claims = verify_session_token(&state.config.jwt_secret, &token)?;

        Ok(AuthUser {
            uid: claims.sub,
            role: claims.role,
        })
    }
}

/// Authenticated HR user. Requires the HR role and a still-existing account.
#[derive(Debug, Clone)]
pub struct HrUser {
    pub user: User,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for HrUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        if auth.role != Role::Hr {
            return Err(ApiError::unauthorized("HR access required"));
        }

        let user = state
            .users
            .get(&auth.uid)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

        if user.role != Role::Hr {
            return Err(ApiError::unauthorized("HR access required"));
        }

        Ok(HrUser { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> ApiConfig {
        ApiConfig {
            host: "127.0.0.1".into(),
            port: 8000,
            cors_origins: vec!["*".into()],
            rate_limit_rps: 10,
            public_rate_limit_rps: 5,
            request_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024,
            jwt_secret: "test-secret".into(),
            hr_company_code: "ACME-2026".into(),
            session_ttl: Duration::from_secs(3600),
            cookie_secure: false,
            environment: "development".into(),
        }
    }

    fn test_user() -> User {
        User {
            id: "u_abc".into(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: "ignored".into(),
            role: Role::Hr,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_token_round_trip() {
        let config = test_config();
        let token = issue_session_token(&config, &test_user()).unwrap();
        let claims = verify_session_token(&config.jwt_secret, &token).unwrap();
        assert_eq!(claims.sub, "u_abc");
        assert_eq!(claims.role, Role::Hr);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = test_config();
        let token = issue_session_token(&config, &test_user()).unwrap();
        assert!(verify_session_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let config = test_config();
        let mut token = issue_session_token(&config, &test_user()).unwrap();
        token.push('x');
        assert!(verify_session_token(&config.jwt_secret, &token).is_err());
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let config = test_config();
        let cookie = build_auth_cookie(&config, "tok".into());
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert!(cookie.http_only().unwrap_or(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash).unwrap());
        assert!(!verify_password("hunter3!", &hash).unwrap());
    }
}
