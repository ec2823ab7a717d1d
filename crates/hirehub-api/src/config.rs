//! API configuration.

use std::time::Duration;

use anyhow::bail;
use tracing::warn;

/// Fallback secret for local development only.
const DEV_JWT_SECRET: &str = "hirehub-dev-secret-do-not-use-in-prod";
/// Fallback HR registration code for local development only.
const DEV_COMPANY_CODE: &str = "HIREHUB-DEV";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second for authenticated routes
    pub rate_limit_rps: u32,
    /// Stricter rate limit for unauthenticated routes (login, signup, apply)
    pub public_rate_limit_rps: u32,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    /// Registration code gating the HR role
    pub hr_company_code: String,
    /// Session lifetime, also the auth cookie Max-Age
    pub session_ttl: Duration,
    /// Whether the auth cookie carries the Secure attribute
    pub cookie_secure: bool,
    /// Environment (development/production)
    pub environment: String,
}

impl ApiConfig {
    /// Create config from environment variables.
    ///
    /// Fails fast when secrets are missing outside development mode.
    pub fn from_env() -> anyhow::Result<Self> {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let is_dev = environment.to_lowercase() == "development";

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ if is_dev => {
                warn!("JWT_SECRET not set, using development fallback");
                DEV_JWT_SECRET.to_string()
            }
            _ => bail!("JWT_SECRET must be set outside development mode"),
        };

        let hr_company_code = match std::env::var("HR_COMPANY_CODE") {
            Ok(s) if !s.is_empty() => s,
            _ if is_dev => {
                warn!("HR_COMPANY_CODE not set, using development fallback");
                DEV_COMPANY_CODE.to_string()
            }
            _ => bail!("HR_COMPANY_CODE must be set outside development mode"),
        };

        let config = Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            public_rate_limit_rps: std::env::var("PUBLIC_RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            jwt_secret,
            hr_company_code,
            session_ttl: Duration::from_secs(
                std::env::var("SESSION_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(86_400),
            ),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(!is_dev),
            environment,
        };

        Ok(config)
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "ENVIRONMENT",
            "JWT_SECRET",
            "HR_COMPANY_CODE",
            "SESSION_TTL_SECS",
            "COOKIE_SECURE",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_development_falls_back_on_missing_secrets() {
        clear_env();
        let config = ApiConfig::from_env().unwrap();
        assert!(!config.is_production());
        assert!(!config.cookie_secure);
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
    }

    #[test]
    #[serial]
    fn test_production_requires_jwt_secret() {
        clear_env();
        std::env::set_var("ENVIRONMENT", "production");
        assert!(ApiConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_production_requires_company_code() {
        clear_env();
        std::env::set_var("ENVIRONMENT", "production");
        std::env::set_var("JWT_SECRET", "s3cret");
        assert!(ApiConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_production_cookie_is_secure_by_default() {
        clear_env();
        std::env::set_var("ENVIRONMENT", "production");
        std::env::set_var("JWT_SECRET", "s3cret");
        std::env::set_var("HR_COMPANY_CODE", "ACME-2026");
        let config = ApiConfig::from_env().unwrap();
        assert!(config.is_production());
        assert!(config.cookie_secure);
        clear_env();
    }
}
