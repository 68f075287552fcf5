//! Bearer-token authentication for mutating relay routes

use axum::http::{header, HeaderMap};
use tequmsa_core::{AuthConfig, AuthMode, Error, Result};

/// Environment variable consulted when the config carries no token.
pub const TOKEN_ENV: &str = "TEQUMSA_RELAY_TOKEN";

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[derive(Clone, Debug)]
pub struct ResolvedAuth {
    pub mode: AuthMode,
    pub token: Option<String>,
}

impl ResolvedAuth {
    pub fn from_config(config: &AuthConfig, env_token: Option<String>) -> Self {
        let token = config.token.clone().or(env_token);
        Self { mode: config.mode.clone(), token }
    }

    pub fn open() -> Self {
        Self { mode: AuthMode::None, token: None }
    }

    pub fn verify_token(&self, provided: Option<&str>) -> Result<()> {
        match self.mode {
            AuthMode::None => Ok(()),
            AuthMode::Token => {
                let expected = self
                    .token
                    .as_deref()
                    .ok_or_else(|| Error::auth_failed("no token configured"))?;
                let provided = provided.ok_or_else(|| Error::auth_failed("token required"))?;
                if !constant_time_eq(expected.as_bytes(), provided.as_bytes()) {
                    return Err(Error::auth_failed("invalid token"));
                }
                Ok(())
            }
        }
    }

    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<()> {
        self.verify_token(bearer_token(headers))
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_auth() {
        let auth = ResolvedAuth { mode: AuthMode::Token, token: Some("relay-secret".into()) };
        assert!(auth.verify_token(Some("relay-secret")).is_ok());
        assert!(auth.verify_token(Some("relay-secreT")).is_err());
        assert!(auth.verify_token(Some("relay")).is_err());
        assert!(auth.verify_token(None).is_err());
    }

    #[test]
    fn test_no_auth() {
        let auth = ResolvedAuth::open();
        assert!(auth.verify_token(None).is_ok());
        assert!(auth.verify_token(Some("anything")).is_ok());
    }

    #[test]
    fn token_mode_without_token_rejects_everything() {
        let auth = ResolvedAuth::from_config(&AuthConfig::default(), None);
        let err = auth.verify_token(Some("guess")).unwrap_err();
        assert_eq!(err.to_string(), "authentication failed: no token configured");
    }

    #[test]
    fn config_token_wins_over_env() {
        let config = AuthConfig { mode: AuthMode::Token, token: Some("from-config".into()) };
        let auth = ResolvedAuth::from_config(&config, Some("from-env".into()));
        assert_eq!(auth.token.as_deref(), Some("from-config"));

        let auth = ResolvedAuth::from_config(&AuthConfig::default(), Some("from-env".into()));
        assert_eq!(auth.token.as_deref(), Some("from-env"));
    }

    #[test]
    fn bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }
}
