//! Login providers.
//!
//! `SimulatedPkceAuth` produces a real Kick authorize URL with an S256 code
//! challenge, then fakes the token exchange. `MockAuth` skips the redirect
//! entirely and logs in immediately.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use autohost_config::KickConfig;
use autohost_core::AppError;
use tracing::{debug, info};

use crate::pkce;

/// First step of a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStart {
    /// The user must visit `authorize_url`; `verifier` must be kept until the
    /// callback code arrives.
    Redirect {
        authorize_url: String,
        verifier: String,
    },
    /// No redirect needed; the session token is ready.
    Complete { token: String },
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn begin_login(&self) -> Result<LoginStart>;

    /// Exchange the authorization `code` for an access token.
    async fn complete_login(&self, code: &str, verifier: Option<&str>) -> Result<String>;
}

/// OAuth 2.0 authorization-code flow with PKCE, minus the token endpoint.
#[derive(Debug, Clone)]
pub struct SimulatedPkceAuth {
    config: KickConfig,
    exchange_delay: Duration,
}

impl SimulatedPkceAuth {
    pub fn new(config: KickConfig) -> Self {
        Self {
            config,
            exchange_delay: Duration::from_millis(500),
        }
    }

    /// Override the simulated network delay of the token exchange.
    pub fn with_exchange_delay(mut self, delay: Duration) -> Self {
        self.exchange_delay = delay;
        self
    }

    pub fn authorize_url(&self, challenge: &str) -> Result<String> {
        let url = reqwest::Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", self.config.scopes.as_str()),
                ("code_challenge", challenge),
                ("code_challenge_method", "S256"),
            ],
        )
        .with_context(|| format!("Invalid kick.auth_url: {}", self.config.auth_url))?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl AuthProvider for SimulatedPkceAuth {
    async fn begin_login(&self) -> Result<LoginStart> {
        let verifier = pkce::generate_code_verifier();
        let challenge = pkce::code_challenge(&verifier);
        let authorize_url = self.authorize_url(&challenge)?;
        debug!(%authorize_url, "PKCE login started");
        Ok(LoginStart::Redirect {
            authorize_url,
            verifier,
        })
    }

    async fn complete_login(&self, code: &str, verifier: Option<&str>) -> Result<String> {
        let verifier = verifier
            .filter(|v| !v.is_empty())
            .ok_or(AppError::MissingPkceVerifier)?;
        if code.trim().is_empty() {
            return Err(AppError::EmptyAuthorizationCode.into());
        }

        info!(
            token_url = %self.config.token_url,
            "Simulating token exchange with code and verifier"
        );
        debug!(challenge = %pkce::code_challenge(verifier), "Verifier accepted");
        tokio::time::sleep(self.exchange_delay).await;
        Ok(format!(
            "simulated_token_{}",
            chrono::Utc::now().timestamp_millis()
        ))
    }
}

/// Logs in without any redirect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockAuth;

const MOCK_TOKEN: &str = "mock_session_token";

#[async_trait]
impl AuthProvider for MockAuth {
    async fn begin_login(&self) -> Result<LoginStart> {
        Ok(LoginStart::Complete {
            token: MOCK_TOKEN.to_string(),
        })
    }

    async fn complete_login(&self, _code: &str, _verifier: Option<&str>) -> Result<String> {
        Ok(MOCK_TOKEN.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulated() -> SimulatedPkceAuth {
        SimulatedPkceAuth::new(KickConfig::default()).with_exchange_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_begin_login_builds_authorize_url() {
        let start = simulated().begin_login().await.unwrap();
        let LoginStart::Redirect {
            authorize_url,
            verifier,
        } = start
        else {
            panic!("expected redirect");
        };
        let url = reqwest::Url::parse(&authorize_url).unwrap();
        assert_eq!(url.host_str(), Some("id.kick.com"));
        assert_eq!(url.path(), "/oauth/authorize");

        let params: std::collections::HashMap<String, String> =
            url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["client_id"], "kick-autohost-demo");
        assert_eq!(params["scope"], "user:read channel:read channel:write");
        assert_eq!(params["code_challenge"], pkce::code_challenge(&verifier));
    }

    #[tokio::test]
    async fn test_complete_login_returns_simulated_token() {
        let token = simulated()
            .complete_login("abc123", Some("verifier"))
            .await
            .unwrap();
        assert!(token.starts_with("simulated_token_"));
    }

    #[tokio::test]
    async fn test_complete_login_without_verifier_fails() {
        let err = simulated().complete_login("abc123", None).await.unwrap_err();
        assert!(err.to_string().contains("PKCE verifier"));

        let err = simulated()
            .complete_login("abc123", Some(""))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("PKCE verifier"));
    }

    #[tokio::test]
    async fn test_complete_login_with_blank_code_fails() {
        let err = simulated()
            .complete_login("  ", Some("verifier"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Authorization code"));
    }

    #[test]
    fn test_invalid_auth_url_is_error() {
        let config = KickConfig {
            auth_url: "not a url".to_string(),
            ..KickConfig::default()
        };
        assert!(SimulatedPkceAuth::new(config).authorize_url("x").is_err());
    }

    #[tokio::test]
    async fn test_mock_auth_completes_immediately() {
        let start = MockAuth.begin_login().await.unwrap();
        assert_eq!(
            start,
            LoginStart::Complete {
                token: MOCK_TOKEN.to_string()
            }
        );
        assert_eq!(
            MockAuth.complete_login("", None).await.unwrap(),
            MOCK_TOKEN
        );
    }
}
