//! "Host this peer on my channel" actions.
//!
//! Callers dispatch these fire-and-forget: a failure is logged and never
//! affects the rotation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use autohost_core::{AppError, Peer};
use tracing::info;

#[async_trait]
pub trait HostAction: Send + Sync {
    async fn host_peer(&self, peer: &Peer) -> Result<()>;
}

/// Logs the hosting intent without contacting the platform.
#[derive(Debug, Clone)]
pub struct StubHostAction {
    channel_slug: String,
}

impl StubHostAction {
    pub fn new(channel_slug: impl Into<String>) -> Self {
        Self {
            channel_slug: channel_slug.into(),
        }
    }
}

#[async_trait]
impl HostAction for StubHostAction {
    async fn host_peer(&self, peer: &Peer) -> Result<()> {
        info!(
            channel = %self.channel_slug,
            "Simulating API call to host {} (slug: {})",
            peer.display_name,
            peer.slug
        );
        Ok(())
    }
}

/// Calls `POST {api_base}/channels/{channel}/host/{peer}` with a bearer token.
#[derive(Debug, Clone)]
pub struct KickApiHostAction {
    client: reqwest::Client,
    api_base_url: String,
    channel_slug: String,
    access_token: String,
}

impl KickApiHostAction {
    pub fn new(
        api_base_url: impl Into<String>,
        channel_slug: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            channel_slug: channel_slug.into(),
            access_token: access_token.into(),
        }
    }

    pub fn host_url(&self, peer: &Peer) -> String {
        format!(
            "{}/channels/{}/host/{}",
            self.api_base_url, self.channel_slug, peer.slug
        )
    }
}

#[async_trait]
impl HostAction for KickApiHostAction {
    async fn host_peer(&self, peer: &Peer) -> Result<()> {
        let url = self.host_url(peer);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .with_context(|| format!("failed to send host request to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HostingFailed {
                peer: peer.slug.clone(),
                message: format!("HTTP {status}"),
            }
            .into());
        }
        info!(peer = %peer.slug, "Successfully hosted {}", peer.display_name);
        Ok(())
    }
}
