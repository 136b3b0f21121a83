//! Global configuration for Kick AutoHost (`~/.config/kick-autohost/config.toml`).
//!
//! Stores user-level settings that do not change during a session:
//! - Rotation cap, interval and tick quantum
//! - Notification title/icon and the terminal notifier's permission
//! - Kick OAuth client settings and API base URL
//!
//! Completely separate from the persisted key-value state (selection,
//! notification delay, webhook, access token), which lives in the state dir.

use anyhow::{Context, Result};
use autohost_core::Permission;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;

/// Default maximum number of peers in the rotation.
const DEFAULT_MAX_SELECTED: usize = 3;
/// Default time each peer stays hosted.
const DEFAULT_INTERVAL_MS: u64 = 60 * 1000;
/// Default countdown quantum.
const DEFAULT_TICK_MS: u64 = 1000;

/// Global configuration loaded from `~/.config/kick-autohost/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub kick: KickConfig,
}

/// `[rotation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Maximum number of selected peers (default: 3).
    #[serde(default = "default_max_selected")]
    pub max_selected: usize,
    /// How long each peer stays hosted, in milliseconds (default: 60000).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Countdown quantum in milliseconds (default: 1000).
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Notify as soon as a peer becomes hosted because the selection changed,
    /// instead of only after the first full interval (default: true).
    #[serde(default = "default_true")]
    pub announce_on_change: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_selected: DEFAULT_MAX_SELECTED,
            interval_ms: DEFAULT_INTERVAL_MS,
            tick_ms: DEFAULT_TICK_MS,
            announce_on_change: true,
        }
    }
}

/// `[notification]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    /// Initial permission of the terminal notifier.
    #[serde(default)]
    pub permission: Permission,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            icon: default_icon(),
            permission: Permission::default(),
        }
    }
}

/// `[kick]` section: OAuth client and API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickConfig {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for KickConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_max_selected() -> usize {
    DEFAULT_MAX_SELECTED
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "Kick AutoHoster".to_string()
}

fn default_icon() -> String {
    "https://picsum.photos/seed/icon/192".to_string()
}

fn default_client_id() -> String {
    "kick-autohost-demo".to_string()
}

fn default_redirect_uri() -> String {
    "http://localhost:3000/callback".to_string()
}

fn default_scopes() -> String {
    "user:read channel:read channel:write".to_string()
}

fn default_auth_url() -> String {
    "https://id.kick.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://id.kick.com/oauth/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.kick.com/public/v1".to_string()
}

impl GlobalConfig {
    /// Load global config from `~/.config/kick-autohost/config.toml`.
    ///
    /// Returns `Default` if the file does not exist or if the config
    /// directory cannot be determined (e.g., no HOME in containers).
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(Self::default()),
        };
        Self::load_from(&path)
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read global config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config: {}", path.display()))?;
        Ok(config)
    }

    /// Path to the global config file: `~/.config/kick-autohost/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        let dir = paths::config_dir().context("Failed to determine config directory")?;
        Ok(dir.join("config.toml"))
    }

    /// Generate default config TOML with comments as a template.
    pub fn default_template() -> String {
        r#"# Kick AutoHost Global Configuration
# Location: ~/.config/kick-autohost/config.toml
#
# Selections, notification delay and webhook are changed with
# `autohost select` / `autohost settings` and are not stored here.

[rotation]
max_selected = 3           # Peers allowed in the rotation
interval_ms = 60000        # How long each peer stays hosted
tick_ms = 1000             # Countdown quantum
announce_on_change = true  # Notify immediately when the selection changes

[notification]
title = "Kick AutoHoster"
icon = "https://picsum.photos/seed/icon/192"
permission = "undetermined"  # granted | denied | undetermined

[kick]
client_id = "kick-autohost-demo"
redirect_uri = "http://localhost:3000/callback"
scopes = "user:read channel:read channel:write"
auth_url = "https://id.kick.com/oauth/authorize"
token_url = "https://id.kick.com/oauth/token"
api_base_url = "https://api.kick.com/public/v1"
"#
        .to_string()
    }

    /// Write the default template to `path`, creating directories as needed.
    pub fn save_default_template_to(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, Self::default_template())
            .with_context(|| format!("Failed to write global config: {}", path.display()))?;
        Ok(())
    }
}
