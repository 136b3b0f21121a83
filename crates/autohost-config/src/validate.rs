use anyhow::{Result, bail};

use crate::global::GlobalConfig;

/// Largest accepted `rotation.max_selected`.
pub const MAX_SELECTED_LIMIT: usize = 100;

/// Validate a loaded global configuration.
/// Returns Ok(()) if valid, or Err with a descriptive message.
pub fn validate_config(config: &GlobalConfig) -> Result<()> {
    validate_rotation(config)?;
    validate_notification(config)?;
    validate_kick(config)?;
    Ok(())
}

fn validate_rotation(config: &GlobalConfig) -> Result<()> {
    let rotation = &config.rotation;
    if rotation.max_selected == 0 {
        bail!("rotation.max_selected must be > 0 (got 0)");
    }
    if rotation.max_selected > MAX_SELECTED_LIMIT {
        bail!(
            "rotation.max_selected must be <= {MAX_SELECTED_LIMIT} (got {})",
            rotation.max_selected
        );
    }
    if rotation.tick_ms == 0 {
        bail!("rotation.tick_ms must be > 0 (got 0)");
    }
    if rotation.interval_ms < rotation.tick_ms {
        bail!(
            "rotation.interval_ms ({}) must be >= rotation.tick_ms ({})",
            rotation.interval_ms,
            rotation.tick_ms
        );
    }
    Ok(())
}

fn validate_notification(config: &GlobalConfig) -> Result<()> {
    if config.notification.title.trim().is_empty() {
        bail!("notification.title cannot be empty");
    }
    Ok(())
}

fn validate_kick(config: &GlobalConfig) -> Result<()> {
    for (field, value) in [
        ("kick.auth_url", &config.kick.auth_url),
        ("kick.token_url", &config.kick.token_url),
        ("kick.api_base_url", &config.kick.api_base_url),
    ] {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            bail!("{field} must be an http(s) URL (got '{value}')");
        }
    }
    if config.kick.client_id.is_empty() {
        bail!("kick.client_id cannot be empty");
    }
    Ok(())
}
