use anyhow::Result;
use autohost_core::types::{NotificationDelay, OutputFormat};

use crate::context::AppContext;
use crate::render;

pub(crate) fn handle_settings_show(format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ctx.settings)?),
        OutputFormat::Text => render::print_settings(&ctx.settings),
    }
    Ok(())
}

pub(crate) fn handle_settings_delay(delay: NotificationDelay) -> Result<()> {
    let mut ctx = AppContext::load()?;
    ctx.settings.notification_delay = delay;
    ctx.settings.save_notification_delay(&mut ctx.store);
    eprintln!("Notifications: {delay}");
    Ok(())
}

pub(crate) fn handle_settings_webhook(url: &str) -> Result<()> {
    let mut ctx = AppContext::load()?;
    ctx.settings.webhook_url = url.trim().to_string();
    ctx.settings.save_webhook_url(&mut ctx.store);
    if ctx.settings.webhook_url.is_empty() {
        eprintln!("Webhook cleared.");
    } else {
        eprintln!("Webhook saved: {}", ctx.settings.webhook_url);
    }
    Ok(())
}

/// Handle `autohost reset`. The access token survives.
pub(crate) fn handle_reset() -> Result<()> {
    let mut ctx = AppContext::load()?;
    ctx.settings.reset_to_defaults();
    ctx.settings.save(&mut ctx.store);
    eprintln!("Selection and settings reset to defaults.");
    Ok(())
}
