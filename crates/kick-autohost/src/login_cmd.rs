use anyhow::{Context, Result};
use autohost_config::{KeyValueStore, keys};
use autohost_core::types::OutputFormat;
use autohost_platform::{AuthProvider, LoginStart, MockAuth, SimulatedPkceAuth};
use tracing::warn;

use crate::context::AppContext;

/// Handle `autohost login`.
pub(crate) async fn handle_login(
    code: Option<String>,
    mock: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut ctx = AppContext::load()?;
    let provider: Box<dyn AuthProvider> = if mock {
        Box::new(MockAuth)
    } else {
        Box::new(SimulatedPkceAuth::new(ctx.config.kick.clone()))
    };

    let token = match code {
        Some(code) => {
            let verifier = read_verifier(&ctx.store);
            let token = provider.complete_login(&code, verifier.as_deref()).await?;
            if let Err(e) = ctx.store.remove(keys::PKCE_VERIFIER) {
                warn!("Failed to clear PKCE verifier: {e:#}");
            }
            token
        }
        None => match provider.begin_login().await? {
            LoginStart::Complete { token } => token,
            LoginStart::Redirect {
                authorize_url,
                verifier,
            } => {
                let encoded = serde_json::to_string(&verifier)?;
                ctx.store
                    .set(keys::PKCE_VERIFIER, &encoded)
                    .context("Failed to store PKCE verifier")?;
                print_redirect(&authorize_url, format);
                return Ok(());
            }
        },
    };

    ctx.settings.access_token = Some(token);
    ctx.settings.save_access_token(&mut ctx.store);

    let user = ctx.user().await?;
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "logged_in": true,
                "user": user,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Welcome, {}!", user.display_name);
        }
    }
    Ok(())
}

/// Handle `autohost logout`: clear every stored record.
pub(crate) fn handle_logout() -> Result<()> {
    let mut ctx = AppContext::load()?;
    ctx.store
        .clear()
        .with_context(|| format!("Failed to clear {}", ctx.store.path().display()))?;
    eprintln!("Logged out. All stored data cleared.");
    Ok(())
}

fn read_verifier(store: &dyn KeyValueStore) -> Option<String> {
    match store.get(keys::PKCE_VERIFIER) {
        Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
        Ok(None) => None,
        Err(e) => {
            warn!("Error reading PKCE verifier: {e:#}");
            None
        }
    }
}

fn print_redirect(authorize_url: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "logged_in": false,
                "authorize_url": authorize_url,
            });
            println!("{output}");
        }
        OutputFormat::Text => {
            println!("Open this URL to authorize Kick AutoHost:");
            println!();
            println!("  {authorize_url}");
            println!();
            println!("Then finish with: autohost login --code <CODE>");
        }
    }
}
