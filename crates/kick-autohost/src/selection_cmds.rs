use anyhow::Result;
use autohost_core::types::{OutputFormat, PeerId};
use autohost_core::AppError;
use autohost_scheduler::{SelectionStore, ToggleOutcome};

use crate::context::AppContext;
use crate::render;

/// Handle `autohost friends`.
pub(crate) async fn handle_friends(format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load()?;
    let friends = ctx.friends().await?;
    let cap = ctx.config.rotation.max_selected;
    let selection = SelectionStore::from_ids(&ctx.settings.selected_friend_ids, cap);

    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = friends
                .iter()
                .map(|friend| {
                    serde_json::json!({
                        "id": friend.id,
                        "display_name": friend.display_name,
                        "avatar_ref": friend.avatar_ref,
                        "selected": selection.contains(friend.id),
                    })
                })
                .collect();
            let output = serde_json::json!({ "friends": entries, "max_selected": cap });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if friends.is_empty() {
                println!("No friends found on your Kick account.");
                return Ok(());
            }
            println!("Select up to {cap} friends for auto-host rotation.");
            for friend in &friends {
                let mark = if selection.contains(friend.id) {
                    "[x]"
                } else if selection.is_full() {
                    "[-]"
                } else {
                    "[ ]"
                };
                println!("  {mark} {:>3}  {}", friend.id, friend.display_name);
            }
        }
    }
    Ok(())
}

/// Handle `autohost select <id>`.
///
/// Only the stored selection changes here; a running `autohost run` picks up
/// selections made through its own prompt.
pub(crate) async fn handle_select(id: PeerId, format: OutputFormat) -> Result<()> {
    let mut ctx = AppContext::load()?;
    let friends = ctx.friends().await?;
    let cap = ctx.config.rotation.max_selected;
    let mut selection = SelectionStore::from_ids(&ctx.settings.selected_friend_ids, cap);

    if !selection.contains(id) && !friends.iter().any(|f| f.id == id) {
        return Err(AppError::UnknownPeer(id.0).into());
    }

    let outcome = selection.toggle(id);
    if outcome.changed() {
        ctx.settings.selected_friend_ids = selection.ids().to_vec();
        ctx.settings.save_selection(&mut ctx.store);
    }

    let snapshot = selection.snapshot(&friends);
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "outcome": outcome,
                "selected": selection.ids(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            match outcome {
                ToggleOutcome::Added => println!("Added {id} to the rotation."),
                ToggleOutcome::Removed => println!("Removed {id} from the rotation."),
                ToggleOutcome::Rejected => {
                    println!("Rotation is full ({cap} friends). Deselect someone first.")
                }
            }
            render::print_rotation_order(&snapshot, None);
        }
    }
    Ok(())
}

/// Handle `autohost status`.
pub(crate) async fn handle_status(format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load()?;
    let user = ctx.user().await?;
    let friends = ctx.friends().await?;
    let cap = ctx.config.rotation.max_selected;
    let selection = SelectionStore::from_ids(&ctx.settings.selected_friend_ids, cap);
    let snapshot = selection.snapshot(&friends);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "user": user,
                "rotation": snapshot,
                "interval_ms": ctx.config.rotation.interval_ms,
                "settings": ctx.settings,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Logged in as {}", user.display_name);
            println!(
                "Each friend is hosted for {}",
                render::format_remaining(ctx.config.rotation.interval_ms)
            );
            render::print_rotation_order(&snapshot, (!snapshot.is_empty()).then_some(0));
            render::print_settings(&ctx.settings);
        }
    }
    Ok(())
}
