//! `autohost run`: the foreground rotation loop.
//!
//! One task owns the session. Countdown ticks, stdin command lines and
//! termination signals are multiplexed with `tokio::select!`; hosting actions
//! are spawned fire-and-forget so a slow or failing API call never delays the
//! countdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use autohost_config::KeyValueStore;
use autohost_core::types::{NotificationDelay, OutputFormat, PeerId, Permission};
use autohost_platform::{Directory, HostAction, KickApiHostAction, StubHostAction};
use autohost_scheduler::{AutoHostSession, SessionOptions, StepReport, ToggleOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::context::{AppContext, now_ms};
use crate::notifier::TerminalNotifier;
use crate::render;

type Session<S> = AutoHostSession<S, TerminalNotifier>;

/// A line typed at the `run` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunCommand {
    Toggle(PeerId),
    Friends,
    /// Re-fetch the friend directory.
    Refresh,
    Status,
    Delay(NotificationDelay),
    Webhook(String),
    Reset,
    Help,
    Quit,
}

/// Parse one prompt line. Blank lines yield `Ok(None)`.
pub(crate) fn parse_command(line: &str) -> Result<Option<RunCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "toggle" | "t" => {
            if rest.is_empty() {
                return Err("usage: toggle <friend-id>".to_string());
            }
            RunCommand::Toggle(rest.parse()?)
        }
        "friends" | "f" => RunCommand::Friends,
        "refresh" => RunCommand::Refresh,
        "status" | "s" => RunCommand::Status,
        "delay" => {
            if rest.is_empty() {
                return Err("usage: delay <off|0|1|2>".to_string());
            }
            RunCommand::Delay(rest.parse()?)
        }
        "webhook" => RunCommand::Webhook(rest.to_string()),
        "reset" => RunCommand::Reset,
        "help" | "h" | "?" => RunCommand::Help,
        "quit" | "q" | "exit" => RunCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

const HELP: &str = "\
Commands:
  toggle <id>      add or remove a friend from the rotation
  friends          list friends and their selection state
  refresh          reload the friend list
  status           show who is hosted and the countdown
  delay <off|1|2>  notification cooldown in hours
  webhook <url>    store a webhook URL (empty to clear)
  reset            clear selection and settings
  quit             stop auto-hosting";

/// Handle `autohost run`.
pub(crate) async fn handle_run(
    live_hosting: bool,
    notifications: Option<Permission>,
    format: OutputFormat,
) -> Result<()> {
    let ctx = AppContext::load()?;
    let token = ctx.token()?;
    let user = ctx.user().await?;
    let friends = ctx.friends().await?;

    let directory = ctx.directory();
    let host: Arc<dyn HostAction> = if live_hosting {
        info!(channel = %user.slug, "Live hosting enabled");
        Arc::new(KickApiHostAction::new(
            &ctx.config.kick.api_base_url,
            &user.slug,
            token.as_str(),
        ))
    } else {
        Arc::new(StubHostAction::new(&user.slug))
    };

    let permission = notifications.unwrap_or(ctx.config.notification.permission);
    let options = SessionOptions::from(&ctx.config);
    let tick = Duration::from_millis(ctx.config.rotation.tick_ms);
    let AppContext { store, .. } = ctx;
    let mut session = AutoHostSession::new(store, TerminalNotifier::new(permission), friends, options);

    if !session.settings().webhook_url.is_empty() {
        debug!(url = %session.settings().webhook_url, "Webhook configured; not dispatched");
    }

    eprintln!("Auto-hosting as {}. Type 'help' for commands, Ctrl-C to stop.", user.display_name);
    let report = session.start(now_ms());
    handle_report(&session, &host, &report, format);
    if session.current().is_none() {
        eprintln!("No friends selected yet. Use 'toggle <id>' to add one.");
    }

    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the countdown starts one quantum later.
    ticker.tick().await;

    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT, stopping rotation");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, stopping rotation");
                break;
            }
            _ = ticker.tick() => {
                let report = session.tick(now_ms());
                handle_report(&session, &host, &report, format);
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(RunCommand::Quit)) => break,
                    Ok(Some(RunCommand::Refresh)) => match directory.fetch_friends(&token).await {
                        Ok(friends) => {
                            let count = friends.len();
                            if let Some(report) = session.set_directory(friends, now_ms()) {
                                ticker.reset();
                                handle_report(&session, &host, &report, format);
                            }
                            eprintln!("Friend list refreshed ({count} friends).");
                        }
                        Err(e) => warn!("Failed to refresh friends: {e:#}"),
                    },
                    Ok(Some(command)) => {
                        if apply_command(&mut session, &host, command, format) {
                            // The countdown restarted; the next tick is one full quantum away.
                            ticker.reset();
                        }
                    }
                    Ok(None) => {}
                    Err(msg) => eprintln!("{msg}"),
                },
                Ok(None) => {
                    debug!("stdin closed; rotation continues until interrupted");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {e}");
                    stdin_open = false;
                }
            },
        }
    }

    eprintln!("Auto-hosting stopped.");
    Ok(())
}

/// Apply a prompt command. Returns `true` when the rotation countdown was
/// restarted, so the caller can realign its timer.
fn apply_command<S: KeyValueStore>(
    session: &mut Session<S>,
    host: &Arc<dyn HostAction>,
    command: RunCommand,
    format: OutputFormat,
) -> bool {
    match command {
        RunCommand::Toggle(id) => return match session.toggle(id, now_ms()) {
            Ok((ToggleOutcome::Rejected, _)) => {
                eprintln!(
                    "Rotation is full ({} friends). Deselect someone first.",
                    session.selection().cap()
                );
                false
            }
            Ok((outcome, report)) => {
                debug!(peer = %id, ?outcome, "Toggled");
                if session.current().is_none() {
                    eprintln!("Rotation idle: no friends selected.");
                }
                handle_report(session, host, &report, format);
                true
            }
            Err(e) => {
                eprintln!("{e}");
                false
            }
        },
        RunCommand::Friends => {
            for friend in session.directory() {
                let mark = if session.selection().contains(friend.id) { "[x]" } else { "[ ]" };
                eprintln!("  {mark} {:>3}  {}", friend.id, friend.display_name);
            }
        }
        RunCommand::Status => print_status(session),
        RunCommand::Delay(delay) => {
            session.set_notification_delay(delay);
            eprintln!("Notifications: {delay}");
        }
        RunCommand::Webhook(url) => {
            session.set_webhook_url(&url);
            eprintln!("Webhook saved (stored only).");
        }
        RunCommand::Reset => {
            session.reset();
            eprintln!("Selection and settings reset. Rotation idle.");
            return true;
        }
        RunCommand::Help => eprintln!("{HELP}"),
        // Handled by the run loop.
        RunCommand::Refresh | RunCommand::Quit => {}
    }
    false
}

fn handle_report<S: KeyValueStore>(
    session: &Session<S>,
    host: &Arc<dyn HostAction>,
    report: &StepReport,
    format: OutputFormat,
) {
    if report.is_empty() {
        return;
    }
    if let Some(change) = &report.hosting {
        match format {
            OutputFormat::Json => match serde_json::to_string(report) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("Failed to encode step report: {e}"),
            },
            OutputFormat::Text => println!(
                "Now hosting {} ({}/{})",
                change.peer.display_name,
                change.pointer + 1,
                session.snapshot().len()
            ),
        }
        dispatch_hosting(host, change.peer.clone());
    }
    if let Some(outcome) = &report.notification {
        debug!(?outcome, "Notification decision");
    }
}

fn dispatch_hosting(host: &Arc<dyn HostAction>, peer: autohost_core::Peer) {
    let host = Arc::clone(host);
    tokio::spawn(async move {
        if let Err(e) = host.host_peer(&peer).await {
            warn!(peer = %peer.slug, "Hosting action failed: {e:#}");
        }
    });
}

fn print_status<S: KeyValueStore>(session: &Session<S>) {
    let state = session.state();
    match session.current() {
        Some(peer) => {
            eprintln!("Hosting: {}", peer.display_name);
            eprintln!(
                "Next in {}  {}",
                render::format_remaining(state.remaining_ms),
                render::progress_bar(session.progress_fraction())
            );
        }
        None => eprintln!("Hosting: nobody"),
    }
    render::print_rotation_order(session.snapshot(), session.current().map(|_| state.pointer));
    render::print_settings(session.settings());
}
