use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config_cmds;
mod context;
mod login_cmd;
mod notifier;
mod render;
mod run_cmd;
mod selection_cmds;
mod settings_cmds;

use cli::{Cli, Commands, ConfigCommands, SettingsCommands};

/// Used when `RUST_LOG` is unset: hosting intent and rotation events stay visible.
const DEFAULT_LOG_FILTER: &str = "warn,autohost_platform=info,autohost_scheduler=info";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .try_init()
        .ok();

    let cli = Cli::parse();
    let format = cli.format;

    match cli.command {
        Commands::Login { code, mock } => login_cmd::handle_login(code, mock, format).await?,
        Commands::Logout => login_cmd::handle_logout()?,
        Commands::Friends => selection_cmds::handle_friends(format).await?,
        Commands::Select { id } => selection_cmds::handle_select(id, format).await?,
        Commands::Status => selection_cmds::handle_status(format).await?,
        Commands::Settings { cmd } => match cmd {
            SettingsCommands::Show => settings_cmds::handle_settings_show(format)?,
            SettingsCommands::Delay { delay } => settings_cmds::handle_settings_delay(delay)?,
            SettingsCommands::Webhook { url } => settings_cmds::handle_settings_webhook(&url)?,
        },
        Commands::Reset => settings_cmds::handle_reset()?,
        Commands::Run {
            live_hosting,
            notifications,
        } => run_cmd::handle_run(live_hosting, notifications, format).await?,
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => config_cmds::handle_config_show(format)?,
            ConfigCommands::Init { force } => config_cmds::handle_config_init(force)?,
            ConfigCommands::Validate => config_cmds::handle_config_validate()?,
        },
    }

    Ok(())
}
