use autohost_core::types::{NotificationDelay, OutputFormat, PeerId, Permission};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "autohost")]
#[command(about = "Kick AutoHost: rotate hosting between selected friends")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with Kick (simulated OAuth PKCE)
    Login {
        /// Authorization code from the redirect; completes a pending login
        #[arg(long)]
        code: Option<String>,

        /// Skip OAuth and start a mock session
        #[arg(long, conflicts_with = "code")]
        mock: bool,
    },

    /// Log out and clear all stored data
    Logout,

    /// List friends eligible for auto-hosting
    Friends,

    /// Toggle a friend in or out of the rotation
    Select {
        /// Friend id (see `autohost friends`)
        id: PeerId,
    },

    /// Show the rotation order and settings
    Status,

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        cmd: SettingsCommands,
    },

    /// Reset selection and settings to defaults
    Reset,

    /// Run the rotation until Ctrl-C
    Run {
        /// Call the Kick API instead of only logging hosting intent
        #[arg(long)]
        live_hosting: bool,

        /// Override the notification permission from config
        #[arg(long, value_enum)]
        notifications: Option<Permission>,
    },

    /// Show/manage global configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Set the notification cooldown: off, 0, 1 or 2 (hours)
    Delay { delay: NotificationDelay },

    /// Set the webhook URL (stored only; never called)
    Webhook {
        /// URL, or an empty string to clear
        url: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write the default config template
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration file
    Validate,
}
