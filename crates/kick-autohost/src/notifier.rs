use std::cell::Cell;
use std::io::Write;

use anyhow::{Context, Result};
use autohost_core::Permission;
use autohost_scheduler::{NotificationMessage, Notifier};
use tracing::info;

/// Shows notifications as a bell plus a `[title] body` line on stderr.
///
/// A terminal cannot prompt for permission, so a request only logs how to
/// grant it; the permission stays undetermined until configured.
#[derive(Debug)]
pub(crate) struct TerminalNotifier {
    permission: Cell<Permission>,
    requested: Cell<bool>,
}

impl TerminalNotifier {
    pub(crate) fn new(permission: Permission) -> Self {
        Self {
            permission: Cell::new(permission),
            requested: Cell::new(false),
        }
    }

    pub(crate) fn format_line(message: &NotificationMessage) -> String {
        format!("\x07[{}] {}", message.title, message.body)
    }
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.permission.get()
    }

    fn request_permission(&self) {
        if self.requested.replace(true) {
            return;
        }
        info!(
            "Notifications need permission: set notification.permission = \"granted\" \
             in the config or pass --notifications granted"
        );
    }

    fn show(&self, message: &NotificationMessage) -> Result<()> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{}", Self::format_line(message))
            .context("Failed to write notification to stderr")
    }
}
