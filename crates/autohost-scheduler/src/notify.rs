//! Desktop notification side-channel with a wall-clock cooldown.
//!
//! The cooldown is keyed by time only, not by peer: while it runs, no
//! notification is shown regardless of how many peers rotate through.

use anyhow::Result;
use autohost_config::NotificationConfig;
use autohost_core::{NotificationDelay, Permission};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A transient message for the notification capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
    pub icon: String,
}

/// Platform "show a message" primitive gated by a tri-state permission.
pub trait Notifier {
    /// Whether the host environment offers notifications at all.
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission;

    /// Ask for permission without waiting for the answer.
    fn request_permission(&self);

    fn show(&self, message: &NotificationMessage) -> Result<()>;
}

/// What `maybe_notify` decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum NotifyOutcome {
    Sent,
    /// Delay is set to off.
    Disabled,
    Unsupported,
    PermissionDenied,
    /// Permission was undetermined; a request was issued.
    PermissionRequested,
    CoolingDown { remaining_ms: i64 },
    /// `show` returned an error.
    Failed,
}

/// Builds notification messages and enforces the cooldown.
#[derive(Debug, Clone)]
pub struct NotificationGate {
    title: String,
    icon: String,
}

impl Default for NotificationGate {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

impl From<&NotificationConfig> for NotificationGate {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            title: config.title.clone(),
            icon: config.icon.clone(),
        }
    }
}

impl NotificationGate {
    pub fn message_for(&self, peer_name: &str) -> NotificationMessage {
        NotificationMessage {
            title: self.title.clone(),
            body: format!("You are now auto-hosting {peer_name}!"),
            icon: self.icon.clone(),
        }
    }

    /// Show a notification for `peer_name` if the capability, its permission,
    /// the delay setting and the cooldown all allow it.
    ///
    /// On success `last_fired_at_ms` is set to `now_ms`; the caller persists it.
    pub fn maybe_notify(
        &self,
        notifier: &dyn Notifier,
        delay: NotificationDelay,
        last_fired_at_ms: &mut i64,
        peer_name: &str,
        now_ms: i64,
    ) -> NotifyOutcome {
        if !notifier.is_supported() {
            return NotifyOutcome::Unsupported;
        }
        if !delay.is_enabled() {
            return NotifyOutcome::Disabled;
        }

        if notifier.permission() == Permission::Undetermined {
            notifier.request_permission();
        }
        match notifier.permission() {
            Permission::Granted => {}
            Permission::Denied => return NotifyOutcome::PermissionDenied,
            Permission::Undetermined => return NotifyOutcome::PermissionRequested,
        }

        let cooldown_ms = delay.cooldown_ms();
        let elapsed = now_ms.saturating_sub(*last_fired_at_ms);
        if elapsed < cooldown_ms {
            debug!(
                peer = peer_name,
                remaining_ms = cooldown_ms - elapsed,
                "Notification suppressed by cooldown"
            );
            return NotifyOutcome::CoolingDown {
                remaining_ms: cooldown_ms - elapsed,
            };
        }

        match notifier.show(&self.message_for(peer_name)) {
            Ok(()) => {
                *last_fired_at_ms = now_ms;
                info!(peer = peer_name, "Notification shown");
                NotifyOutcome::Sent
            }
            Err(e) => {
                warn!(peer = peer_name, "Failed to show notification: {e:#}");
                NotifyOutcome::Failed
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingNotifier;
    use super::*;

    const MINUTE: i64 = 60 * 1000;
    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_sends_when_cooldown_elapsed() {
        let gate = NotificationGate::default();
        let notifier = RecordingNotifier::granted();
        let mut last = 0;
        let outcome =
            gate.maybe_notify(&notifier, NotificationDelay::OneHour, &mut last, "CodeNinja", T0);
        assert_eq!(outcome, NotifyOutcome::Sent);
        assert_eq!(last, T0);
        assert_eq!(
            notifier.shown_bodies(),
            vec!["You are now auto-hosting CodeNinja!".to_string()]
        );
        assert_eq!(notifier.shown.borrow()[0].title, "Kick AutoHoster");
    }

    #[test]
    fn test_thirty_minutes_apart_sends_once() {
        let gate = NotificationGate::default();
        let notifier = RecordingNotifier::granted();
        let mut last = 0;
        gate.maybe_notify(&notifier, NotificationDelay::OneHour, &mut last, "A", T0);
        let second = gate.maybe_notify(
            &notifier,
            NotificationDelay::OneHour,
            &mut last,
            "B",
            T0 + 30 * MINUTE,
        );
        assert_eq!(
            second,
            NotifyOutcome::CoolingDown {
                remaining_ms: 30 * MINUTE
            }
        );
        assert_eq!(notifier.shown.borrow().len(), 1);
        assert_eq!(last, T0);
    }

    #[test]
    fn test_sixty_one_minutes_apart_sends_twice() {
        let gate = NotificationGate::default();
        let notifier = RecordingNotifier::granted();
        let mut last = 0;
        gate.maybe_notify(&notifier, NotificationDelay::OneHour, &mut last, "A", T0);
        let second = gate.maybe_notify(
            &notifier,
            NotificationDelay::OneHour,
            &mut last,
            "B",
            T0 + 61 * MINUTE,
        );
        assert_eq!(second, NotifyOutcome::Sent);
        assert_eq!(notifier.shown.borrow().len(), 2);
    }

    #[test]
    fn test_exactly_at_cooldown_boundary_sends() {
        let gate = NotificationGate::default();
        let notifier = RecordingNotifier::granted();
        let mut last = T0;
        let outcome = gate.maybe_notify(
            &notifier,
            NotificationDelay::TwoHours,
            &mut last,
            "A",
            T0 + 120 * MINUTE,
        );
        assert_eq!(outcome, NotifyOutcome::Sent);
    }

    #[test]
    fn test_disabled_delay_never_sends_or_requests() {
        let gate = NotificationGate::default();
        let notifier = RecordingNotifier::with_permission(Permission::Undetermined);
        let mut last = 0;
        let outcome = gate.maybe_notify(&notifier, NotificationDelay::Off, &mut last, "A", T0);
        assert_eq!(outcome, NotifyOutcome::Disabled);
        assert_eq!(notifier.requests.get(), 0);
        assert!(notifier.shown.borrow().is_empty());
    }

    #[test]
    fn test_unsupported_capability_skips() {
        let gate = NotificationGate::default();
        let mut notifier = RecordingNotifier::granted();
        notifier.supported = false;
        let mut last = 0;
        let outcome =
            gate.maybe_notify(&notifier, NotificationDelay::OneHour, &mut last, "A", T0);
        assert_eq!(outcome, NotifyOutcome::Unsupported);
        assert_eq!(last, 0);
    }

    #[test]
    fn test_denied_permission_skips() {
        let gate = NotificationGate::default();
        let notifier = RecordingNotifier::with_permission(Permission::Denied);
        let mut last = 0;
        let outcome =
            gate.maybe_notify(&notifier, NotificationDelay::OneHour, &mut last, "A", T0);
        assert_eq!(outcome, NotifyOutcome::PermissionDenied);
        assert_eq!(notifier.requests.get(), 0);
    }

    #[test]
    fn test_undetermined_permission_requests_and_skips() {
        let gate = NotificationGate::default();
        let notifier = RecordingNotifier::with_permission(Permission::Undetermined);
        let mut last = 0;
        let outcome =
            gate.maybe_notify(&notifier, NotificationDelay::OneHour, &mut last, "A", T0);
        assert_eq!(outcome, NotifyOutcome::PermissionRequested);
        assert_eq!(notifier.requests.get(), 1);
        assert!(notifier.shown.borrow().is_empty());
    }

    #[test]
    fn test_synchronously_granted_request_sends() {
        let gate = NotificationGate::default();
        let mut notifier = RecordingNotifier::with_permission(Permission::Undetermined);
        notifier.grant_on_request = Some(Permission::Granted);
        let mut last = 0;
        let outcome =
            gate.maybe_notify(&notifier, NotificationDelay::OneHour, &mut last, "A", T0);
        assert_eq!(outcome, NotifyOutcome::Sent);
    }

    #[test]
    fn test_failed_show_does_not_start_cooldown() {
        let gate = NotificationGate::default();
        let mut notifier = RecordingNotifier::granted();
        notifier.fail = true;
        let mut last = 0;
        let outcome =
            gate.maybe_notify(&notifier, NotificationDelay::OneHour, &mut last, "A", T0);
        assert_eq!(outcome, NotifyOutcome::Failed);
        assert_eq!(last, 0);
    }
}
