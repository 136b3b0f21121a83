//! One auto-hosting session: selection, rotation and notifications wired to
//! persisted settings.
//!
//! Every selection mutation is persisted and fed to the scheduler in the same
//! call, so the rotation always restarts from the first selected peer with a
//! full countdown. Hosting is left to the caller: each step returns the
//! `HostingChange` (if any) that should be dispatched.

use anyhow::Result;
use autohost_config::{GlobalConfig, KeyValueStore, PersistedSettings};
use autohost_core::{AppError, NotificationDelay, Peer, PeerId};
use serde::Serialize;
use tracing::{debug, info};

use crate::notify::{NotificationGate, Notifier, NotifyOutcome};
use crate::rotation::{ChangeCause, HostingChange, RotationScheduler, RotationState, RotationTiming};
use crate::selection::{SelectionStore, ToggleOutcome};

/// Static parameters of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub cap: usize,
    pub timing: RotationTiming,
    /// Notify when a selection change makes a peer hosted, not only when the
    /// interval elapses.
    pub announce_on_change: bool,
    pub gate: NotificationGate,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&GlobalConfig::default())
    }
}

impl From<&GlobalConfig> for SessionOptions {
    fn from(config: &GlobalConfig) -> Self {
        Self {
            cap: config.rotation.max_selected,
            timing: RotationTiming::from(&config.rotation),
            announce_on_change: config.rotation.announce_on_change,
            gate: NotificationGate::from(&config.notification),
        }
    }
}

/// Side effects produced by one session step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepReport {
    /// Peer that became hosted and should be handed to the hosting action.
    pub hosting: Option<HostingChange>,
    pub notification: Option<NotifyOutcome>,
}

impl StepReport {
    pub fn is_empty(&self) -> bool {
        self.hosting.is_none() && self.notification.is_none()
    }
}

pub struct AutoHostSession<S: KeyValueStore, N: Notifier> {
    store: S,
    notifier: N,
    directory: Vec<Peer>,
    settings: PersistedSettings,
    selection: SelectionStore,
    scheduler: RotationScheduler,
    options: SessionOptions,
}

impl<S: KeyValueStore, N: Notifier> AutoHostSession<S, N> {
    /// Load persisted settings and prepare an idle rotation.
    ///
    /// Call [`start`](Self::start) to enter the rotation with the persisted
    /// selection.
    pub fn new(mut store: S, notifier: N, directory: Vec<Peer>, options: SessionOptions) -> Self {
        let mut settings = PersistedSettings::load(&store);
        if settings.normalize_selection(options.cap) {
            debug!(
                kept = settings.selected_friend_ids.len(),
                "Trimmed persisted selection to cap"
            );
            settings.save_selection(&mut store);
        }
        let selection = SelectionStore::from_ids(&settings.selected_friend_ids, options.cap);
        Self {
            store,
            notifier,
            directory,
            settings,
            selection,
            scheduler: RotationScheduler::new(options.timing),
            options,
        }
    }

    /// Enter the rotation with the current selection.
    pub fn start(&mut self, now_ms: i64) -> StepReport {
        self.apply_selection(now_ms)
    }

    /// Toggle a peer in or out of the selection.
    ///
    /// Unknown ids can only be removed (a stale persisted id); adding one is
    /// an error. A rejected toggle leaves the rotation untouched.
    pub fn toggle(&mut self, id: PeerId, now_ms: i64) -> Result<(ToggleOutcome, StepReport)> {
        if !self.selection.contains(id) && !self.directory.iter().any(|p| p.id == id) {
            return Err(AppError::UnknownPeer(id.0).into());
        }
        let outcome = self.selection.toggle(id);
        if !outcome.changed() {
            debug!(peer = %id, cap = self.selection.cap(), "Selection full, toggle ignored");
            return Ok((outcome, StepReport::default()));
        }
        self.settings.selected_friend_ids = self.selection.ids().to_vec();
        self.settings.save_selection(&mut self.store);
        info!(peer = %id, ?outcome, "Selection changed");
        Ok((outcome, self.apply_selection(now_ms)))
    }

    /// Advance the rotation by one quantum.
    pub fn tick(&mut self, now_ms: i64) -> StepReport {
        match self.scheduler.tick() {
            Some(change) => self.announce(change, now_ms),
            None => StepReport::default(),
        }
    }

    /// Restore all settings to their defaults and stop the rotation.
    pub fn reset(&mut self) {
        self.settings.reset_to_defaults();
        self.settings.save(&mut self.store);
        self.selection.reset();
        self.scheduler.clear();
        info!("Settings reset to defaults");
    }

    pub fn set_notification_delay(&mut self, delay: NotificationDelay) {
        self.settings.notification_delay = delay;
        self.settings.save_notification_delay(&mut self.store);
    }

    pub fn set_webhook_url(&mut self, url: &str) {
        self.settings.webhook_url = url.trim().to_string();
        self.settings.save_webhook_url(&mut self.store);
    }

    /// Replace the friend directory. The rotation restarts only if the
    /// resolved snapshot differs from the one being rotated; `None` means it
    /// kept running untouched.
    pub fn set_directory(&mut self, directory: Vec<Peer>, now_ms: i64) -> Option<StepReport> {
        self.directory = directory;
        if self.selection.snapshot(&self.directory) == self.scheduler.snapshot() {
            return None;
        }
        Some(self.apply_selection(now_ms))
    }

    pub fn settings(&self) -> &PersistedSettings {
        &self.settings
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn directory(&self) -> &[Peer] {
        &self.directory
    }

    pub fn state(&self) -> RotationState {
        self.scheduler.state()
    }

    pub fn current(&self) -> Option<&Peer> {
        self.scheduler.current()
    }

    pub fn snapshot(&self) -> &[Peer] {
        self.scheduler.snapshot()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.scheduler.progress_fraction()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn apply_selection(&mut self, now_ms: i64) -> StepReport {
        let snapshot = self.selection.snapshot(&self.directory);
        match self.scheduler.on_selection_changed(snapshot) {
            Some(change) => self.announce(change, now_ms),
            None => StepReport::default(),
        }
    }

    fn announce(&mut self, change: HostingChange, now_ms: i64) -> StepReport {
        let notify = match change.cause {
            ChangeCause::IntervalElapsed => true,
            ChangeCause::SelectionChanged => self.options.announce_on_change,
        };
        let notification = notify.then(|| {
            let before = self.settings.last_notification_time;
            let outcome = self.options.gate.maybe_notify(
                &self.notifier,
                self.settings.notification_delay,
                &mut self.settings.last_notification_time,
                &change.peer.display_name,
                now_ms,
            );
            if self.settings.last_notification_time != before {
                self.settings.save_last_notification_time(&mut self.store);
            }
            outcome
        });
        StepReport {
            hosting: Some(change),
            notification,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
