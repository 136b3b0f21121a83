//! The `PersistedSettings` aggregate.
//!
//! Every record is read independently: a missing, unreadable or corrupt
//! record falls back to its default without affecting the others. Writes are
//! best-effort; failures are logged and swallowed so that neither the CLI nor
//! the rotation loop ever fails because storage did.

use autohost_core::{NotificationDelay, PeerId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::store::KeyValueStore;

/// Storage keys of the persisted records.
pub mod keys {
    pub const SELECTED_FRIEND_IDS: &str = "selectedFriendIds";
    pub const NOTIFICATION_DELAY: &str = "notificationDelay";
    pub const WEBHOOK_URL: &str = "webhookUrl";
    pub const LAST_NOTIFICATION_TIME: &str = "lastNotificationTime";
    pub const ACCESS_TOKEN: &str = "kickAccessToken";
    pub const PKCE_VERIFIER: &str = "pkce_verifier";
}

/// All user-changeable state that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersistedSettings {
    /// Selected peers in rotation order.
    pub selected_friend_ids: Vec<PeerId>,
    pub notification_delay: NotificationDelay,
    /// Declared extension point: stored and shown, never called.
    pub webhook_url: String,
    /// Epoch milliseconds of the last desktop notification.
    pub last_notification_time: i64,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl PersistedSettings {
    /// Load every record, substituting defaults for anything unusable.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            selected_friend_ids: read_or_default(store, keys::SELECTED_FRIEND_IDS),
            notification_delay: read_or_default(store, keys::NOTIFICATION_DELAY),
            webhook_url: read_or_default(store, keys::WEBHOOK_URL),
            last_notification_time: read_or_default(store, keys::LAST_NOTIFICATION_TIME),
            access_token: read_or_default(store, keys::ACCESS_TOKEN),
        }
    }

    /// Write every record in one batch.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        let entries = match self.encode_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to encode settings: {e}");
                return;
            }
        };
        let borrowed: Vec<(&str, String)> = entries.into_iter().collect();
        if let Err(e) = store.set_many(&borrowed) {
            warn!("Failed to persist settings: {e:#}");
        }
    }

    pub fn save_selection(&self, store: &mut dyn KeyValueStore) {
        write_record(store, keys::SELECTED_FRIEND_IDS, &self.selected_friend_ids);
    }

    pub fn save_notification_delay(&self, store: &mut dyn KeyValueStore) {
        write_record(store, keys::NOTIFICATION_DELAY, &self.notification_delay);
    }

    pub fn save_webhook_url(&self, store: &mut dyn KeyValueStore) {
        write_record(store, keys::WEBHOOK_URL, &self.webhook_url);
    }

    pub fn save_last_notification_time(&self, store: &mut dyn KeyValueStore) {
        write_record(
            store,
            keys::LAST_NOTIFICATION_TIME,
            &self.last_notification_time,
        );
    }

    pub fn save_access_token(&self, store: &mut dyn KeyValueStore) {
        write_record(store, keys::ACCESS_TOKEN, &self.access_token);
    }

    /// Restore selection, delay, webhook and notification time to their
    /// defaults. The session token is kept.
    pub fn reset_to_defaults(&mut self) {
        let access_token = self.access_token.take();
        *self = Self {
            access_token,
            ..Self::default()
        };
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Drop duplicate ids and anything beyond `cap`, keeping first occurrences.
    pub fn normalize_selection(&mut self, cap: usize) -> bool {
        let before = self.selected_friend_ids.len();
        let mut seen = Vec::with_capacity(before.min(cap));
        for id in self.selected_friend_ids.drain(..) {
            if seen.len() < cap && !seen.contains(&id) {
                seen.push(id);
            }
        }
        self.selected_friend_ids = seen;
        self.selected_friend_ids.len() != before
    }

    fn encode_all(&self) -> serde_json::Result<[(&'static str, String); 5]> {
        Ok([
            (
                keys::SELECTED_FRIEND_IDS,
                serde_json::to_string(&self.selected_friend_ids)?,
            ),
            (
                keys::NOTIFICATION_DELAY,
                serde_json::to_string(&self.notification_delay)?,
            ),
            (keys::WEBHOOK_URL, serde_json::to_string(&self.webhook_url)?),
            (
                keys::LAST_NOTIFICATION_TIME,
                serde_json::to_string(&self.last_notification_time)?,
            ),
            (keys::ACCESS_TOKEN, serde_json::to_string(&self.access_token)?),
        ])
    }
}

fn read_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, "Error reading storage key: {e:#}");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, "Corrupt storage record, using default: {e}");
            T::default()
        }
    }
}

fn write_record<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!(key, "Failed to encode storage record: {e}");
            return;
        }
    };
    if let Err(e) = store.set(key, &encoded) {
        warn!(key, "Error setting storage key: {e:#}");
    }
}
