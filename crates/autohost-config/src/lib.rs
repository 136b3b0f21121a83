//! Configuration and persisted state for Kick AutoHost.
//!
//! - `global`: user-level TOML config (`~/.config/kick-autohost/config.toml`)
//! - `store`: opaque key-value storage (in-memory or a locked JSON file)
//! - `settings`: the `PersistedSettings` aggregate read and written through a store

pub mod global;
pub mod paths;
pub mod settings;
pub mod store;
pub mod validate;

pub use global::{GlobalConfig, KickConfig, NotificationConfig, RotationConfig};
pub use settings::{PersistedSettings, keys};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use validate::validate_config;
