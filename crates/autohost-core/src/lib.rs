//! Shared domain types and errors for Kick AutoHost.

pub mod error;
pub mod types;

pub use error::AppError;
pub use types::{NotificationDelay, OutputFormat, Peer, PeerId, Permission};
