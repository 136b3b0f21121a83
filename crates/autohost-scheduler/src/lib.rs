//! Scheduler: bounded peer selection, timer-driven round-robin rotation, and
//! cooldown-gated notifications.

pub mod notify;
pub mod rotation;
pub mod selection;
pub mod session;

pub use notify::{NotificationGate, NotificationMessage, Notifier, NotifyOutcome};
pub use rotation::{ChangeCause, HostingChange, RotationScheduler, RotationState, RotationTiming};
pub use selection::{SelectionStore, ToggleOutcome};
pub use session::{AutoHostSession, SessionOptions, StepReport};
