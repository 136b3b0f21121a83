//! External collaborators of the rotation: login, friend directory and the
//! hosting call.
//!
//! None of these talk to a real Kick endpoint by default. The simulated
//! PKCE login builds a genuine authorize URL but never exchanges the code,
//! the directory serves a fixed friend list, and hosting only logs intent
//! unless `KickApiHostAction` is selected.

pub mod auth;
pub mod directory;
pub mod hosting;
pub mod pkce;

pub use auth::{AuthProvider, LoginStart, MockAuth, SimulatedPkceAuth};
pub use directory::{Directory, MockDirectory};
pub use hosting::{HostAction, KickApiHostAction, StubHostAction};
