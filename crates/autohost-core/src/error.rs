//! Domain errors shared by every crate.

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Peer {0} is not in the friend directory")]
    UnknownPeer(u32),

    #[error("Invalid notification delay {0}: expected 0 (off), 1 or 2 hours")]
    InvalidNotificationDelay(u8),

    #[error("Not logged in. Run 'autohost login' first.")]
    NotLoggedIn,

    #[error("Could not find PKCE verifier. Please try logging in again.")]
    MissingPkceVerifier,

    #[error("Authorization code must not be empty")]
    EmptyAuthorizationCode,

    #[error("Failed to host '{peer}': {message}")]
    HostingFailed { peer: String, message: String },
}
