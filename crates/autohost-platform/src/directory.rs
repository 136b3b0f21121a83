//! Friend directory: the signed-in user and the peers they can host.

use anyhow::Result;
use async_trait::async_trait;
use autohost_core::{AppError, Peer};

#[async_trait]
pub trait Directory: Send + Sync {
    /// The account that owns the hosting channel.
    async fn fetch_user(&self, token: &str) -> Result<Peer>;

    async fn fetch_friends(&self, token: &str) -> Result<Vec<Peer>>;
}

/// Fixed friend list used in place of a real platform lookup.
#[derive(Debug, Clone)]
pub struct MockDirectory {
    user: Peer,
    friends: Vec<Peer>,
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new(
            Peer::new(100, "AutoHostUser", "https://picsum.photos/seed/autohostuser/100"),
            builtin_friends(),
        )
    }
}

impl MockDirectory {
    pub fn new(user: Peer, friends: Vec<Peer>) -> Self {
        Self { user, friends }
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn fetch_user(&self, token: &str) -> Result<Peer> {
        require_token(token)?;
        Ok(self.user.clone())
    }

    async fn fetch_friends(&self, token: &str) -> Result<Vec<Peer>> {
        require_token(token)?;
        Ok(self.friends.clone())
    }
}

fn require_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(AppError::NotLoggedIn.into());
    }
    Ok(())
}

fn builtin_friends() -> Vec<Peer> {
    vec![
        Peer::new(1, "StreamerPro", "https://picsum.photos/seed/streamerpro/100"),
        Peer::new(2, "GamerGoddess", "https://picsum.photos/seed/gamergoddess/100"),
        Peer::new(3, "CodeNinja", "https://picsum.photos/seed/codeninja/100"),
        Peer::new(4, "VarietyVixen", "https://picsum.photos/seed/varietyvixen/100"),
        Peer::new(5, "JustChattingJed", "https://picsum.photos/seed/jed/100"),
        Peer::new(6, "SpeedrunSam", "https://picsum.photos/seed/sam/100"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use autohost_core::PeerId;

    #[tokio::test]
    async fn test_mock_directory_serves_builtin_friends() {
        let directory = MockDirectory::default();
        let friends = directory.fetch_friends("token").await.unwrap();
        assert_eq!(friends.len(), 6);
        assert_eq!(friends[2].display_name, "CodeNinja");
        assert_eq!(friends[2].slug, "codeninja");

        let mut ids: Vec<PeerId> = friends.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[tokio::test]
    async fn test_mock_directory_requires_token() {
        let directory = MockDirectory::default();
        let err = directory.fetch_friends("").await.unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
        assert!(directory.fetch_user("").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_directory_user() {
        let user = MockDirectory::default().fetch_user("t").await.unwrap();
        assert_eq!(user.slug, "autohostuser");
    }
}
