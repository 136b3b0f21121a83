use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Platform account identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub u32);

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PeerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(PeerId)
            .map_err(|_| format!("Invalid peer id '{}': expected a non-negative integer", s))
    }
}

/// A selectable streaming-platform account.
///
/// Peers come from an external directory and are never mutated here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: PeerId,
    pub display_name: String,
    pub avatar_ref: String,
    /// Channel slug used when asking the platform to host this peer.
    pub slug: String,
}

impl Peer {
    /// Build a peer whose slug is the lowercased display name.
    pub fn new(id: u32, display_name: &str, avatar_ref: &str) -> Self {
        Self {
            id: PeerId(id),
            display_name: display_name.to_string(),
            avatar_ref: avatar_ref.to_string(),
            slug: display_name.to_lowercase(),
        }
    }
}

/// Minimum spacing between desktop notifications.
///
/// Persisted as the integer number of hours (`0`, `1` or `2`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NotificationDelay {
    /// Notifications disabled.
    Off,
    #[default]
    OneHour,
    TwoHours,
}

impl NotificationDelay {
    const MS_PER_HOUR: i64 = 60 * 60 * 1000;

    pub fn hours(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::OneHour => 1,
            Self::TwoHours => 2,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Cooldown window in milliseconds (zero when disabled).
    pub fn cooldown_ms(&self) -> i64 {
        i64::from(self.hours()) * Self::MS_PER_HOUR
    }
}

impl TryFrom<u8> for NotificationDelay {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::OneHour),
            2 => Ok(Self::TwoHours),
            other => Err(AppError::InvalidNotificationDelay(other)),
        }
    }
}

impl From<NotificationDelay> for u8 {
    fn from(delay: NotificationDelay) -> Self {
        delay.hours()
    }
}

impl std::str::FromStr for NotificationDelay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "off" => Ok(Self::Off),
            other => other
                .parse::<u8>()
                .map_err(|_| {
                    format!("Invalid notification delay '{other}': expected off, 0, 1 or 2")
                })
                .and_then(|hours| Self::try_from(hours).map_err(|e| e.to_string())),
        }
    }
}

impl std::fmt::Display for NotificationDelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::OneHour => write!(f, "every 1 hour"),
            Self::TwoHours => write!(f, "every 2 hours"),
        }
    }
}

/// Tri-state permission of a notification capability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Undetermined => "undetermined",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output format for CLI responses
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_peer_id_from_str() {
        assert_eq!(PeerId::from_str("3").unwrap(), PeerId(3));
        assert_eq!(PeerId::from_str(" 12 ").unwrap(), PeerId(12));
        assert!(PeerId::from_str("-1").is_err());
        assert!(PeerId::from_str("abc").is_err());
    }

    #[test]
    fn test_peer_id_serializes_as_plain_integer() {
        let ids = vec![PeerId(1), PeerId(5)];
        assert_eq!(serde_json::to_string(&ids).unwrap(), "[1,5]");
        let parsed: Vec<PeerId> = serde_json::from_str("[2,3]").unwrap();
        assert_eq!(parsed, vec![PeerId(2), PeerId(3)]);
    }

    #[test]
    fn test_peer_new_derives_slug() {
        let peer = Peer::new(1, "StreamerPro", "https://picsum.photos/seed/streamerpro/100");
        assert_eq!(peer.slug, "streamerpro");
        assert_eq!(peer.id, PeerId(1));
    }

    #[test]
    fn test_notification_delay_cooldown() {
        assert_eq!(NotificationDelay::Off.cooldown_ms(), 0);
        assert_eq!(NotificationDelay::OneHour.cooldown_ms(), 3_600_000);
        assert_eq!(NotificationDelay::TwoHours.cooldown_ms(), 7_200_000);
        assert!(!NotificationDelay::Off.is_enabled());
        assert!(NotificationDelay::TwoHours.is_enabled());
    }

    #[test]
    fn test_notification_delay_default_is_one_hour() {
        assert_eq!(NotificationDelay::default(), NotificationDelay::OneHour);
    }

    #[test]
    fn test_notification_delay_json_is_integer() {
        assert_eq!(
            serde_json::to_string(&NotificationDelay::TwoHours).unwrap(),
            "2"
        );
        let parsed: NotificationDelay = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, NotificationDelay::Off);
        assert!(serde_json::from_str::<NotificationDelay>("3").is_err());
    }

    #[test]
    fn test_notification_delay_from_str() {
        assert_eq!(
            NotificationDelay::from_str("off").unwrap(),
            NotificationDelay::Off
        );
        assert_eq!(
            NotificationDelay::from_str("1").unwrap(),
            NotificationDelay::OneHour
        );
        assert!(NotificationDelay::from_str("5").is_err());
        assert!(NotificationDelay::from_str("soon").is_err());
    }

    #[test]
    fn test_permission_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Permission::Granted).unwrap(),
            "\"granted\""
        );
        let parsed: Permission = serde_json::from_str("\"undetermined\"").unwrap();
        assert_eq!(parsed, Permission::Undetermined);
    }
}
