//! Presence and broadcast payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notice::{Notice, NoticeKind};

/// What a participant tracks on the presence channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// When the participant entered the session.
    pub joined_at: DateTime<Utc>,
}

/// Aggregate channel state: every tracked payload, by presence key.
pub type PresenceState = BTreeMap<String, Vec<PresencePayload>>;

/// A connected participant as shown in the member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Presence key (per-device id).
    pub id: String,
    /// Display name.
    pub name: String,
    /// When the participant entered the session.
    pub joined_at: DateTime<Utc>,
}

/// Name shown for a presence with no usable name.
#[must_use]
pub fn fallback_name(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("Player {prefix}")
}

/// Display name for the first payload under `key`.
#[must_use]
pub fn display_name(key: &str, presences: &[PresencePayload]) -> String {
    presences
        .first()
        .map(|p| p.name.trim())
        .filter(|n| !n.is_empty())
        .map_or_else(|| fallback_name(key), str::to_string)
}

/// Ephemeral action notice sent to everyone on the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastNotice {
    /// Tone.
    #[serde(rename = "type")]
    pub kind: NoticeKind,
    /// Text shown to other participants.
    pub message: String,
    /// Presence key of the sender.
    pub sender_id: String,
    /// Display name of the sender.
    pub sender_name: String,
    /// Unique id used to drop redelivered copies.
    pub dedupe_id: String,
}

impl BroadcastNotice {
    /// New notice with a fresh dedupe id.
    pub fn new(
        kind: NoticeKind,
        message: impl Into<String>,
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            dedupe_id: Uuid::new_v4().to_string(),
        }
    }

    /// The notice to show locally.
    #[must_use]
    pub fn to_notice(&self) -> Notice {
        Notice {
            kind: self.kind,
            message: self.message.clone(),
        }
    }
}

/// Inbound presence channel event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresenceEvent {
    /// Full aggregate state. The only event that changes the member list.
    Sync {
        /// Every tracked payload by key.
        state: PresenceState,
    },
    /// A key started tracking.
    Join {
        /// Presence key.
        key: String,
        /// Payloads that joined.
        presences: Vec<PresencePayload>,
    },
    /// A key stopped tracking.
    Leave {
        /// Presence key.
        key: String,
        /// Payloads that left.
        presences: Vec<PresencePayload>,
    },
    /// Ephemeral broadcast.
    Broadcast(BroadcastNotice),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_wire_shape() {
        let payload = PresencePayload {
            name: "Ray".to_string(),
            joined_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["name"], "Ray");
        assert_eq!(json["joinedAt"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn broadcast_wire_shape() {
        let notice = BroadcastNotice::new(NoticeKind::Info, "Evidence reset by Ray", "abcd-1234", "Ray");
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["type"], "info");
        assert_eq!(json["senderId"], "abcd-1234");
        assert_eq!(json["senderName"], "Ray");
        assert!(json["dedupeId"].as_str().is_some_and(|s| !s.is_empty()));
    }

    #[test]
    fn names_fall_back_to_key_prefix() {
        let blank = PresencePayload {
            name: "  ".to_string(),
            joined_at: Utc::now(),
        };
        assert_eq!(display_name("9f3c77aa", &[blank]), "Player 9f3c");
        assert_eq!(display_name("ab", &[]), "Player ab");
    }
}
