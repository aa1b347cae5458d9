//! Presence and notification layer.
//!
//! Membership is materialized only from the channel's aggregate state;
//! join/leave deltas are for notices. Broadcasts are ephemeral, at-most-once
//! and never persisted.

mod hub;
mod identity;
mod payload;
mod roster;
mod session;

use serde::{Deserialize, Serialize};

pub use hub::{InMemoryPresenceHub, PresenceCommand, PresenceHub, PresenceLink};
pub use identity::PlayerIdentity;
pub use payload::{
    display_name, fallback_name, BroadcastNotice, Player, PresenceEvent, PresencePayload, PresenceState,
};
pub use roster::PresenceRoster;
pub use session::PresenceSession;

/// Presence stream sizes and broadcast dedupe window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Per-link inbound event buffer.
    pub stream_capacity: usize,
    /// Max queued outbound commands at the hub.
    pub command_queue_capacity: usize,
    /// Broadcast dedupe ids remembered per participant.
    pub dedupe_window: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            stream_capacity: 256,
            command_queue_capacity: 1024,
            dedupe_window: 64,
        }
    }
}
