//! Change notification types for the session change feed.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{SessionCode, SessionRecord};

/// Unique identifier for a change-feed subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new random subscription id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What happened to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "record", rename_all = "snake_case")]
pub enum ChangeKind {
    /// Full record after a write.
    Updated(SessionRecord),
    /// Record removed.
    Deleted,
}

/// One change to one session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    /// Key of the changed record.
    pub code: SessionCode,
    /// The change.
    pub kind: ChangeKind,
}

impl ChangeNotification {
    /// Notification carrying the record after a write.
    #[must_use]
    pub fn updated(record: SessionRecord) -> Self {
        Self {
            code: record.code.clone(),
            kind: ChangeKind::Updated(record),
        }
    }

    /// Notification for a removed record.
    #[must_use]
    pub const fn deleted(code: SessionCode) -> Self {
        Self {
            code,
            kind: ChangeKind::Deleted,
        }
    }
}
