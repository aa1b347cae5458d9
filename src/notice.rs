//! Short-lived user-facing notices.
//!
//! Failures never abort a session; they become an error notice and the user
//! re-issues the action. Broadcast action notices share the same kinds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ExecutionError, GhostError, TransportError};

/// Tone of a notice.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct Notice {
    /// Tone.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    /// Error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// True for error notices.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl From<&GhostError> for Notice {
    fn from(err: &GhostError) -> Self {
        match err {
            GhostError::Execution(ExecutionError::SessionNotFound { code }) => {
                Self::error(format!("Session {code} not found"))
            }
            GhostError::Execution(ExecutionError::WriteFailed { field, .. }) => {
                Self::error(format!("Could not sync {field}, try again"))
            }
            GhostError::Transport(TransportError::PresenceDisconnect { .. }) => {
                Self::error("Lost connection to the session, showing last known players")
            }
            other => Self::error(other.to_string()),
        }
    }
}

impl From<GhostError> for Notice {
    fn from(err: GhostError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_error_notices() {
        let err = GhostError::Execution(ExecutionError::SessionNotFound {
            code: "123456".to_string(),
        });
        let notice = Notice::from(&err);
        assert!(notice.is_error());
        assert_eq!(notice.message, "Session 123456 not found");

        let err = GhostError::Execution(ExecutionError::WriteFailed {
            code: "123456".to_string(),
            field: "evidence",
            message: "boom".to_string(),
        });
        assert_eq!(Notice::from(err).to_string(), "Could not sync evidence, try again");
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_value(Notice::info("hi")).unwrap();
        assert_eq!(json["kind"], "info");
    }
}
