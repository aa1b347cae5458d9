//! Error types for ghostsync.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! specific conditions. Nothing here is fatal: every failure is local to one
//! operation and can be retried by re-issuing the action.

use thiserror::Error;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Session code must be exactly 6 digits, got '{input}'")]
    InvalidSessionCode {
        input: String,
    },

    #[error("Ghost name cannot be empty")]
    EmptyGhostName,

    #[error("Duplicate ghost name in catalog: {name}")]
    DuplicateGhostName {
        name: String,
    },

    #[error("Ghost '{name}' has {actual} evidence kinds, expected {expected}")]
    InvalidEvidenceCount {
        name: String,
        actual: usize,
        expected: usize,
    },

    #[error("Ghost '{name}' lists {kind} as bonus or guaranteed evidence but not as evidence")]
    EvidenceNotInSet {
        name: String,
        kind: String,
    },

    #[error("Catalog contains more than one mimic: '{first}' and '{second}'")]
    MultipleMimics {
        first: String,
        second: String,
    },

    #[error("Ghost '{name}' has an inverted {axis} range: {min} > {max}")]
    InvalidRhythmRange {
        name: String,
        axis: &'static str,
        min: u32,
        max: u32,
    },

    #[error("Player name cannot be empty")]
    EmptyPlayerName,

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("Malformed document: {reason}")]
    Malformed {
        reason: String,
    },
}

/// Execution errors that occur while talking to the session store.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Session not found: {code}")]
    SessionNotFound {
        code: String,
    },

    #[error("Failed to sync {field} for session {code}: {message}")]
    WriteFailed {
        code: String,
        field: &'static str,
        message: String,
    },

    #[error("Session code space exhausted after {attempts} attempts")]
    CodeAllocationFailed {
        attempts: u32,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
    },

    #[error("Channel disconnected: {path}")]
    Disconnected {
        path: String,
    },

    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },
}

/// Transport errors for the presence channel and local persistence.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Presence channel '{channel}' disconnected")]
    PresenceDisconnect {
        channel: String,
    },

    #[error("I/O failed for {path}: {message}")]
    Io {
        path: String,
        message: String,
    },

    #[error("Failed to serialize {what}: {message}")]
    Serialization {
        what: &'static str,
        message: String,
    },
}

/// Top-level error type for ghostsync.
#[derive(Debug, Error)]
pub enum GhostError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl GhostError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if the session code has no record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Execution(ExecutionError::SessionNotFound { .. }))
    }

    /// Returns true if a field update did not persist.
    #[must_use]
    pub const fn is_write_failed(&self) -> bool {
        matches!(self, Self::Execution(ExecutionError::WriteFailed { .. }))
    }

    /// Returns true if re-issuing the same action may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::Execution(e) => matches!(
                e,
                ExecutionError::WriteFailed { .. }
                    | ExecutionError::Storage { .. }
                    | ExecutionError::Timeout { .. }
                    | ExecutionError::CodeAllocationFailed { .. }
            ),
            Self::Transport(e) => matches!(
                e,
                TransportError::PresenceDisconnect { .. } | TransportError::Io { .. }
            ),
        }
    }
}

/// Result type alias for ghostsync operations.
pub type GhostResult<T> = Result<T, GhostError>;
