//! Abstract session storage.
//!
//! The session record is the one shared mutable resource. It is owned by a
//! backend behind this trait so the resolution engine and its tests never
//! depend on a realtime service.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::session::{FieldUpdate, SessionCode, SessionRecord};

use super::stream::ChangeStream;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Session not found.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionCode),

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Change feed or connection is gone.
    #[error("Connection error: {0}")]
    Disconnected(String),
}

/// Storage trait for session records.
///
/// # Safety Considerations
/// - `apply` must write all of its updates atomically
/// - Change notifications for one key must be published in write order
pub trait SessionStore: Send + Sync {
    /// Insert a new record. Returns `DuplicateKey` if the code is taken.
    fn insert(&self, record: SessionRecord) -> Result<(), StorageError>;

    /// Get a record by code.
    fn get(&self, code: &SessionCode) -> Result<Option<SessionRecord>, StorageError>;

    /// Overwrite one or more fields, stamp `updated_at` and return the new record.
    ///
    /// # Errors
    /// - `SessionNotFound`: if no record has this code
    fn apply(
        &self,
        code: &SessionCode,
        updates: &[FieldUpdate],
        at: DateTime<Utc>,
    ) -> Result<SessionRecord, StorageError>;

    /// Delete a record. Returns `SessionNotFound` if it does not exist.
    fn delete(&self, code: &SessionCode) -> Result<(), StorageError>;

    /// Open a change stream filtered to one record.
    ///
    /// Only writes published after this returns are guaranteed to be delivered.
    fn subscribe(&self, code: &SessionCode) -> Result<ChangeStream, StorageError>;
}
