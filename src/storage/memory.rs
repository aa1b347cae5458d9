//! In-memory storage backend.
//!
//! Thread-safe implementation of [`SessionStore`] with its own change feed.
//! It is intended for embedded usage, tests, and as a reference implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::session::{FieldUpdate, SessionCode, SessionRecord};

use super::change::ChangeNotification;
use super::feed::{ChangeFeed, ChangeFeedConfig};
use super::stream::ChangeStream;
use super::traits::{SessionStore, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// Thread-safe in-memory session store.
///
/// Notifications are published while the write lock is held, so subscribers
/// see changes to one record in write order.
#[derive(Debug)]
pub struct InMemorySessionStore {
    records: RwLock<HashMap<SessionCode, SessionRecord>>,
    feed: ChangeFeed,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_feed_config(ChangeFeedConfig::default())
    }

    /// Create a new empty store with custom feed queue sizes.
    #[must_use]
    pub fn with_feed_config(cfg: ChangeFeedConfig) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            feed: ChangeFeed::new(cfg),
        }
    }

    /// Number of stored sessions.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.records.read().map_err(|_| lock_err("session.len"))?.len())
    }

    /// True when no session is stored.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// The change feed backing `subscribe`.
    #[must_use]
    pub const fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, record: SessionRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("session.insert"))?;
        if records.contains_key(&record.code) {
            return Err(StorageError::DuplicateKey(record.code.to_string()));
        }
        records.insert(record.code.clone(), record);
        Ok(())
    }

    fn get(&self, code: &SessionCode) -> Result<Option<SessionRecord>, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("session.get"))?;
        Ok(records.get(code).cloned())
    }

    fn apply(
        &self,
        code: &SessionCode,
        updates: &[FieldUpdate],
        at: DateTime<Utc>,
    ) -> Result<SessionRecord, StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("session.apply"))?;
        let record = records
            .get_mut(code)
            .ok_or_else(|| StorageError::SessionNotFound(code.clone()))?;

        for update in updates {
            record.apply(update, at);
        }
        let snapshot = record.clone();
        self.feed.publish(ChangeNotification::updated(snapshot.clone()));
        Ok(snapshot)
    }

    fn delete(&self, code: &SessionCode) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("session.delete"))?;
        records
            .remove(code)
            .ok_or_else(|| StorageError::SessionNotFound(code.clone()))?;
        self.feed.publish(ChangeNotification::deleted(code.clone()));
        Ok(())
    }

    fn subscribe(&self, code: &SessionCode) -> Result<ChangeStream, StorageError> {
        self.feed.subscribe(code)
    }
}
