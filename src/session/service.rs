//! Session record access over an injected store.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::GhostsyncConfig;
use crate::error::{ExecutionError, GhostError, GhostResult};
use crate::observation::ObservationState;
use crate::storage::{ChangeStream, InMemorySessionStore, SessionStore, StorageError};

use super::record::{FieldUpdate, SessionCode, SessionRecord};

fn storage_err(code: &SessionCode, err: StorageError) -> GhostError {
    match err {
        StorageError::SessionNotFound(_) => GhostError::Execution(ExecutionError::SessionNotFound {
            code: code.to_string(),
        }),
        StorageError::Disconnected(path) => GhostError::Execution(ExecutionError::Disconnected { path }),
        other => GhostError::Execution(ExecutionError::Storage {
            message: other.to_string(),
        }),
    }
}

fn write_err(code: &SessionCode, field: &'static str, err: StorageError) -> GhostError {
    match err {
        StorageError::SessionNotFound(_) => storage_err(code, err),
        other => GhostError::Execution(ExecutionError::WriteFailed {
            code: code.to_string(),
            field,
            message: other.to_string(),
        }),
    }
}

/// Create, read, update and delete shared session records.
///
/// Cheap to clone; clones share the store and catalog.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    catalog: Arc<Catalog>,
    config: GhostsyncConfig,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("catalog_len", &self.catalog.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionService {
    /// Service over `store` resolving against `catalog`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, catalog: Arc<Catalog>, config: GhostsyncConfig) -> Self {
        Self { store, catalog, config }
    }

    /// Service over a fresh in-memory store and the built-in catalog.
    #[must_use]
    pub fn in_memory(config: GhostsyncConfig) -> Self {
        let store = InMemorySessionStore::with_feed_config(config.change_feed.clone());
        Self::new(Arc::new(store), Arc::new(Catalog::builtin().clone()), config)
    }

    /// Catalog used by clients of this service.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GhostsyncConfig {
        &self.config
    }

    /// Create a session with blank observations at the default difficulty.
    ///
    /// Codes are random; a collision with an existing record is retried up to
    /// `create_attempts` times.
    pub fn create(&self) -> GhostResult<SessionCode> {
        let mut rng = rand::thread_rng();
        let attempts = self.config.create_attempts.max(1);

        for attempt in 1..=attempts {
            let code = SessionCode::generate(&mut rng);
            let record = SessionRecord::new(code.clone(), self.config.default_difficulty, Utc::now());
            match self.store.insert(record) {
                Ok(()) => {
                    info!(code = %code, difficulty = %self.config.default_difficulty, "session created");
                    return Ok(code);
                }
                Err(StorageError::DuplicateKey(_)) => {
                    debug!(code = %code, attempt, "session code collision, retrying");
                }
                Err(e) => return Err(storage_err(&code, e)),
            }
        }

        warn!(attempts, "no free session code found");
        Err(GhostError::Execution(ExecutionError::CodeAllocationFailed { attempts }))
    }

    /// Fetch a record.
    pub fn fetch(&self, code: &SessionCode) -> GhostResult<SessionRecord> {
        self.store
            .get(code)
            .map_err(|e| storage_err(code, e))?
            .ok_or_else(|| {
                GhostError::Execution(ExecutionError::SessionNotFound {
                    code: code.to_string(),
                })
            })
    }

    /// Check whether a record exists.
    pub fn exists(&self, code: &SessionCode) -> GhostResult<bool> {
        Ok(self.store.get(code).map_err(|e| storage_err(code, e))?.is_some())
    }

    /// Overwrite one field. Last writer wins.
    pub fn update_field(&self, code: &SessionCode, update: FieldUpdate) -> GhostResult<SessionRecord> {
        let field = update.field_name();
        self.store
            .apply(code, std::slice::from_ref(&update), Utc::now())
            .map(|record| {
                debug!(code = %code, field, "field updated");
                record
            })
            .map_err(|e| {
                warn!(code = %code, field, error = %e, "field update failed");
                write_err(code, field, e)
            })
    }

    /// Clear every observation except the difficulty in one write.
    pub fn reset(&self, code: &SessionCode) -> GhostResult<SessionRecord> {
        self.store
            .apply(code, &ObservationState::reset_updates(), Utc::now())
            .map(|record| {
                info!(code = %code, "session reset");
                record
            })
            .map_err(|e| {
                warn!(code = %code, error = %e, "session reset failed");
                write_err(code, "evidence", e)
            })
    }

    /// Remove a record.
    pub fn delete(&self, code: &SessionCode) -> GhostResult<()> {
        self.store.delete(code).map_err(|e| storage_err(code, e))?;
        info!(code = %code, "session deleted");
        Ok(())
    }

    /// Open a change stream for one record.
    pub fn subscribe(&self, code: &SessionCode) -> GhostResult<ChangeStream> {
        self.store.subscribe(code).map_err(|e| storage_err(code, e))
    }
}
