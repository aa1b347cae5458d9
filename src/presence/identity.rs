//! Per-device player identity persisted as a small JSON file.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{GhostResult, TransportError, ValidationError};

/// Stable presence key and display name for this device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// Presence key. Never changes once created.
    pub id: String,
    /// Display name.
    pub name: String,
}

fn io_err(path: &Path, e: &std::io::Error) -> TransportError {
    TransportError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

impl PlayerIdentity {
    /// Fresh identity with a random id and a `Player N` name.
    #[must_use]
    pub fn generate() -> Self {
        let n: u16 = rand::thread_rng().gen_range(0..1000);
        Self {
            id: Uuid::new_v4().to_string(),
            name: format!("Player {n}"),
        }
    }

    /// Read the identity at `path`, creating and saving one if absent.
    pub fn load_or_create(path: &Path) -> GhostResult<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => {
                let identity: Self = serde_json::from_str(&raw).map_err(|e| TransportError::Serialization {
                    what: "player identity",
                    message: e.to_string(),
                })?;
                if identity.id.trim().is_empty() {
                    return Err(ValidationError::Malformed {
                        reason: format!("player identity at {} has an empty id", path.display()),
                    }
                    .into());
                }
                Ok(identity)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let identity = Self::generate();
                identity.save(path)?;
                debug!(player = %identity.id, "created player identity");
                Ok(identity)
            }
            Err(e) => Err(io_err(path, &e).into()),
        }
    }

    /// Write the identity to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> GhostResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, &e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| TransportError::Serialization {
            what: "player identity",
            message: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| io_err(path, &e))?;
        Ok(())
    }

    /// Change the display name. Surrounding whitespace is trimmed.
    pub fn rename(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPlayerName);
        }
        self.name = name.to_string();
        Ok(())
    }
}
