//! Crate-wide configuration.
//!
//! Every section has a usable default, so an empty JSON object is a valid
//! configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;
use crate::error::{GhostError, GhostResult, TransportError, ValidationError};
use crate::presence::PresenceConfig;
use crate::rhythm::RhythmConfig;
use crate::storage::ChangeFeedConfig;

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostsyncConfig {
    /// Difficulty of newly created sessions.
    pub default_difficulty: DifficultyTier,
    /// Codes tried before `create` gives up on collisions.
    pub create_attempts: u32,
    /// Change feed queue sizes for the in-memory store.
    pub change_feed: ChangeFeedConfig,
    /// Presence stream and broadcast dedupe settings.
    pub presence: PresenceConfig,
    /// Heartbeat and footstep tracker settings.
    pub rhythm: RhythmConfig,
}

impl Default for GhostsyncConfig {
    fn default() -> Self {
        Self {
            default_difficulty: DifficultyTier::Amateur,
            create_attempts: 8,
            change_feed: ChangeFeedConfig::default(),
            presence: PresenceConfig::default(),
            rhythm: RhythmConfig::default(),
        }
    }
}

impl GhostsyncConfig {
    /// Set the default difficulty for new sessions.
    #[must_use]
    pub const fn with_default_difficulty(mut self, tier: DifficultyTier) -> Self {
        self.default_difficulty = tier;
        self
    }

    /// Set the number of create attempts.
    #[must_use]
    pub const fn with_create_attempts(mut self, attempts: u32) -> Self {
        self.create_attempts = attempts;
        self
    }

    /// Reject values that cannot work.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.create_attempts == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "create_attempts must be at least 1".to_string(),
            });
        }
        let feed = &self.change_feed;
        for (name, value) in [
            ("change_feed.notification_queue_capacity", feed.notification_queue_capacity),
            ("change_feed.control_queue_capacity", feed.control_queue_capacity),
            ("change_feed.stream_capacity", feed.stream_capacity),
            ("presence.stream_capacity", self.presence.stream_capacity),
            ("presence.command_queue_capacity", self.presence.command_queue_capacity),
            ("presence.dedupe_window", self.presence.dedupe_window),
        ] {
            if value == 0 {
                return Err(ValidationError::InvalidConfig {
                    reason: format!("{name} must be non-zero"),
                });
            }
        }
        self.rhythm.validate()
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> GhostResult<Self> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| {
            GhostError::Validation(ValidationError::Malformed {
                reason: format!("invalid config JSON: {e}"),
            })
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a JSON file.
    pub fn load(path: &Path) -> GhostResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| TransportError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }
}
