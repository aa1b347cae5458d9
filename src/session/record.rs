//! Session codes, persisted session records and single-field updates.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::behavior::{SpeedKind, TraitKind, VisibilityKind};
use crate::difficulty::DifficultyTier;
use crate::error::ValidationError;
use crate::evidence::EvidenceMap;
use crate::observation::ObservationState;

/// Number of digits in a session code.
pub const CODE_LEN: usize = 6;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// Six ASCII digits identifying a shared session.
///
/// The same code keys the session record and the presence channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionCode(String);

impl SessionCode {
    /// Parse a code typed by a player. Exactly six ASCII digits.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.len() == CODE_LEN && input.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(ValidationError::InvalidSessionCode {
                input: input.to_string(),
            })
        }
    }

    /// Keep the digits of pasted text, truncated to six.
    ///
    /// Returns `None` when fewer than six digits remain.
    #[must_use]
    pub fn from_pasted(text: &str) -> Option<Self> {
        let digits: String = text.chars().filter(char::is_ascii_digit).take(CODE_LEN).collect();
        Self::parse(&digits).ok()
    }

    /// Draw a uniformly random code in `100000..=999999`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(CODE_MIN..=CODE_MAX).to_string())
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the presence channel for this session.
    #[must_use]
    pub fn presence_channel(&self) -> String {
        format!("presence-{}", self.0)
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionCode> for String {
    fn from(code: SessionCode) -> Self {
        code.0
    }
}

/// Persisted shared observation state of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session key.
    pub code: SessionCode,
    /// Tri-state evidence map.
    #[serde(default)]
    pub evidence: EvidenceMap,
    /// Difficulty tier.
    #[serde(default)]
    pub difficulty: DifficultyTier,
    /// Speed filter.
    #[serde(default)]
    pub speed: Option<SpeedKind>,
    /// Visibility filter.
    #[serde(default)]
    pub visibility: Option<VisibilityKind>,
    /// Heartbeat rate.
    #[serde(default)]
    pub bpm: Option<u32>,
    /// Footstep rate.
    #[serde(default)]
    pub spm: Option<u32>,
    /// Ghosts hidden by the players.
    #[serde(default, rename = "excludedGhosts")]
    pub excluded_ghosts: BTreeSet<String>,
    /// Selected behavioral traits.
    #[serde(default, rename = "selectedAbilities")]
    pub selected_abilities: BTreeSet<TraitKind>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Fresh record with blank observations.
    #[must_use]
    pub fn new(code: SessionCode, difficulty: DifficultyTier, now: DateTime<Utc>) -> Self {
        Self {
            code,
            evidence: EvidenceMap::new(),
            difficulty,
            speed: None,
            visibility: None,
            bpm: None,
            spm: None,
            excluded_ghosts: BTreeSet::new(),
            selected_abilities: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Observation state carried by this record.
    #[must_use]
    pub fn observation(&self) -> ObservationState {
        ObservationState {
            evidence: self.evidence,
            selected_traits: self.selected_abilities.clone(),
            selected_speed: self.speed,
            selected_visibility: self.visibility,
            heartbeat_rate: self.bpm,
            step_rate: self.spm,
            difficulty: self.difficulty,
            excluded_entities: self.excluded_ghosts.clone(),
        }
    }

    /// Overwrite one field and stamp `updated_at`.
    pub fn apply(&mut self, update: &FieldUpdate, now: DateTime<Utc>) {
        match update {
            FieldUpdate::Evidence(map) => self.evidence = *map,
            FieldUpdate::Difficulty(tier) => self.difficulty = *tier,
            FieldUpdate::Speed(speed) => self.speed = *speed,
            FieldUpdate::Visibility(visibility) => self.visibility = *visibility,
            FieldUpdate::HeartbeatRate(rate) => self.bpm = *rate,
            FieldUpdate::StepRate(rate) => self.spm = *rate,
            FieldUpdate::SelectedTraits(traits) => self.selected_abilities = traits.clone(),
            FieldUpdate::ExcludedEntities(names) => self.excluded_ghosts = names.clone(),
        }
        self.updated_at = now;
    }
}

/// Replacement value for one logical field of a session record.
///
/// Updates overwrite; nothing is merged. Concurrent writes to the same field
/// race and the last one to reach the store wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    /// Whole evidence map.
    Evidence(EvidenceMap),
    /// Difficulty tier.
    Difficulty(DifficultyTier),
    /// Speed filter.
    Speed(Option<SpeedKind>),
    /// Visibility filter.
    Visibility(Option<VisibilityKind>),
    /// Heartbeat rate.
    HeartbeatRate(Option<u32>),
    /// Footstep rate.
    StepRate(Option<u32>),
    /// Selected traits.
    SelectedTraits(BTreeSet<TraitKind>),
    /// Hidden ghost names.
    ExcludedEntities(BTreeSet<String>),
}

impl FieldUpdate {
    /// Record column this update writes.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Evidence(_) => "evidence",
            Self::Difficulty(_) => "difficulty",
            Self::Speed(_) => "speed",
            Self::Visibility(_) => "visibility",
            Self::HeartbeatRate(_) => "bpm",
            Self::StepRate(_) => "spm",
            Self::SelectedTraits(_) => "selectedAbilities",
            Self::ExcludedEntities(_) => "excludedGhosts",
        }
    }
}
