//! Catalog entry types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::behavior::{SpeedKind, TraitKind, VisibilityKind};
use crate::evidence::EvidenceKind;

const DEFAULT_SMUDGE_SECONDS: u32 = 90;

fn default_smudge_seconds() -> u32 {
    DEFAULT_SMUDGE_SECONDS
}

fn default_speeds() -> BTreeSet<SpeedKind> {
    BTreeSet::from([SpeedKind::Normal])
}

fn default_visibilities() -> BTreeSet<VisibilityKind> {
    BTreeSet::from([VisibilityKind::Normal])
}

/// Inclusive rate range, in beats or steps per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RhythmRange {
    /// Lowest accepted rate.
    pub min: u32,
    /// Highest accepted rate.
    pub max: u32,
}

impl RhythmRange {
    /// Creates a range. Validation happens when the catalog is built.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Check if a measured rate falls within `[min, max]`.
    #[must_use]
    pub const fn contains(&self, rate: u32) -> bool {
        rate >= self.min && rate <= self.max
    }
}

/// Average-sanity threshold at which a ghost may start hunting.
///
/// Descriptive only; never used for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntThreshold {
    /// Sanity percentage.
    pub threshold: u8,
    /// Condition under which the threshold applies.
    pub condition: String,
}

/// One ghost type in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ghost {
    /// Unique display name.
    pub name: String,
    /// Evidence this ghost can exhibit.
    pub evidence: BTreeSet<EvidenceKind>,
    /// Always-present extra kind; set only on the mimic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_evidence: Option<EvidenceKind>,
    /// Kinds this ghost always shows under reduced-evidence difficulties.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub guaranteed_evidence: BTreeSet<EvidenceKind>,
    /// Behavioral tags.
    #[serde(default)]
    pub traits: BTreeSet<TraitKind>,
    /// Hunting speeds this ghost can show.
    #[serde(default = "default_speeds")]
    pub speeds: BTreeSet<SpeedKind>,
    /// Visibility patterns this ghost can show.
    #[serde(default = "default_visibilities")]
    pub visibilities: BTreeSet<VisibilityKind>,
    /// Heartbeat range; `None` means unconstrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat_range: Option<RhythmRange>,
    /// Footstep range; `None` means unconstrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_range: Option<RhythmRange>,
    /// Hunt sanity thresholds.
    #[serde(default)]
    pub hunt_thresholds: Vec<HuntThreshold>,
    /// Seconds a smudge stick keeps this ghost from hunting.
    #[serde(default = "default_smudge_seconds")]
    pub smudge_seconds: u32,
}

impl Ghost {
    /// Creates a ghost with the given evidence and every other axis empty.
    ///
    /// Speeds and visibilities default to `Normal`.
    #[must_use]
    pub fn new(name: impl Into<String>, evidence: &[EvidenceKind]) -> Self {
        Self {
            name: name.into(),
            evidence: evidence.iter().copied().collect(),
            bonus_evidence: None,
            guaranteed_evidence: BTreeSet::new(),
            traits: BTreeSet::new(),
            speeds: default_speeds(),
            visibilities: default_visibilities(),
            heartbeat_range: None,
            step_range: None,
            hunt_thresholds: Vec::new(),
            smudge_seconds: DEFAULT_SMUDGE_SECONDS,
        }
    }

    /// Mark `kind` as the always-present bonus evidence, adding it to the set.
    #[must_use]
    pub fn bonus(mut self, kind: EvidenceKind) -> Self {
        self.evidence.insert(kind);
        self.bonus_evidence = Some(kind);
        self
    }

    /// Set the guaranteed evidence.
    #[must_use]
    pub fn guaranteed(mut self, kinds: &[EvidenceKind]) -> Self {
        self.guaranteed_evidence = kinds.iter().copied().collect();
        self
    }

    /// Set the behavioral traits.
    #[must_use]
    pub fn traits(mut self, traits: &[TraitKind]) -> Self {
        self.traits = traits.iter().copied().collect();
        self
    }

    /// Set the hunting speeds.
    #[must_use]
    pub fn speeds(mut self, speeds: &[SpeedKind]) -> Self {
        self.speeds = speeds.iter().copied().collect();
        self
    }

    /// Set the visibility patterns.
    #[must_use]
    pub fn visibilities(mut self, visibilities: &[VisibilityKind]) -> Self {
        self.visibilities = visibilities.iter().copied().collect();
        self
    }

    /// Set the heartbeat and footstep ranges.
    #[must_use]
    pub fn rhythm(mut self, heartbeat: (u32, u32), steps: (u32, u32)) -> Self {
        self.heartbeat_range = Some(RhythmRange::new(heartbeat.0, heartbeat.1));
        self.step_range = Some(RhythmRange::new(steps.0, steps.1));
        self
    }

    /// Append a hunt threshold.
    #[must_use]
    pub fn hunts_at(mut self, threshold: u8, condition: impl Into<String>) -> Self {
        self.hunt_thresholds.push(HuntThreshold {
            threshold,
            condition: condition.into(),
        });
        self
    }

    /// Set the smudge protection window.
    #[must_use]
    pub fn smudge(mut self, seconds: u32) -> Self {
        self.smudge_seconds = seconds;
        self
    }

    /// True for the single ghost allowed a fourth present evidence.
    #[must_use]
    pub const fn is_mimic(&self) -> bool {
        self.bonus_evidence.is_some()
    }

    /// Check if this ghost can exhibit `kind`.
    #[must_use]
    pub fn has_evidence(&self, kind: EvidenceKind) -> bool {
        self.evidence.contains(&kind)
    }

    /// Evidence excluding the bonus kind.
    pub fn defining_evidence(&self) -> impl Iterator<Item = EvidenceKind> + '_ {
        self.evidence
            .iter()
            .copied()
            .filter(move |k| Some(*k) != self.bonus_evidence)
    }
}
