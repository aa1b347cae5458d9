//! Difficulty tiers and their present-evidence slot counts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named difficulty configuration.
///
/// Each tier fixes how many evidence kinds the game reveals, which caps how
/// many kinds a session may mark present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    /// Four present slots.
    #[default]
    Amateur,
    /// Three present slots.
    Intermediate,
    /// Two present slots.
    Professional,
    /// One present slot.
    Nightmare,
}

impl DifficultyTier {
    /// All tiers from easiest to hardest.
    pub const ALL: [Self; 4] = [
        Self::Amateur,
        Self::Intermediate,
        Self::Professional,
        Self::Nightmare,
    ];

    /// Present-evidence slots granted by this tier, before the mimic exception.
    #[must_use]
    pub const fn base_budget(self) -> usize {
        match self {
            Self::Amateur => 4,
            Self::Intermediate => 3,
            Self::Professional => 2,
            Self::Nightmare => 1,
        }
    }

    /// True when the tier hides at least one of an ordinary ghost's three kinds.
    #[must_use]
    pub const fn is_reduced_evidence(self) -> bool {
        self.base_budget() < 3
    }

    /// Serialized tier name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Amateur => "amateur",
            Self::Intermediate => "intermediate",
            Self::Professional => "professional",
            Self::Nightmare => "nightmare",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DifficultyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown difficulty tier: {needle}"))
    }
}
