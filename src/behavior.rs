//! Behavioral filter axes: hunt traits, movement speed and visibility.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Selectable behavioral tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TraitKind {
    /// Hunts at a higher average sanity than usual.
    #[serde(rename = "Hunt Early")]
    HuntEarly,
    /// Hunts only at a low average sanity.
    #[serde(rename = "Hunt Late")]
    HuntLate,
    /// Less active while several players are nearby.
    #[serde(rename = "Shy")]
    Shy,
}

impl TraitKind {
    /// All traits in canonical order.
    pub const ALL: [Self; 3] = [Self::HuntEarly, Self::HuntLate, Self::Shy];

    /// Display name, identical to the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HuntEarly => "Hunt Early",
            Self::HuntLate => "Hunt Late",
            Self::Shy => "Shy",
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observed hunting speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedKind {
    #[allow(missing_docs)]
    Slow,
    #[allow(missing_docs)]
    Normal,
    #[allow(missing_docs)]
    Fast,
}

impl SpeedKind {
    /// All speeds in canonical order.
    pub const ALL: [Self; 3] = [Self::Slow, Self::Normal, Self::Fast];
}

/// Observed visibility while hunting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityKind {
    /// Flickers into view more often than usual.
    Visible,
    /// Rarely visible.
    Invisible,
    #[allow(missing_docs)]
    Normal,
}

impl VisibilityKind {
    /// All visibilities in canonical order.
    pub const ALL: [Self; 3] = [Self::Visible, Self::Invisible, Self::Normal];
}
