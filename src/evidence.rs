//! Evidence vocabulary and the tri-state evidence map.
//!
//! Every session tracks exactly one [`EvidenceState`] per [`EvidenceKind`].
//! The map is total by construction: there is no way to build an
//! [`EvidenceMap`] that is missing a kind.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Observable clue kinds.
///
/// Serialized using the in-game display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvidenceKind {
    /// EMF reader at level 5.
    #[serde(rename = "EMF Level 5")]
    EmfLevel5,
    /// Spirit box responses.
    #[serde(rename = "Spirit Box")]
    SpiritBox,
    /// Ultraviolet fingerprints.
    #[serde(rename = "Fingerprints")]
    Fingerprints,
    /// Ghost orbs on video.
    #[serde(rename = "Ghost Orbs")]
    GhostOrbs,
    /// Writing in the ghost book.
    #[serde(rename = "Ghost Writing")]
    GhostWriting,
    /// Sub-zero room temperature.
    #[serde(rename = "Freezing Temps")]
    FreezingTemps,
    /// D.O.T.S. projector silhouette.
    #[serde(rename = "DOTS Projector")]
    DotsProjector,
}

impl EvidenceKind {
    /// All kinds in canonical order.
    pub const ALL: [Self; 7] = [
        Self::EmfLevel5,
        Self::SpiritBox,
        Self::Fingerprints,
        Self::GhostOrbs,
        Self::GhostWriting,
        Self::FreezingTemps,
        Self::DotsProjector,
    ];

    /// Display name, identical to the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EmfLevel5 => "EMF Level 5",
            Self::SpiritBox => "Spirit Box",
            Self::Fingerprints => "Fingerprints",
            Self::GhostOrbs => "Ghost Orbs",
            Self::GhostWriting => "Ghost Writing",
            Self::FreezingTemps => "Freezing Temps",
            Self::DotsProjector => "DOTS Projector",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EvidenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown evidence kind: {needle}"))
    }
}

/// Tri-state knowledge about one evidence kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceState {
    /// Not yet decided.
    #[default]
    Unknown,
    /// Observed.
    Present,
    /// Ruled out.
    Excluded,
}

impl EvidenceState {
    /// Transition table of the evidence toggle.
    ///
    /// `unknown → present → excluded → unknown`, except that `unknown` goes
    /// straight to `excluded` when the kind may not take a present slot.
    #[must_use]
    pub const fn next(self, may_mark_present: bool) -> Self {
        match self {
            Self::Unknown if may_mark_present => Self::Present,
            Self::Unknown | Self::Present => Self::Excluded,
            Self::Excluded => Self::Unknown,
        }
    }
}

/// Total map from every [`EvidenceKind`] to its [`EvidenceState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<EvidenceKind, EvidenceState>",
    into = "BTreeMap<EvidenceKind, EvidenceState>"
)]
pub struct EvidenceMap {
    states: [EvidenceState; 7],
}

impl EvidenceMap {
    /// A map with every kind `unknown`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of one kind.
    #[must_use]
    pub const fn get(&self, kind: EvidenceKind) -> EvidenceState {
        self.states[kind.index()]
    }

    /// Overwrite the state of one kind.
    pub fn set(&mut self, kind: EvidenceKind, state: EvidenceState) {
        self.states[kind.index()] = state;
    }

    /// Returns a copy with one kind replaced.
    #[must_use]
    pub fn with(mut self, kind: EvidenceKind, state: EvidenceState) -> Self {
        self.set(kind, state);
        self
    }

    /// Iterate `(kind, state)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (EvidenceKind, EvidenceState)> + '_ {
        EvidenceKind::ALL.into_iter().map(|k| (k, self.get(k)))
    }

    /// Kinds currently in the given state.
    pub fn kinds_in(&self, state: EvidenceState) -> impl Iterator<Item = EvidenceKind> + '_ {
        self.iter().filter(move |(_, s)| *s == state).map(|(k, _)| k)
    }

    /// Number of kinds marked present.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.kinds_in(EvidenceState::Present).count()
    }

    /// True when nothing has been decided yet.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.states.iter().all(|s| *s == EvidenceState::Unknown)
    }
}

impl From<BTreeMap<EvidenceKind, EvidenceState>> for EvidenceMap {
    fn from(value: BTreeMap<EvidenceKind, EvidenceState>) -> Self {
        let mut map = Self::new();
        for (kind, state) in value {
            map.set(kind, state);
        }
        map
    }
}

impl From<EvidenceMap> for BTreeMap<EvidenceKind, EvidenceState> {
    fn from(value: EvidenceMap) -> Self {
        value.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_is_three_states_when_present_allowed() {
        let s = EvidenceState::Unknown;
        let s = s.next(true);
        assert_eq!(s, EvidenceState::Present);
        let s = s.next(true);
        assert_eq!(s, EvidenceState::Excluded);
        let s = s.next(true);
        assert_eq!(s, EvidenceState::Unknown);
    }

    #[test]
    fn refused_present_redirects_to_excluded() {
        assert_eq!(EvidenceState::Unknown.next(false), EvidenceState::Excluded);
        // The guard only affects the unknown state.
        assert_eq!(EvidenceState::Present.next(false), EvidenceState::Excluded);
        assert_eq!(EvidenceState::Excluded.next(false), EvidenceState::Unknown);
    }

    #[test]
    fn map_serializes_with_display_names() {
        let map = EvidenceMap::new().with(EvidenceKind::GhostOrbs, EvidenceState::Present);
        let json = serde_json::to_value(map).unwrap();
        assert_eq!(json["Ghost Orbs"], "present");
        assert_eq!(json["EMF Level 5"], "unknown");
        assert_eq!(json.as_object().unwrap().len(), 7);
    }

    #[test]
    fn partial_json_fills_missing_kinds_with_unknown() {
        let map: EvidenceMap =
            serde_json::from_str(r#"{"Spirit Box":"excluded"}"#).unwrap();
        assert_eq!(map.get(EvidenceKind::SpiritBox), EvidenceState::Excluded);
        assert_eq!(map.get(EvidenceKind::DotsProjector), EvidenceState::Unknown);
        assert_eq!(map.present_count(), 0);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("dots projector".parse::<EvidenceKind>().unwrap(), EvidenceKind::DotsProjector);
        assert!("ectoplasm".parse::<EvidenceKind>().is_err());
    }
}
