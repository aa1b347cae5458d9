//! Read-only ghost catalog.
//!
//! The catalog is loaded once and never mutated. Entries are kept in lexical
//! name order, which is also the order candidates are reported in.

mod builtin;
mod ghost;

use std::path::Path;
use std::sync::OnceLock;

use crate::error::{GhostError, GhostResult, TransportError, ValidationError};

pub use ghost::{Ghost, HuntThreshold, RhythmRange};

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

/// Validated, immutable ghost catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    ghosts: Vec<Ghost>,
    mimic: Option<usize>,
}

impl Catalog {
    /// The catalog shipped with the crate.
    ///
    /// # Panics
    ///
    /// Panics if the built-in data fails validation.
    pub fn builtin() -> &'static Self {
        BUILTIN.get_or_init(|| {
            Self::from_ghosts(builtin::ghosts()).expect("built-in ghost catalog is invalid")
        })
    }

    /// Build a catalog from entries, validating every entry.
    pub fn from_ghosts(mut ghosts: Vec<Ghost>) -> Result<Self, ValidationError> {
        for ghost in &ghosts {
            validate_ghost(ghost)?;
        }

        ghosts.sort_by(|a, b| a.name.cmp(&b.name));

        // Sorting is case-sensitive, so case-only duplicates need a full scan.
        for (i, a) in ghosts.iter().enumerate() {
            if ghosts[i + 1..].iter().any(|b| a.name.eq_ignore_ascii_case(&b.name)) {
                return Err(ValidationError::DuplicateGhostName {
                    name: a.name.clone(),
                });
            }
        }

        let mut mimic: Option<usize> = None;
        for (idx, ghost) in ghosts.iter().enumerate() {
            if !ghost.is_mimic() {
                continue;
            }
            if let Some(prev) = mimic {
                return Err(ValidationError::MultipleMimics {
                    first: ghosts[prev].name.clone(),
                    second: ghost.name.clone(),
                });
            }
            mimic = Some(idx);
        }

        Ok(Self { ghosts, mimic })
    }

    /// Parse a JSON array of ghosts.
    pub fn from_json_str(json: &str) -> GhostResult<Self> {
        let ghosts: Vec<Ghost> = serde_json::from_str(json).map_err(|e| {
            GhostError::Validation(ValidationError::Malformed {
                reason: format!("invalid catalog JSON: {e}"),
            })
        })?;
        Ok(Self::from_ghosts(ghosts)?)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> GhostResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| TransportError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Ghost> {
        let needle = name.trim();
        self.ghosts.iter().find(|g| g.name.eq_ignore_ascii_case(needle))
    }

    /// All ghosts in lexical name order.
    pub fn iter(&self) -> std::slice::Iter<'_, Ghost> {
        self.ghosts.iter()
    }

    /// All names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ghosts.iter().map(|g| g.name.as_str())
    }

    /// The ghost allowed a fourth present evidence, if the catalog has one.
    #[must_use]
    pub fn mimic(&self) -> Option<&Ghost> {
        self.mimic.map(|idx| &self.ghosts[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Ghost;
    type IntoIter = std::slice::Iter<'a, Ghost>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn validate_ghost(ghost: &Ghost) -> Result<(), ValidationError> {
    if ghost.name.trim().is_empty() {
        return Err(ValidationError::EmptyGhostName);
    }

    let expected = if ghost.is_mimic() { 4 } else { 3 };
    if ghost.evidence.len() != expected {
        return Err(ValidationError::InvalidEvidenceCount {
            name: ghost.name.clone(),
            actual: ghost.evidence.len(),
            expected,
        });
    }

    let listed = ghost.bonus_evidence.iter().chain(ghost.guaranteed_evidence.iter());
    for kind in listed {
        if !ghost.has_evidence(*kind) {
            return Err(ValidationError::EvidenceNotInSet {
                name: ghost.name.clone(),
                kind: kind.to_string(),
            });
        }
    }

    let ranges = [("heartbeat", ghost.heartbeat_range), ("step", ghost.step_range)];
    for (axis, range) in ranges {
        if let Some(r) = range {
            if r.min > r.max {
                return Err(ValidationError::InvalidRhythmRange {
                    name: ghost.name.clone(),
                    axis,
                    min: r.min,
                    max: r.max,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceKind;

    fn three(name: &str) -> Ghost {
        Ghost::new(
            name,
            &[EvidenceKind::EmfLevel5, EvidenceKind::SpiritBox, EvidenceKind::GhostWriting],
        )
    }

    #[test]
    fn builtin_catalog_is_valid_and_sorted() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 24);
        let names: Vec<&str> = catalog.names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn builtin_has_a_single_mimic_with_orbs_bonus() {
        let mimic = Catalog::builtin().mimic().unwrap();
        assert_eq!(mimic.name, "The Mimic");
        assert_eq!(mimic.bonus_evidence, Some(EvidenceKind::GhostOrbs));
        assert_eq!(mimic.evidence.len(), 4);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.get("the twins").unwrap().name, "The Twins");
        assert_eq!(catalog.get("  GORYO ").unwrap().name, "Goryo");
        assert!(catalog.get("Casper").is_none());
    }

    #[test]
    fn rejects_wrong_evidence_count() {
        let bad = Ghost::new("Short", &[EvidenceKind::EmfLevel5]);
        let err = Catalog::from_ghosts(vec![bad]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEvidenceCount { actual: 1, .. }));
    }

    #[test]
    fn rejects_guaranteed_outside_evidence() {
        let bad = three("Odd").guaranteed(&[EvidenceKind::DotsProjector]);
        let err = Catalog::from_ghosts(vec![bad]).unwrap_err();
        assert!(matches!(err, ValidationError::EvidenceNotInSet { .. }));
    }

    #[test]
    fn rejects_case_only_duplicates() {
        let err = Catalog::from_ghosts(vec![three("Spirit"), three("spirit")]).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateGhostName { .. }));
    }

    #[test]
    fn rejects_two_mimics() {
        let a = three("A").bonus(EvidenceKind::GhostOrbs);
        let b = three("B").bonus(EvidenceKind::DotsProjector);
        let err = Catalog::from_ghosts(vec![a, b]).unwrap_err();
        assert!(matches!(err, ValidationError::MultipleMimics { .. }));
    }

    #[test]
    fn rejects_inverted_rhythm_range() {
        let bad = three("Backwards").rhythm((90, 60), (100, 170));
        let err = Catalog::from_ghosts(vec![bad]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRhythmRange { axis: "heartbeat", .. }));
    }

    #[test]
    fn json_catalog_round_trip() {
        let json = serde_json::to_string(&Catalog::builtin().iter().collect::<Vec<_>>()).unwrap();
        let parsed = Catalog::from_json_str(&json).unwrap();
        assert_eq!(&parsed, Catalog::builtin());
    }

    #[test]
    fn sparse_json_ghost_passes_normal_speed_and_visibility() {
        use crate::behavior::{SpeedKind, VisibilityKind};
        use crate::difficulty::DifficultyTier;
        use crate::observation::ObservationState;
        use crate::resolve::compute_candidates;

        let catalog = Catalog::from_json_str(
            r#"[{"name":"Plain","evidence":["EMF Level 5","Spirit Box","Ghost Orbs"]}]"#,
        )
        .unwrap();
        let mut obs = ObservationState::new(DifficultyTier::Amateur);
        obs.selected_speed = Some(SpeedKind::Normal);
        obs.selected_visibility = Some(VisibilityKind::Normal);
        assert_eq!(compute_candidates(&catalog, &obs).len(), 1);

        obs.selected_speed = Some(SpeedKind::Fast);
        assert!(compute_candidates(&catalog, &obs).is_empty());
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        let err = Catalog::from_json_str("{not json").unwrap_err();
        assert!(err.is_validation());
    }
}
