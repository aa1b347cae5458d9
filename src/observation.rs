//! Mutable observation state: the facts the resolution engine reasons over.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::behavior::{SpeedKind, TraitKind, VisibilityKind};
use crate::catalog::Catalog;
use crate::difficulty::DifficultyTier;
use crate::evidence::{EvidenceKind, EvidenceMap, EvidenceState};
use crate::resolve;
use crate::session::FieldUpdate;

/// Observations gathered in one session.
///
/// `excluded_entities` is a manual blackout list for display; it never
/// affects candidate computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObservationState {
    /// Tri-state evidence for every kind.
    pub evidence: EvidenceMap,
    /// Behavioral traits the ghost must have.
    pub selected_traits: BTreeSet<TraitKind>,
    /// Speed filter.
    pub selected_speed: Option<SpeedKind>,
    /// Visibility filter.
    pub selected_visibility: Option<VisibilityKind>,
    /// Measured heartbeat rate (beats per minute).
    pub heartbeat_rate: Option<u32>,
    /// Measured footstep rate (steps per minute).
    pub step_rate: Option<u32>,
    /// Active difficulty tier.
    pub difficulty: DifficultyTier,
    /// Ghost names hidden by the players.
    pub excluded_entities: BTreeSet<String>,
}

impl ObservationState {
    /// Blank observations at the given difficulty.
    #[must_use]
    pub fn new(difficulty: DifficultyTier) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Number of kinds marked present.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.evidence.present_count()
    }

    /// Advance one kind through the evidence toggle, honoring the budget.
    ///
    /// Returns the kind's new state.
    pub fn cycle_evidence(&mut self, catalog: &Catalog, kind: EvidenceKind) -> EvidenceState {
        let next = resolve::next_evidence_state(catalog, self, kind);
        self.evidence.set(kind, next);
        next
    }

    /// Trait set with `t` flipped.
    #[must_use]
    pub fn traits_toggled(&self, t: TraitKind) -> BTreeSet<TraitKind> {
        let mut traits = self.selected_traits.clone();
        if !traits.remove(&t) {
            traits.insert(t);
        }
        traits
    }

    /// Select or deselect a trait.
    pub fn toggle_trait(&mut self, t: TraitKind) {
        self.selected_traits = self.traits_toggled(t);
    }

    /// Exclusion list with `name` flipped.
    #[must_use]
    pub fn exclusions_toggled(&self, name: &str) -> BTreeSet<String> {
        let mut names = self.excluded_entities.clone();
        if !names.remove(name) {
            names.insert(name.to_string());
        }
        names
    }

    /// Hide or unhide a ghost.
    pub fn toggle_excluded(&mut self, name: &str) {
        self.excluded_entities = self.exclusions_toggled(name);
    }

    /// Clear every observation except the difficulty.
    pub fn reset(&mut self) {
        *self = Self::new(self.difficulty);
    }

    /// True when any filter narrows the catalog.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        !self.evidence.is_blank()
            || !self.selected_traits.is_empty()
            || self.selected_speed.is_some()
            || self.selected_visibility.is_some()
            || self.heartbeat_rate.is_some()
            || self.step_rate.is_some()
    }

    /// Replace one logical field.
    pub fn apply(&mut self, update: &FieldUpdate) {
        match update {
            FieldUpdate::Evidence(map) => self.evidence = *map,
            FieldUpdate::Difficulty(tier) => self.difficulty = *tier,
            FieldUpdate::Speed(speed) => self.selected_speed = *speed,
            FieldUpdate::Visibility(visibility) => self.selected_visibility = *visibility,
            FieldUpdate::HeartbeatRate(rate) => self.heartbeat_rate = *rate,
            FieldUpdate::StepRate(rate) => self.step_rate = *rate,
            FieldUpdate::SelectedTraits(traits) => self.selected_traits = traits.clone(),
            FieldUpdate::ExcludedEntities(names) => self.excluded_entities = names.clone(),
        }
    }

    /// Updates that turn a session into `reset()` of itself.
    #[must_use]
    pub fn reset_updates() -> Vec<FieldUpdate> {
        vec![
            FieldUpdate::Evidence(EvidenceMap::new()),
            FieldUpdate::Speed(None),
            FieldUpdate::Visibility(None),
            FieldUpdate::HeartbeatRate(None),
            FieldUpdate::StepRate(None),
            FieldUpdate::SelectedTraits(BTreeSet::new()),
            FieldUpdate::ExcludedEntities(BTreeSet::new()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_blank() {
        let obs = ObservationState::new(DifficultyTier::Nightmare);
        assert_eq!(obs.difficulty, DifficultyTier::Nightmare);
        assert!(obs.evidence.is_blank());
        assert!(!obs.has_active_filters());
    }

    #[test]
    fn toggle_trait_flips_membership() {
        let mut obs = ObservationState::default();
        obs.toggle_trait(TraitKind::Shy);
        assert!(obs.selected_traits.contains(&TraitKind::Shy));
        assert!(obs.has_active_filters());
        obs.toggle_trait(TraitKind::Shy);
        assert!(obs.selected_traits.is_empty());
    }

    #[test]
    fn exclusions_do_not_count_as_filters() {
        let mut obs = ObservationState::default();
        obs.toggle_excluded("Spirit");
        assert!(obs.excluded_entities.contains("Spirit"));
        assert!(!obs.has_active_filters());
    }

    #[test]
    fn reset_keeps_difficulty() {
        let mut obs = ObservationState::new(DifficultyTier::Professional);
        obs.evidence.set(EvidenceKind::SpiritBox, EvidenceState::Present);
        obs.selected_speed = Some(SpeedKind::Fast);
        obs.heartbeat_rate = Some(70);
        obs.toggle_excluded("Oni");
        obs.reset();
        assert_eq!(obs, ObservationState::new(DifficultyTier::Professional));
    }

    #[test]
    fn reset_updates_match_local_reset() {
        let mut local = ObservationState::new(DifficultyTier::Intermediate);
        local.evidence.set(EvidenceKind::DotsProjector, EvidenceState::Excluded);
        local.toggle_trait(TraitKind::HuntEarly);
        local.step_rate = Some(120);
        let mut via_updates = local.clone();

        local.reset();
        for u in ObservationState::reset_updates() {
            via_updates.apply(&u);
        }
        assert_eq!(local, via_updates);
    }
}
