//! Candidate filtering.

use crate::catalog::{Catalog, Ghost, RhythmRange};
use crate::evidence::EvidenceState;
use crate::observation::ObservationState;

fn within(range: Option<RhythmRange>, rate: Option<u32>) -> bool {
    match (range, rate) {
        (Some(range), Some(rate)) => range.contains(rate),
        _ => true,
    }
}

/// Evidence, trait, speed, visibility and rhythm rules.
///
/// These are the rules every ghost including the mimic must pass; the budget
/// rules are layered on top in [`compute_candidates`].
pub(crate) fn matches_observation(ghost: &Ghost, observation: &ObservationState) -> bool {
    let evidence_ok = observation.evidence.iter().all(|(kind, state)| match state {
        EvidenceState::Present => ghost.has_evidence(kind),
        EvidenceState::Excluded => !ghost.has_evidence(kind),
        EvidenceState::Unknown => true,
    });
    if !evidence_ok {
        return false;
    }

    if !observation.selected_traits.is_subset(&ghost.traits) {
        return false;
    }

    if let Some(speed) = observation.selected_speed {
        if !ghost.speeds.contains(&speed) {
            return false;
        }
    }
    if let Some(visibility) = observation.selected_visibility {
        if !ghost.visibilities.contains(&visibility) {
            return false;
        }
    }

    within(ghost.heartbeat_range, observation.heartbeat_rate)
        && within(ghost.step_range, observation.step_rate)
}

/// Ghosts consistent with every observation, in lexical name order.
///
/// Beyond [`matches_observation`]:
/// - once more kinds are present than the tier allows, only the mimic remains;
/// - on reduced-evidence tiers with every slot used, a non-mimic ghost must
///   already show all of its guaranteed evidence.
#[must_use]
pub fn compute_candidates<'c>(catalog: &'c Catalog, observation: &ObservationState) -> Vec<&'c Ghost> {
    let base = observation.difficulty.base_budget();
    let present = observation.present_count();
    let over_budget = present > base;
    let guaranteed_enforced = observation.difficulty.is_reduced_evidence() && present >= base;

    catalog
        .iter()
        .filter(|ghost| {
            if over_budget && !ghost.is_mimic() {
                return false;
            }
            if !matches_observation(ghost, observation) {
                return false;
            }
            if guaranteed_enforced && !ghost.is_mimic() {
                return ghost
                    .guaranteed_evidence
                    .iter()
                    .all(|k| observation.evidence.get(*k) == EvidenceState::Present);
            }
            true
        })
        .collect()
}
