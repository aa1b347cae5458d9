//! Evidence kinds that may not be marked present.

use std::collections::BTreeSet;

use crate::catalog::{Catalog, Ghost};
use crate::evidence::{EvidenceKind, EvidenceState};
use crate::observation::ObservationState;

use super::budget::evidence_budget;

/// Unknown kinds the player should not be allowed to mark present.
///
/// A kind is disabled when its budget cap is reached (the mimic's kinds get
/// one extra slot while the mimic is possible), or when no candidate has it
/// and the candidate set is non-empty. Marking a disabled kind excluded is
/// always allowed.
#[must_use]
pub fn compute_disabled_evidence(
    catalog: &Catalog,
    observation: &ObservationState,
    candidates: &[&Ghost],
) -> BTreeSet<EvidenceKind> {
    let budget = evidence_budget(catalog, observation);
    let present = observation.present_count();

    observation
        .evidence
        .kinds_in(EvidenceState::Unknown)
        .filter(|kind| {
            if !budget.allows_present(*kind, present) {
                return true;
            }
            !candidates.is_empty() && !candidates.iter().any(|g| g.has_evidence(*kind))
        })
        .collect()
}
