//! Resolution engine.
//!
//! Pure functions from a [`Catalog`] and an [`ObservationState`] to the
//! candidate set, the disabled-evidence set and the evidence budget. The
//! catalog is small, so every call is a linear scan; nothing is cached.
//!
//! The mimic is the only ghost allowed to show one more evidence kind than the
//! difficulty reveals. That exception lives behind a single predicate,
//! [`is_mimic_still_possible`], which both the budget and the toggle consume.

mod budget;
mod candidates;
mod disabled;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::evidence::{EvidenceKind, EvidenceState};
use crate::observation::ObservationState;

pub use budget::{evidence_budget, EvidenceBudget};
pub use candidates::compute_candidates;
pub use disabled::compute_disabled_evidence;

/// Check if the mimic still satisfies the evidence, trait, speed, visibility
/// and rhythm observations.
#[must_use]
pub fn is_mimic_still_possible(catalog: &Catalog, observation: &ObservationState) -> bool {
    catalog
        .mimic()
        .is_some_and(|mimic| candidates::matches_observation(mimic, observation))
}

fn within_budget(catalog: &Catalog, observation: &ObservationState) -> bool {
    observation.present_count() <= evidence_budget(catalog, observation).total()
}

/// Next state of `kind` under the evidence toggle.
///
/// Follows `unknown → present → excluded → unknown`. `unknown → present` is
/// redirected to `excluded` when the kind's budget cap is reached. A
/// transition that would push an in-budget observation over budget (for
/// example excluding the mimic's last kind while its extra slot is in use) is
/// refused and the state stays put.
#[must_use]
pub fn next_evidence_state(
    catalog: &Catalog,
    observation: &ObservationState,
    kind: EvidenceKind,
) -> EvidenceState {
    let current = observation.evidence.get(kind);
    let budget = evidence_budget(catalog, observation);
    let proposed = current.next(budget.allows_present(kind, observation.present_count()));

    if !within_budget(catalog, observation) {
        return proposed;
    }

    let mut after = observation.clone();
    after.evidence.set(kind, proposed);
    if within_budget(catalog, &after) {
        proposed
    } else {
        current
    }
}

/// Everything derived from one observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Candidate ghost names in lexical order.
    pub candidates: Vec<String>,
    /// Unknown kinds that may not be marked present.
    pub disabled: BTreeSet<EvidenceKind>,
    /// Active evidence budget.
    pub budget: EvidenceBudget,
    /// Number of kinds marked present.
    pub present_count: usize,
}

impl Resolution {
    /// Check if `name` is a candidate (case-insensitive).
    #[must_use]
    pub fn is_candidate(&self, name: &str) -> bool {
        self.candidates.iter().any(|c| c.eq_ignore_ascii_case(name))
    }

    /// Candidates the players have not hidden.
    pub fn visible_candidates<'a>(
        &'a self,
        observation: &'a ObservationState,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.candidates
            .iter()
            .filter(|c| !observation.excluded_entities.contains(c.as_str()))
            .map(String::as_str)
    }

    /// True once exactly one ghost remains.
    #[must_use]
    pub fn is_identified(&self) -> bool {
        self.candidates.len() == 1
    }
}

/// Run the full engine on one observation.
#[must_use]
pub fn resolve(catalog: &Catalog, observation: &ObservationState) -> Resolution {
    let candidates = compute_candidates(catalog, observation);
    let disabled = compute_disabled_evidence(catalog, observation, &candidates);

    Resolution {
        candidates: candidates.iter().map(|g| g.name.clone()).collect(),
        disabled,
        budget: evidence_budget(catalog, observation),
        present_count: observation.present_count(),
    }
}
