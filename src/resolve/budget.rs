//! Present-evidence budget.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::evidence::EvidenceKind;
use crate::observation::ObservationState;

use super::is_mimic_still_possible;

/// How many kinds may be marked present, and which kinds get the mimic's extra slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBudget {
    /// Slots granted by the difficulty tier.
    pub base: usize,
    /// Kinds allowed one slot beyond `base`. Empty unless the mimic is still possible.
    pub mimic_kinds: BTreeSet<EvidenceKind>,
}

impl EvidenceBudget {
    /// True when the mimic's extra slot is available.
    #[must_use]
    pub fn mimic_slot(&self) -> bool {
        !self.mimic_kinds.is_empty()
    }

    /// Largest present count any kind can reach.
    #[must_use]
    pub fn total(&self) -> usize {
        self.base + usize::from(self.mimic_slot())
    }

    /// Check if `kind` is covered by the mimic exception.
    #[must_use]
    pub fn is_protected(&self, kind: EvidenceKind) -> bool {
        self.mimic_kinds.contains(&kind)
    }

    /// Present-count cap that applies to `kind`.
    #[must_use]
    pub fn cap_for(&self, kind: EvidenceKind) -> usize {
        if self.is_protected(kind) {
            self.base + 1
        } else {
            self.base
        }
    }

    /// Whether `kind` may go from unknown to present given the current count.
    #[must_use]
    pub fn allows_present(&self, kind: EvidenceKind, present_count: usize) -> bool {
        present_count < self.cap_for(kind)
    }
}

/// Compute the active budget for an observation.
#[must_use]
pub fn evidence_budget(catalog: &Catalog, observation: &ObservationState) -> EvidenceBudget {
    let mimic_kinds = match catalog.mimic() {
        Some(mimic) if is_mimic_still_possible(catalog, observation) => mimic.evidence.clone(),
        _ => BTreeSet::new(),
    };

    EvidenceBudget {
        base: observation.difficulty.base_budget(),
        mimic_kinds,
    }
}
