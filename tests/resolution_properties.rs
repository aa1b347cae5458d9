use std::collections::{HashSet, VecDeque};

use ghostsync::{
    compute_candidates, compute_disabled_evidence, evidence_budget, is_mimic_still_possible, resolve, Catalog,
    DifficultyTier, EvidenceKind, EvidenceMap, EvidenceState, ObservationState, TraitKind,
};

const TIERS: [DifficultyTier; 4] = [
    DifficultyTier::Amateur,
    DifficultyTier::Intermediate,
    DifficultyTier::Professional,
    DifficultyTier::Nightmare,
];

/// Every evidence map reachable from `start` by repeated toggles.
fn reachable(catalog: &Catalog, start: &ObservationState) -> Vec<ObservationState> {
    let mut seen: HashSet<EvidenceMap> = HashSet::new();
    let mut out = Vec::new();
    let mut queue = VecDeque::from([start.clone()]);
    seen.insert(start.evidence);

    while let Some(obs) = queue.pop_front() {
        for kind in EvidenceKind::ALL {
            let mut next = obs.clone();
            next.cycle_evidence(catalog, kind);
            if seen.insert(next.evidence) {
                queue.push_back(next);
            }
        }
        out.push(obs);
    }
    out
}

fn starts(tier: DifficultyTier) -> Vec<ObservationState> {
    let blank = ObservationState::new(tier);
    let mut no_mimic = blank.clone();
    no_mimic.toggle_trait(TraitKind::HuntEarly);
    vec![blank, no_mimic]
}

fn candidate_names(catalog: &Catalog, obs: &ObservationState) -> Vec<String> {
    compute_candidates(catalog, obs).iter().map(|g| g.name.clone()).collect()
}

#[test]
fn candidates_are_deterministic() {
    let catalog = Catalog::builtin();
    for tier in TIERS {
        for obs in reachable(catalog, &ObservationState::new(tier)).iter().step_by(7) {
            let first = resolve(catalog, obs);
            let second = resolve(catalog, obs);
            assert_eq!(first, second);
        }
    }
}

#[test]
fn marking_more_evidence_never_widens_candidates() {
    let catalog = Catalog::builtin();
    for tier in TIERS {
        for obs in reachable(catalog, &ObservationState::new(tier)) {
            let before = compute_candidates(catalog, &obs).len();
            for kind in obs.evidence.kinds_in(EvidenceState::Unknown) {
                for state in [EvidenceState::Present, EvidenceState::Excluded] {
                    let mut narrowed = obs.clone();
                    narrowed.evidence.set(kind, state);
                    let after = compute_candidates(catalog, &narrowed).len();
                    assert!(
                        after <= before,
                        "{tier}: marking {kind} {state:?} grew candidates {before} -> {after}"
                    );
                }
            }
        }
    }
}

#[test]
fn reset_restores_full_catalog() {
    let catalog = Catalog::builtin();
    for tier in TIERS {
        for mut obs in reachable(catalog, &ObservationState::new(tier)).into_iter().step_by(11) {
            obs.toggle_trait(TraitKind::Shy);
            obs.heartbeat_rate = Some(200);
            obs.toggle_excluded("Oni");
            obs.reset();

            let res = resolve(catalog, &obs);
            assert_eq!(res.candidates.len(), catalog.len());
            assert!(res.disabled.is_empty());
            assert_eq!(obs.difficulty, tier);
        }
    }
}

#[test]
fn present_count_stays_within_budget() {
    let catalog = Catalog::builtin();
    for tier in TIERS {
        for start in starts(tier) {
            let states = reachable(catalog, &start);
            assert!(states.len() > 1);
            for obs in states {
                let budget = evidence_budget(catalog, &obs);
                assert!(
                    obs.present_count() <= budget.total(),
                    "{tier}: {} present with budget {}",
                    obs.present_count(),
                    budget.total()
                );
                if !is_mimic_still_possible(catalog, &obs) {
                    assert!(obs.present_count() <= tier.base_budget());
                }
            }
        }
    }
}

#[test]
fn professional_mimic_takes_a_third_kind() {
    let catalog = Catalog::builtin();
    for third in [EvidenceKind::FreezingTemps, EvidenceKind::GhostOrbs] {
        let mut obs = ObservationState::new(DifficultyTier::Professional);
        assert_eq!(obs.cycle_evidence(catalog, EvidenceKind::SpiritBox), EvidenceState::Present);
        assert_eq!(obs.cycle_evidence(catalog, EvidenceKind::Fingerprints), EvidenceState::Present);
        assert!(candidate_names(catalog, &obs).contains(&"The Mimic".to_string()));
        assert!(candidate_names(catalog, &obs).len() > 1);

        assert_eq!(obs.cycle_evidence(catalog, third), EvidenceState::Present);
        assert_eq!(obs.present_count(), 3);
        assert_eq!(candidate_names(catalog, &obs), vec!["The Mimic".to_string()]);
    }
}

#[test]
fn professional_non_mimic_kind_cannot_take_third_slot() {
    let catalog = Catalog::builtin();
    let mut obs = ObservationState::new(DifficultyTier::Professional);
    obs.cycle_evidence(catalog, EvidenceKind::SpiritBox);
    obs.cycle_evidence(catalog, EvidenceKind::Fingerprints);
    assert_eq!(obs.cycle_evidence(catalog, EvidenceKind::EmfLevel5), EvidenceState::Excluded);
    assert_eq!(obs.present_count(), 2);
}

#[test]
fn nightmare_requires_guaranteed_evidence() {
    let catalog = Catalog::builtin();
    let mut checked = 0;
    for ghost in catalog.iter().filter(|g| !g.guaranteed_evidence.is_empty() && !g.is_mimic()) {
        for kind in ghost.evidence.iter().filter(|k| !ghost.guaranteed_evidence.contains(k)) {
            let mut obs = ObservationState::new(DifficultyTier::Nightmare);
            obs.evidence.set(*kind, EvidenceState::Present);
            assert!(
                !candidate_names(catalog, &obs).contains(&ghost.name),
                "{} should need its guaranteed evidence once {kind} is the only slot",
                ghost.name
            );
            checked += 1;
        }
        for kind in &ghost.guaranteed_evidence {
            let mut obs = ObservationState::new(DifficultyTier::Nightmare);
            obs.evidence.set(*kind, EvidenceState::Present);
            assert!(candidate_names(catalog, &obs).contains(&ghost.name));
        }
    }
    assert!(checked >= 10);
}

#[test]
fn disabled_evidence_is_sound() {
    let catalog = Catalog::builtin();
    for tier in TIERS {
        for start in starts(tier) {
            for obs in reachable(catalog, &start) {
                let candidates = compute_candidates(catalog, &obs);
                let disabled = compute_disabled_evidence(catalog, &obs, &candidates);

                for kind in obs.evidence.kinds_in(EvidenceState::Unknown) {
                    let mut forced = obs.clone();
                    forced.evidence.set(kind, EvidenceState::Present);
                    let empty = compute_candidates(catalog, &forced).is_empty();
                    let over = forced.present_count() > evidence_budget(catalog, &forced).total();

                    if disabled.contains(&kind) {
                        assert!(empty || over, "{tier}: disabled {kind} would have been fine");
                    } else {
                        assert!(!over, "{tier}: enabled {kind} breaks the budget");
                    }
                }
            }
        }
    }
}

#[test]
fn excluded_entities_only_hide() {
    let catalog = Catalog::builtin();
    let mut obs = ObservationState::new(DifficultyTier::Amateur);
    obs.evidence.set(EvidenceKind::EmfLevel5, EvidenceState::Present);
    let before = resolve(catalog, &obs);

    obs.toggle_excluded("Spirit");
    let after = resolve(catalog, &obs);
    assert_eq!(before.candidates, after.candidates);
    assert_eq!(before.disabled, after.disabled);
    assert!(!after.visible_candidates(&obs).any(|n| n == "Spirit"));
}

#[test]
fn trait_filter_that_rules_out_the_mimic_leaves_nothing_over_budget() {
    let catalog = Catalog::builtin();
    let mut obs = ObservationState::new(DifficultyTier::Professional);
    for kind in [EvidenceKind::SpiritBox, EvidenceKind::Fingerprints, EvidenceKind::FreezingTemps] {
        assert_eq!(obs.cycle_evidence(catalog, kind), EvidenceState::Present);
    }
    assert_eq!(candidate_names(catalog, &obs), vec!["The Mimic".to_string()]);

    // Filters never rewrite evidence, so the state is now over budget.
    obs.toggle_trait(TraitKind::HuntEarly);
    assert!(!is_mimic_still_possible(catalog, &obs));
    let res = resolve(catalog, &obs);
    assert!(res.candidates.is_empty());
    assert_eq!(res.present_count, 3);
    assert!(res.present_count > res.budget.total());

    // Players can still walk the extra mark back.
    assert_eq!(obs.cycle_evidence(catalog, EvidenceKind::FreezingTemps), EvidenceState::Excluded);
    assert_eq!(obs.present_count(), 2);
    assert!(obs.present_count() <= evidence_budget(catalog, &obs).total());
}
