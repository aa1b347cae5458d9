//! # ghostsync - shared ghost identification
//!
//! ghostsync narrows a fixed catalog of ghosts down to the ones consistent
//! with what a group of players has observed, and keeps those observations in
//! sync between every participant of a session.
//!
//! ## Core Concepts
//!
//! - **Catalog**: immutable ghost entries with evidence, traits, speeds and rhythms
//! - **Observation**: tri-state evidence plus behavioral filters and a difficulty tier
//! - **Resolution**: candidates, disabled evidence and the evidence budget, recomputed on every change
//! - **Session**: a persisted, 6-digit-keyed observation shared by every participant
//! - **Presence**: who is connected, plus ephemeral action notices
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ghostsync::{Catalog, DifficultyTier, EvidenceKind, ObservationState, resolve};
//!
//! let catalog = Catalog::builtin();
//! let mut obs = ObservationState::new(DifficultyTier::Professional);
//! obs.cycle_evidence(catalog, EvidenceKind::SpiritBox);
//! obs.cycle_evidence(catalog, EvidenceKind::Fingerprints);
//!
//! let resolution = resolve(catalog, &obs);
//! for name in resolution.visible_candidates(&obs) {
//!     println!("{name}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Vocabulary and catalog
pub mod behavior;
pub mod catalog;
pub mod difficulty;
pub mod error;
pub mod evidence;

// Deduction
pub mod observation;
pub mod resolve;

// Shared sessions
pub mod config;
pub mod notice;
pub mod presence;
pub mod session;
pub mod storage;
pub mod sync;

// Tools
pub mod rhythm;
pub mod smudge;

pub use behavior::{SpeedKind, TraitKind, VisibilityKind};
pub use catalog::{Catalog, Ghost, HuntThreshold, RhythmRange};
pub use config::GhostsyncConfig;
pub use difficulty::DifficultyTier;
pub use error::{ExecutionError, GhostError, GhostResult, TransportError, ValidationError};
pub use evidence::{EvidenceKind, EvidenceMap, EvidenceState};
pub use notice::{Notice, NoticeKind};
pub use observation::ObservationState;
pub use resolve::{
    compute_candidates, compute_disabled_evidence, evidence_budget, is_mimic_still_possible,
    next_evidence_state, resolve, EvidenceBudget, Resolution,
};

pub use presence::{
    BroadcastNotice, InMemoryPresenceHub, PlayerIdentity, PresenceEvent, PresenceHub, PresenceRoster,
    PresenceSession,
};
pub use rhythm::RhythmTracker;
pub use session::{FieldUpdate, SessionCode, SessionRecord, SessionService};
pub use smudge::SmudgeTimer;
pub use storage::{InMemorySessionStore, SessionStore, StorageError};
pub use sync::{SessionClient, SyncEvent};
