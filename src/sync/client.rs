use std::time::Duration;

use tracing::{debug, info, warn};

use crate::behavior::{SpeedKind, TraitKind, VisibilityKind};
use crate::difficulty::DifficultyTier;
use crate::error::{ExecutionError, GhostError, GhostResult};
use crate::evidence::EvidenceKind;
use crate::notice::Notice;
use crate::observation::ObservationState;
use crate::resolve::{resolve, Resolution};
use crate::session::{FieldUpdate, SessionCode, SessionRecord, SessionService};
use crate::storage::{ChangeKind, ChangeNotification, ChangeStream};

/// Something the client folded in from the change stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The record changed and the local state was replaced.
    Updated,
    /// The record was deleted; the session is over.
    Ended,
}

/// One participant's view of a shared session.
///
/// The local observation only ever changes by folding in a record snapshot:
/// actions write to the store and take effect when the change echoes back.
#[derive(Debug)]
pub struct SessionClient {
    service: SessionService,
    code: SessionCode,
    stream: ChangeStream,
    observation: ObservationState,
    resolution: Resolution,
    ended: bool,
}

impl SessionClient {
    /// Enter a session: subscribe, then seed from one fetch.
    ///
    /// Subscribing first means a write racing the fetch is either in the
    /// snapshot or delivered afterwards; replays are harmless.
    pub fn join(service: &SessionService, code: &SessionCode) -> GhostResult<Self> {
        let stream = service.subscribe(code)?;
        let record = service.fetch(code)?;
        let observation = record.observation();
        let resolution = resolve(service.catalog(), &observation);

        debug!(code = %code, candidates = resolution.candidates.len(), "joined session");
        Ok(Self {
            service: service.clone(),
            code: code.clone(),
            stream,
            observation,
            resolution,
            ended: false,
        })
    }

    /// Session key.
    #[must_use]
    pub const fn code(&self) -> &SessionCode {
        &self.code
    }

    /// Authoritative observation as of the last folded snapshot.
    #[must_use]
    pub const fn observation(&self) -> &ObservationState {
        &self.observation
    }

    /// Engine output for the current observation.
    #[must_use]
    pub const fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// True once the record has been deleted.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Replace the local observation with a record snapshot and re-resolve.
    ///
    /// Applying the same snapshot twice leaves the state unchanged.
    pub fn apply_snapshot(&mut self, record: &SessionRecord) {
        self.observation = record.observation();
        self.resolution = resolve(self.service.catalog(), &self.observation);
    }

    fn fold(&mut self, notification: ChangeNotification) -> SyncEvent {
        match notification.kind {
            ChangeKind::Updated(record) => {
                self.apply_snapshot(&record);
                SyncEvent::Updated
            }
            ChangeKind::Deleted => {
                info!(code = %self.code, "session ended remotely");
                self.ended = true;
                SyncEvent::Ended
            }
        }
    }

    /// Catch up after lost notifications: discard what is queued and
    /// re-read the record.
    fn resync(&mut self) -> GhostResult<SyncEvent> {
        while self.stream.try_recv()?.is_some() {}
        match self.service.fetch(&self.code) {
            Ok(record) => {
                warn!(code = %self.code, "change stream lagged, resynced from record");
                self.apply_snapshot(&record);
                Ok(SyncEvent::Updated)
            }
            Err(e) if e.is_not_found() => {
                info!(code = %self.code, "session ended remotely");
                self.ended = true;
                Ok(SyncEvent::Ended)
            }
            Err(e) => Err(e),
        }
    }

    fn lagged(&self) -> bool {
        !self.ended && self.stream.take_lagged()
    }

    /// Fold every queued notification without blocking.
    ///
    /// If notifications were lost, finishes with a re-read of the record.
    pub fn poll(&mut self) -> GhostResult<Vec<SyncEvent>> {
        let mut events = Vec::new();
        while let Some(n) = self.stream.try_recv()? {
            events.push(self.fold(n));
        }
        if self.lagged() {
            events.push(self.resync()?);
        }
        Ok(events)
    }

    /// Block up to `timeout` for the next notification.
    ///
    /// A lagged stream is resynced from the record first. Returns `Ok(None)`
    /// on timeout.
    pub fn wait(&mut self, timeout: Duration) -> GhostResult<Option<SyncEvent>> {
        if self.lagged() {
            return self.resync().map(Some);
        }
        match self.stream.recv_timeout(timeout) {
            Ok(n) => Ok(Some(self.fold(n))),
            Err(GhostError::Execution(ExecutionError::Timeout { .. })) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, update: FieldUpdate) -> Result<(), Notice> {
        if self.ended {
            return Err(Notice::error(format!("Session {} has ended", self.code)));
        }
        self.service.update_field(&self.code, update).map(|_| ()).map_err(|e| {
            warn!(code = %self.code, error = %e, "local action not synced");
            Notice::from(&e)
        })
    }

    /// Advance one evidence kind through the toggle.
    ///
    /// A toggle the evidence budget does not allow is refused with an error
    /// notice and nothing is written.
    pub fn cycle_evidence(&self, kind: EvidenceKind) -> Result<(), Notice> {
        let mut next = self.observation.clone();
        next.cycle_evidence(self.service.catalog(), kind);
        if next.evidence == self.observation.evidence {
            debug!(code = %self.code, %kind, "evidence toggle refused by budget");
            return Err(Notice::error(format!(
                "Can't change {kind}: the evidence budget for {} is full",
                self.observation.difficulty
            )));
        }
        self.write(FieldUpdate::Evidence(next.evidence))
    }

    /// Select or deselect a trait.
    pub fn toggle_trait(&self, t: TraitKind) -> Result<(), Notice> {
        self.write(FieldUpdate::SelectedTraits(self.observation.traits_toggled(t)))
    }

    /// Set or clear the speed filter.
    pub fn set_speed(&self, speed: Option<SpeedKind>) -> Result<(), Notice> {
        self.write(FieldUpdate::Speed(speed))
    }

    /// Set or clear the visibility filter.
    pub fn set_visibility(&self, visibility: Option<VisibilityKind>) -> Result<(), Notice> {
        self.write(FieldUpdate::Visibility(visibility))
    }

    /// Set or clear the measured heartbeat rate.
    pub fn set_heartbeat_rate(&self, rate: Option<u32>) -> Result<(), Notice> {
        self.write(FieldUpdate::HeartbeatRate(rate))
    }

    /// Set or clear the measured footstep rate.
    pub fn set_step_rate(&self, rate: Option<u32>) -> Result<(), Notice> {
        self.write(FieldUpdate::StepRate(rate))
    }

    /// Change the difficulty tier. Evidence marks are kept as they are.
    pub fn set_difficulty(&self, tier: DifficultyTier) -> Result<(), Notice> {
        self.write(FieldUpdate::Difficulty(tier))
    }

    /// Hide or unhide a ghost.
    pub fn toggle_excluded(&self, name: &str) -> Result<(), Notice> {
        self.write(FieldUpdate::ExcludedEntities(self.observation.exclusions_toggled(name)))
    }

    /// Clear every observation except the difficulty.
    pub fn reset(&self) -> Result<(), Notice> {
        if self.ended {
            return Err(Notice::error(format!("Session {} has ended", self.code)));
        }
        self.service.reset(&self.code).map(|_| ()).map_err(|e| Notice::from(&e))
    }

    /// Leave the session, deleting the record if nobody else is in it.
    pub fn leave(self, is_last: bool) -> GhostResult<()> {
        self.stream.unsubscribe();
        if is_last && !self.ended {
            match self.service.delete(&self.code) {
                Ok(()) => {}
                // Someone else already cleaned up.
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        debug!(code = %self.code, is_last, "left session");
        Ok(())
    }
}
