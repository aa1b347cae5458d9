use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ghostsync::storage::{ChangeFeedConfig, ChangeStream};
use ghostsync::{
    Catalog, DifficultyTier, EvidenceKind, EvidenceMap, EvidenceState, FieldUpdate, GhostsyncConfig, InMemorySessionStore,
    SessionClient, SessionCode, SessionRecord, SessionService, SessionStore, StorageError, SyncEvent, TraitKind,
};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(50);

fn service() -> SessionService {
    SessionService::in_memory(GhostsyncConfig::default())
}

#[test]
fn write_by_one_client_reaches_both() {
    let service = service();
    let code = service.create().unwrap();
    let mut a = SessionClient::join(&service, &code).unwrap();
    let mut b = SessionClient::join(&service, &code).unwrap();

    a.cycle_evidence(EvidenceKind::SpiritBox).unwrap();

    // The writer only sees its change once it echoes back.
    assert_eq!(a.observation().evidence.get(EvidenceKind::SpiritBox), EvidenceState::Unknown);
    assert_eq!(a.wait(WAIT).unwrap(), Some(SyncEvent::Updated));
    assert_eq!(b.wait(WAIT).unwrap(), Some(SyncEvent::Updated));

    for client in [&a, &b] {
        assert_eq!(client.observation().evidence.get(EvidenceKind::SpiritBox), EvidenceState::Present);
    }
    assert_eq!(a.resolution(), b.resolution());
    assert!(a.resolution().candidates.len() < Catalog::builtin().len());
}

#[test]
fn independent_fields_do_not_clobber_each_other() {
    let service = service();
    let code = service.create().unwrap();
    let mut a = SessionClient::join(&service, &code).unwrap();
    let mut b = SessionClient::join(&service, &code).unwrap();

    a.toggle_trait(TraitKind::HuntEarly).unwrap();
    b.set_heartbeat_rate(Some(60)).unwrap();

    for client in [&mut a, &mut b] {
        assert_eq!(client.wait(WAIT).unwrap(), Some(SyncEvent::Updated));
        assert_eq!(client.wait(WAIT).unwrap(), Some(SyncEvent::Updated));
        assert!(client.observation().selected_traits.contains(&TraitKind::HuntEarly));
        assert_eq!(client.observation().heartbeat_rate, Some(60));
    }
}

#[test]
fn applying_a_snapshot_twice_is_a_no_op() {
    let service = service();
    let code = service.create().unwrap();
    let mut client = SessionClient::join(&service, &code).unwrap();

    let record = service
        .update_field(&code, FieldUpdate::Difficulty(DifficultyTier::Nightmare))
        .unwrap();
    client.apply_snapshot(&record);
    let once = (client.observation().clone(), client.resolution().clone());
    client.apply_snapshot(&record);
    assert_eq!(once, (client.observation().clone(), client.resolution().clone()));

    // The echo of the same write changes nothing either.
    assert_eq!(client.wait(WAIT).unwrap(), Some(SyncEvent::Updated));
    assert_eq!(client.observation(), &once.0);
}

#[test]
fn reset_keeps_difficulty_and_clears_the_rest() {
    let service = service();
    let code = service.create().unwrap();
    service
        .update_field(&code, FieldUpdate::Difficulty(DifficultyTier::Professional))
        .unwrap();
    let mut client = SessionClient::join(&service, &code).unwrap();

    client.cycle_evidence(EvidenceKind::GhostOrbs).unwrap();
    client.wait(WAIT).unwrap();
    client.toggle_excluded("Banshee").unwrap();
    client.wait(WAIT).unwrap();
    assert!(client.observation().has_active_filters());

    client.reset().unwrap();
    assert_eq!(client.wait(WAIT).unwrap(), Some(SyncEvent::Updated));
    assert!(client.observation().evidence.is_blank());
    assert!(client.observation().excluded_entities.is_empty());
    assert_eq!(client.observation().difficulty, DifficultyTier::Professional);
    assert_eq!(client.resolution().candidates.len(), Catalog::builtin().len());
}

#[test]
fn deleting_the_record_ends_every_client() {
    let service = service();
    let code = service.create().unwrap();
    let a = SessionClient::join(&service, &code).unwrap();
    let mut b = SessionClient::join(&service, &code).unwrap();

    a.leave(true).unwrap();
    assert_eq!(b.wait(WAIT).unwrap(), Some(SyncEvent::Ended));
    assert!(b.is_ended());
    assert!(!service.exists(&code).unwrap());

    let notice = b.cycle_evidence(EvidenceKind::EmfLevel5).unwrap_err();
    assert!(notice.is_error());

    // A second "last" leaver finds nothing to delete and does not fail.
    let c = SessionClient::join(&service, &SessionCode::parse("111111").unwrap());
    assert!(c.unwrap_err().is_not_found());
    b.leave(true).unwrap();
}

#[test]
fn leaving_while_others_remain_keeps_the_record() {
    let service = service();
    let code = service.create().unwrap();
    let a = SessionClient::join(&service, &code).unwrap();
    let mut b = SessionClient::join(&service, &code).unwrap();

    a.leave(false).unwrap();
    assert!(service.exists(&code).unwrap());
    assert_eq!(b.wait(QUIET).unwrap(), None);
}

#[test]
fn joining_an_unknown_code_is_not_found() {
    let service = service();
    let code = SessionCode::parse("424242").unwrap();
    let err = SessionClient::join(&service, &code).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("424242"));
}

/// Store whose writes can be switched off.
struct FlakyStore {
    inner: InMemorySessionStore,
    failing: AtomicBool,
}

impl SessionStore for FlakyStore {
    fn insert(&self, record: SessionRecord) -> Result<(), StorageError> {
        self.inner.insert(record)
    }
    fn get(&self, code: &SessionCode) -> Result<Option<SessionRecord>, StorageError> {
        self.inner.get(code)
    }
    fn apply(
        &self,
        code: &SessionCode,
        updates: &[FieldUpdate],
        at: DateTime<Utc>,
    ) -> Result<SessionRecord, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Disconnected("network unreachable".to_string()));
        }
        self.inner.apply(code, updates, at)
    }
    fn delete(&self, code: &SessionCode) -> Result<(), StorageError> {
        self.inner.delete(code)
    }
    fn subscribe(&self, code: &SessionCode) -> Result<ChangeStream, StorageError> {
        self.inner.subscribe(code)
    }
}

#[test]
fn failed_write_reports_and_leaves_state_alone() {
    let store = Arc::new(FlakyStore {
        inner: InMemorySessionStore::new(),
        failing: AtomicBool::new(false),
    });
    let service = SessionService::new(
        store.clone(),
        Arc::new(Catalog::builtin().clone()),
        GhostsyncConfig::default(),
    );
    let code = service.create().unwrap();
    let mut client = SessionClient::join(&service, &code).unwrap();
    let before = client.observation().clone();

    store.failing.store(true, Ordering::SeqCst);
    let notice = client.cycle_evidence(EvidenceKind::DotsProjector).unwrap_err();
    assert!(notice.is_error());
    assert!(notice.message.contains("evidence"));
    assert_eq!(client.wait(QUIET).unwrap(), None);
    assert_eq!(client.observation(), &before);

    store.failing.store(false, Ordering::SeqCst);
    client.cycle_evidence(EvidenceKind::DotsProjector).unwrap();
    assert_eq!(client.wait(WAIT).unwrap(), Some(SyncEvent::Updated));
    assert_eq!(
        client.observation().evidence.get(EvidenceKind::DotsProjector),
        EvidenceState::Present
    );
}

#[test]
fn many_clients_converge() {
    let service = service();
    let code = service.create().unwrap();
    let mut clients: Vec<SessionClient> = (0..5)
        .map(|_| SessionClient::join(&service, &code).unwrap())
        .collect();

    let writers: Vec<_> = [
        FieldUpdate::Speed(Some(ghostsync::SpeedKind::Fast)),
        FieldUpdate::StepRate(Some(120)),
        FieldUpdate::Difficulty(DifficultyTier::Intermediate),
    ]
    .into_iter()
    .map(|update| {
        let service = service.clone();
        let code = code.clone();
        std::thread::spawn(move || service.update_field(&code, update).unwrap())
    })
    .collect();
    for w in writers {
        w.join().unwrap();
    }

    let stored = service.fetch(&code).unwrap().observation();
    for client in &mut clients {
        for _ in 0..3 {
            assert_eq!(client.wait(WAIT).unwrap(), Some(SyncEvent::Updated));
        }
        assert_eq!(client.observation(), &stored);
    }
}

#[test]
fn lagging_client_catches_up_with_the_record() {
    let cfg = GhostsyncConfig {
        change_feed: ChangeFeedConfig {
            stream_capacity: 4,
            ..ChangeFeedConfig::default()
        },
        ..GhostsyncConfig::default()
    };
    let service = SessionService::in_memory(cfg);
    let code = service.create().unwrap();
    let mut client = SessionClient::join(&service, &code).unwrap();

    // Nobody drains the client while these land, so its stream overflows.
    for bpm in 60..70 {
        service.update_field(&code, FieldUpdate::HeartbeatRate(Some(bpm))).unwrap();
    }
    let latest = service.fetch(&code).unwrap().observation();
    assert_eq!(latest.heartbeat_rate, Some(69));

    let deadline = Instant::now() + WAIT;
    while client.observation() != &latest && Instant::now() < deadline {
        client.poll().unwrap();
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(client.observation(), &latest);

    // Once the feed has settled, further polls end on the same state.
    std::thread::sleep(Duration::from_millis(100));
    client.poll().unwrap();
    assert_eq!(client.observation(), &latest);
}

#[test]
fn lagging_client_resyncs_on_wait() {
    let cfg = GhostsyncConfig {
        change_feed: ChangeFeedConfig {
            stream_capacity: 1,
            ..ChangeFeedConfig::default()
        },
        ..GhostsyncConfig::default()
    };
    let service = SessionService::in_memory(cfg);
    let code = service.create().unwrap();
    let mut client = SessionClient::join(&service, &code).unwrap();

    for rate in 100..110 {
        service.update_field(&code, FieldUpdate::StepRate(Some(rate))).unwrap();
    }
    let latest = service.fetch(&code).unwrap().observation();

    let deadline = Instant::now() + WAIT;
    while client.observation() != &latest && Instant::now() < deadline {
        client.wait(QUIET).unwrap();
    }
    assert_eq!(client.observation().step_rate, Some(109));
}

#[test]
fn refused_toggle_reports_and_writes_nothing() {
    let service = service();
    let code = service.create().unwrap();
    service
        .update_field(&code, FieldUpdate::Difficulty(DifficultyTier::Nightmare))
        .unwrap();
    // The mimic's extra slot is in use.
    let evidence = EvidenceMap::new()
        .with(EvidenceKind::SpiritBox, EvidenceState::Present)
        .with(EvidenceKind::GhostOrbs, EvidenceState::Present);
    let before = service.update_field(&code, FieldUpdate::Evidence(evidence)).unwrap();
    let client = SessionClient::join(&service, &code).unwrap();

    let notice = client.cycle_evidence(EvidenceKind::Fingerprints).unwrap_err();
    assert!(notice.is_error());
    assert!(notice.message.contains("Fingerprints"));

    let after = service.fetch(&code).unwrap();
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(after.evidence, evidence);
    assert_eq!(client.observation().evidence, evidence);
}
