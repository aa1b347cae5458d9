//! Change feed worker.
//!
//! Owns key-filtered subscriptions and fans `ChangeNotification`s out to
//! per-subscription streams. Writers publish through a bounded channel and
//! never block.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::session::SessionCode;

use super::change::{ChangeNotification, SubscriptionId};
use super::stream::ChangeStream;
use super::traits::StorageError;

/// Queue sizes for the change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeFeedConfig {
    /// Max queued notifications before publishes are dropped.
    pub notification_queue_capacity: usize,
    /// Max queued control messages (register/unregister).
    pub control_queue_capacity: usize,
    /// Per-subscription stream buffer capacity.
    pub stream_capacity: usize,
}

impl Default for ChangeFeedConfig {
    fn default() -> Self {
        Self {
            notification_queue_capacity: 4096,
            control_queue_capacity: 1024,
            stream_capacity: 256,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ControlMsg {
    Register {
        subscription_id: SubscriptionId,
        code: SessionCode,
        stream_tx: Sender<ChangeNotification>,
        lagged: Arc<AtomicBool>,
        reply: Sender<()>,
    },
    Unregister {
        subscription_id: SubscriptionId,
    },
}

#[derive(Debug)]
struct SubscriptionEntry {
    code: SessionCode,
    tx: Sender<ChangeNotification>,
    lagged: Arc<AtomicBool>,
}

/// Change feed: owns subscriptions and dispatches notifications.
///
/// Runs a dedicated worker thread. A registration is acknowledged only after
/// the worker has recorded it, so every notification published after
/// `subscribe` returns reaches the new stream or marks it lagged.
#[derive(Debug)]
pub struct ChangeFeed {
    cfg: ChangeFeedConfig,
    control_tx: Sender<ControlMsg>,
    notify_tx: Sender<ChangeNotification>,
    dropped_notifications: Arc<AtomicU64>,
    dropped_deliveries: Arc<AtomicU64>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl ChangeFeed {
    /// Start the feed worker.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread cannot be spawned.
    #[must_use]
    pub fn new(cfg: ChangeFeedConfig) -> Self {
        let (control_tx, control_rx) = bounded::<ControlMsg>(cfg.control_queue_capacity.max(1));
        let (notify_tx, notify_rx) = bounded::<ChangeNotification>(cfg.notification_queue_capacity.max(1));

        let dropped_deliveries = Arc::new(AtomicU64::new(0));
        let thread_dropped = Arc::clone(&dropped_deliveries);
        let join = thread::Builder::new()
            .name("ghostsync-change-feed".to_string())
            .spawn(move || worker_loop(thread_dropped, control_rx, notify_rx))
            .expect("failed to spawn ghostsync change feed worker");

        Self {
            cfg,
            control_tx,
            notify_tx,
            dropped_notifications: Arc::new(AtomicU64::new(0)),
            dropped_deliveries,
            join: Mutex::new(Some(join)),
        }
    }

    /// Register a stream for one record key.
    pub fn subscribe(&self, code: &SessionCode) -> Result<ChangeStream, StorageError> {
        let subscription_id = SubscriptionId::new();
        let (stream_tx, stream_rx) = bounded::<ChangeNotification>(self.cfg.stream_capacity.max(1));
        let lagged = Arc::new(AtomicBool::new(false));
        let stream = ChangeStream::new(
            subscription_id,
            code.clone(),
            stream_rx,
            self.control_tx.clone(),
            Arc::clone(&lagged),
            Arc::clone(&self.dropped_notifications),
        );

        let (reply_tx, reply_rx) = bounded::<()>(1);
        self.control_tx
            .send(ControlMsg::Register {
                subscription_id,
                code: code.clone(),
                stream_tx,
                lagged,
                reply: reply_tx,
            })
            .map_err(|_| StorageError::Disconnected("change_feed_control".to_string()))?;

        reply_rx
            .recv()
            .map_err(|_| StorageError::Disconnected("change_feed_control".to_string()))?;

        debug!(code = %code, subscription = %subscription_id, "change stream registered");
        Ok(stream)
    }

    /// Non-blocking publish.
    pub fn publish(&self, notification: ChangeNotification) {
        match self.notify_tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(n) | TrySendError::Disconnected(n)) => {
                self.dropped_notifications.fetch_add(1, Ordering::Relaxed);
                warn!(code = %n.code, "change notification dropped before dispatch");
            }
        }
    }

    /// Notifications that never reached the worker.
    ///
    /// Every stream treats a rise in this count as a lag.
    #[must_use]
    pub fn dropped_notifications(&self) -> u64 {
        self.dropped_notifications.load(Ordering::Relaxed)
    }

    /// Deliveries skipped because a subscriber was slow or gone.
    #[must_use]
    pub fn dropped_deliveries(&self) -> u64 {
        self.dropped_deliveries.load(Ordering::Relaxed)
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        // Closing the notify channel stops the worker.
        let (dummy_control_tx, _) = bounded::<ControlMsg>(1);
        drop(std::mem::replace(&mut self.control_tx, dummy_control_tx));

        let (dummy_notify_tx, _) = bounded::<ChangeNotification>(1);
        drop(std::mem::replace(&mut self.notify_tx, dummy_notify_tx));

        // Streams may outlive the feed and keep the control channel open, so
        // the worker is detached rather than joined.
        if let Ok(mut guard) = self.join.lock() {
            drop(guard.take());
        }
    }
}

fn worker_loop(
    dropped_deliveries: Arc<AtomicU64>,
    control_rx: Receiver<ControlMsg>,
    notify_rx: Receiver<ChangeNotification>,
) {
    let mut subs: HashMap<SubscriptionId, SubscriptionEntry> = HashMap::new();

    // Either side closing means no further deliveries are possible: the feed
    // is gone, or every stream and the feed are gone.
    loop {
        select! {
            recv(control_rx) -> msg => match msg {
                Ok(ControlMsg::Register { subscription_id, code, stream_tx, lagged, reply }) => {
                    subs.insert(subscription_id, SubscriptionEntry { code, tx: stream_tx, lagged });
                    let _ = reply.send(());
                }
                Ok(ControlMsg::Unregister { subscription_id }) => {
                    subs.remove(&subscription_id);
                }
                Err(_) => break,
            },
            recv(notify_rx) -> msg => match msg {
                Ok(notification) => dispatch(&mut subs, &notification, &dropped_deliveries),
                Err(_) => break,
            },
        }
    }

    debug!("change feed worker stopped");
}

fn dispatch(
    subs: &mut HashMap<SubscriptionId, SubscriptionEntry>,
    notification: &ChangeNotification,
    dropped_deliveries: &AtomicU64,
) {
    subs.retain(|id, sub| {
        if sub.code != notification.code {
            return true;
        }
        // Never block the worker: drop if the subscriber is slow and flag the
        // stream so its reader re-reads the record.
        match sub.tx.try_send(notification.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                sub.lagged.store(true, Ordering::Release);
                dropped_deliveries.fetch_add(1, Ordering::Relaxed);
                warn!(code = %sub.code, subscription = %id, "slow subscriber, change dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyTier;
    use crate::session::SessionRecord;
    use chrono::Utc;
    use std::time::Duration;

    fn code(s: &str) -> SessionCode {
        SessionCode::parse(s).unwrap()
    }

    #[test]
    fn delivers_only_to_matching_key() {
        let feed = ChangeFeed::new(ChangeFeedConfig::default());
        let a = feed.subscribe(&code("111111")).unwrap();
        let b = feed.subscribe(&code("222222")).unwrap();

        feed.publish(ChangeNotification::deleted(code("111111")));

        let got = a.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(got.code, code("111111"));
        assert!(b.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn slow_subscriber_drops_instead_of_blocking() {
        let cfg = ChangeFeedConfig {
            stream_capacity: 1,
            ..ChangeFeedConfig::default()
        };
        let feed = ChangeFeed::new(cfg);
        let stream = feed.subscribe(&code("333333")).unwrap();
        let record = SessionRecord::new(code("333333"), DifficultyTier::Amateur, Utc::now());

        for _ in 0..5 {
            feed.publish(ChangeNotification::updated(record.clone()));
        }
        // A late subscriber on another key still gets served.
        let other = feed.subscribe(&code("444444")).unwrap();
        feed.publish(ChangeNotification::deleted(code("444444")));
        assert!(other.recv_timeout(Duration::from_secs(2)).is_ok());

        assert!(stream.recv_timeout(Duration::from_secs(2)).is_ok());
        assert_eq!(feed.dropped_deliveries(), 4);
        assert!(stream.take_lagged());
        assert!(!stream.take_lagged());
        assert!(!other.take_lagged());
    }

    #[test]
    fn dropped_publish_lags_every_stream() {
        let feed = ChangeFeed::new(ChangeFeedConfig::default());
        let a = feed.subscribe(&code("777777")).unwrap();
        let b = feed.subscribe(&code("888888")).unwrap();
        assert!(!a.take_lagged());

        feed.dropped_notifications.fetch_add(1, Ordering::Relaxed);
        assert!(a.take_lagged());
        assert!(b.take_lagged());
        assert!(!a.take_lagged());

        // Streams opened later start from the current count.
        let c = feed.subscribe(&code("999999")).unwrap();
        assert!(!c.take_lagged());
    }

    #[test]
    fn unsubscribed_stream_receives_nothing() {
        let feed = ChangeFeed::new(ChangeFeedConfig::default());
        let stream = feed.subscribe(&code("555555")).unwrap();
        stream.unsubscribe();
        // Registration round-trip orders the unregister before the publish.
        let _barrier = feed.subscribe(&code("666666")).unwrap();

        feed.publish(ChangeNotification::deleted(code("555555")));
        assert!(stream.recv_timeout(Duration::from_millis(100)).is_err());
    }
}
