use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::error::{ExecutionError, GhostError, GhostResult};
use crate::session::SessionCode;

use super::change::{ChangeNotification, SubscriptionId};
use super::feed::ControlMsg;

/// Change notifications for one session record.
///
/// The stream is bounded. When the feed cannot deliver a notification the
/// stream is marked lagged (see [`ChangeStream::take_lagged`]) and the reader
/// must re-read the record to catch up.
///
/// Dropping this stream attempts best-effort unregistration.
#[derive(Debug)]
pub struct ChangeStream {
    subscription_id: SubscriptionId,
    code: SessionCode,
    rx: Receiver<ChangeNotification>,
    control_tx: Sender<ControlMsg>,
    unregistered: AtomicBool,
    lagged: Arc<AtomicBool>,
    feed_drops: Arc<AtomicU64>,
    seen_feed_drops: AtomicU64,
}

fn disconnected() -> GhostError {
    GhostError::Execution(ExecutionError::Disconnected {
        path: "change_stream".to_string(),
    })
}

impl ChangeStream {
    pub(crate) fn new(
        subscription_id: SubscriptionId,
        code: SessionCode,
        rx: Receiver<ChangeNotification>,
        control_tx: Sender<ControlMsg>,
        lagged: Arc<AtomicBool>,
        feed_drops: Arc<AtomicU64>,
    ) -> Self {
        let seen = feed_drops.load(Ordering::Acquire);
        Self {
            subscription_id,
            code,
            rx,
            control_tx,
            unregistered: AtomicBool::new(false),
            lagged,
            feed_drops,
            seen_feed_drops: AtomicU64::new(seen),
        }
    }

    /// True if a notification for this stream was lost since the last call.
    ///
    /// Clears the flag. Covers both a full stream buffer and a publish the
    /// feed itself had to drop.
    pub fn take_lagged(&self) -> bool {
        let own = self.lagged.swap(false, Ordering::AcqRel);
        let drops = self.feed_drops.load(Ordering::Acquire);
        let shared = self.seen_feed_drops.swap(drops, Ordering::AcqRel) != drops;
        own || shared
    }

    /// The subscription id backing this stream.
    #[must_use]
    pub const fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id
    }

    /// The record key this stream is filtered to.
    #[must_use]
    pub const fn code(&self) -> &SessionCode {
        &self.code
    }

    /// Best-effort explicit unregistration.
    ///
    /// Non-blocking and idempotent. Once the feed drops the subscription the
    /// stream becomes disconnected.
    pub fn unsubscribe(&self) {
        if self.unregistered.swap(true, Ordering::AcqRel) {
            return;
        }

        let _ = self.control_tx.try_send(ControlMsg::Unregister {
            subscription_id: self.subscription_id,
        });
    }

    /// Receive the next notification (blocking).
    pub fn recv(&self) -> GhostResult<ChangeNotification> {
        self.rx.recv().map_err(|_| disconnected())
    }

    /// Receive the next notification if one is queued.
    pub fn try_recv(&self) -> GhostResult<Option<ChangeNotification>> {
        match self.rx.try_recv() {
            Ok(n) => Ok(Some(n)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(disconnected()),
        }
    }

    /// Receive the next notification with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> GhostResult<ChangeNotification> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => GhostError::Execution(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => disconnected(),
        })
    }
}

impl Drop for ChangeStream {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
