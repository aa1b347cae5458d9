//! Presence channels.
//!
//! A hub carries two kinds of traffic per channel: tracked presence (folded
//! by the hub into aggregate state and re-sent as `Sync`) and fire-and-forget
//! broadcasts. Clients talk to a hub only through a [`PresenceLink`]: an
//! outbound command sender and an inbound event receiver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ExecutionError, GhostError, GhostResult, TransportError};

use super::payload::{BroadcastNotice, PresenceEvent, PresencePayload, PresenceState};
use super::PresenceConfig;

/// Outbound request from a link to its hub.
#[derive(Debug)]
pub enum PresenceCommand {
    /// Attach a link to a channel.
    Join {
        /// Link id.
        link: Uuid,
        /// Channel name.
        channel: String,
        /// Presence key.
        key: String,
        /// Where the link receives events.
        events: Sender<PresenceEvent>,
        /// Acknowledged once the link is attached.
        reply: Sender<()>,
    },
    /// Publish or replace the link's payload.
    Track {
        /// Link id.
        link: Uuid,
        /// New payload.
        payload: PresencePayload,
    },
    /// Withdraw the link's payload but stay attached.
    Untrack {
        /// Link id.
        link: Uuid,
    },
    /// Send a notice to everyone on the link's channel.
    Broadcast {
        /// Link id.
        link: Uuid,
        /// The notice.
        notice: BroadcastNotice,
    },
    /// Detach the link.
    Leave {
        /// Link id.
        link: Uuid,
    },
}

/// A source of presence channels.
pub trait PresenceHub: Send + Sync {
    /// Attach to `channel` under presence `key`.
    fn join(&self, channel: &str, key: &str) -> GhostResult<PresenceLink>;
}

/// One client's connection to one presence channel.
///
/// Dropping the link detaches it best-effort.
#[derive(Debug)]
pub struct PresenceLink {
    id: Uuid,
    channel: String,
    key: String,
    outbound: Sender<PresenceCommand>,
    inbound: Receiver<PresenceEvent>,
    left: AtomicBool,
}

impl PresenceLink {
    /// Assemble a link from its two halves.
    #[must_use]
    pub fn new(
        id: Uuid,
        channel: impl Into<String>,
        key: impl Into<String>,
        outbound: Sender<PresenceCommand>,
        inbound: Receiver<PresenceEvent>,
    ) -> Self {
        Self {
            id,
            channel: channel.into(),
            key: key.into(),
            outbound,
            inbound,
            left: AtomicBool::new(false),
        }
    }

    /// Channel name.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Presence key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn disconnected(&self) -> GhostError {
        GhostError::Transport(TransportError::PresenceDisconnect {
            channel: self.channel.clone(),
        })
    }

    fn send(&self, cmd: PresenceCommand) -> GhostResult<()> {
        match self.outbound.try_send(cmd) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(GhostError::Execution(ExecutionError::Storage {
                message: format!("presence command queue full for '{}'", self.channel),
            })),
            Err(TrySendError::Disconnected(_)) => Err(self.disconnected()),
        }
    }

    /// Publish this client's payload.
    pub fn track(&self, payload: PresencePayload) -> GhostResult<()> {
        self.send(PresenceCommand::Track { link: self.id, payload })
    }

    /// Withdraw this client's payload.
    pub fn untrack(&self) -> GhostResult<()> {
        self.send(PresenceCommand::Untrack { link: self.id })
    }

    /// Fire-and-forget broadcast.
    pub fn broadcast(&self, notice: BroadcastNotice) -> GhostResult<()> {
        self.send(PresenceCommand::Broadcast { link: self.id, notice })
    }

    /// Next queued event, if any.
    pub fn try_recv(&self) -> GhostResult<Option<PresenceEvent>> {
        match self.inbound.try_recv() {
            Ok(e) => Ok(Some(e)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(self.disconnected()),
        }
    }

    /// Next event, waiting at most `timeout`. `Ok(None)` on timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> GhostResult<Option<PresenceEvent>> {
        match self.inbound.recv_timeout(timeout) {
            Ok(e) => Ok(Some(e)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(self.disconnected()),
        }
    }

    /// Detach from the channel. Idempotent.
    pub fn leave(&self) {
        if self.left.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.outbound.try_send(PresenceCommand::Leave { link: self.id });
    }
}

impl Drop for PresenceLink {
    fn drop(&mut self) {
        self.leave();
    }
}

#[derive(Debug)]
enum HubMsg {
    Disconnect { channel: String, key: String, reply: Sender<()> },
}

#[derive(Debug)]
struct Member {
    channel: String,
    key: String,
    tx: Sender<PresenceEvent>,
    payload: Option<PresencePayload>,
}

/// In-process presence hub.
///
/// Runs one worker thread that owns all channel state. Events are delivered
/// with non-blocking sends; a full member stream loses the event.
#[derive(Debug)]
pub struct InMemoryPresenceHub {
    cfg: PresenceConfig,
    commands: Sender<PresenceCommand>,
    admin: Sender<HubMsg>,
    dropped_events: Arc<AtomicU64>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Default for InMemoryPresenceHub {
    fn default() -> Self {
        Self::new(PresenceConfig::default())
    }
}

impl InMemoryPresenceHub {
    /// Start the hub worker.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread cannot be spawned.
    #[must_use]
    pub fn new(cfg: PresenceConfig) -> Self {
        let (commands, command_rx) = bounded::<PresenceCommand>(cfg.command_queue_capacity.max(1));
        let (admin, admin_rx) = bounded::<HubMsg>(16);
        let dropped_events = Arc::new(AtomicU64::new(0));

        let thread_dropped = Arc::clone(&dropped_events);
        let join = thread::Builder::new()
            .name("ghostsync-presence".to_string())
            .spawn(move || worker_loop(&thread_dropped, &command_rx, &admin_rx))
            .expect("failed to spawn ghostsync presence worker");

        Self {
            cfg,
            commands,
            admin,
            dropped_events,
            join: Mutex::new(Some(join)),
        }
    }

    /// Events lost to full member streams.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Cut every link of `key` on `channel` as if its connection dropped.
    pub fn disconnect(&self, channel: &str, key: &str) -> GhostResult<()> {
        let (reply, reply_rx) = bounded::<()>(1);
        let gone = || {
            GhostError::Execution(ExecutionError::Disconnected {
                path: "presence_hub".to_string(),
            })
        };
        self.admin
            .send(HubMsg::Disconnect {
                channel: channel.to_string(),
                key: key.to_string(),
                reply,
            })
            .map_err(|_| gone())?;
        reply_rx.recv().map_err(|_| gone())
    }
}

impl PresenceHub for InMemoryPresenceHub {
    fn join(&self, channel: &str, key: &str) -> GhostResult<PresenceLink> {
        let link = Uuid::new_v4();
        let (events, inbound) = bounded::<PresenceEvent>(self.cfg.stream_capacity.max(1));
        let (reply, reply_rx) = bounded::<()>(1);
        let gone = || {
            GhostError::Transport(TransportError::PresenceDisconnect {
                channel: channel.to_string(),
            })
        };

        self.commands
            .send(PresenceCommand::Join {
                link,
                channel: channel.to_string(),
                key: key.to_string(),
                events,
                reply,
            })
            .map_err(|_| gone())?;
        reply_rx.recv().map_err(|_| gone())?;

        debug!(channel, key, "presence link attached");
        Ok(PresenceLink::new(link, channel, key, self.commands.clone(), inbound))
    }
}

impl Drop for InMemoryPresenceHub {
    fn drop(&mut self) {
        // Closing the admin channel stops the worker; links see a disconnect.
        let (dummy_admin, _) = bounded::<HubMsg>(1);
        drop(std::mem::replace(&mut self.admin, dummy_admin));

        if let Ok(mut guard) = self.join.lock() {
            drop(guard.take());
        }
    }
}

fn channel_state(members: &HashMap<Uuid, Member>, channel: &str) -> PresenceState {
    let mut state = PresenceState::new();
    for m in members.values().filter(|m| m.channel == channel) {
        if let Some(p) = &m.payload {
            state.entry(m.key.clone()).or_default().push(p.clone());
        }
    }
    state
}

struct Hub<'a> {
    members: HashMap<Uuid, Member>,
    dropped_events: &'a AtomicU64,
}

impl Hub<'_> {
    /// Send to one member. False if its receiver is gone.
    fn deliver(&self, id: Uuid, event: PresenceEvent) -> bool {
        let Some(m) = self.members.get(&id) else {
            return true;
        };
        match m.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                warn!(channel = %m.channel, key = %m.key, "presence event dropped for slow member");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    fn fanout(&mut self, channel: &str, event: &PresenceEvent) {
        let ids: Vec<Uuid> = self
            .members
            .iter()
            .filter(|(_, m)| m.channel == channel)
            .map(|(id, _)| *id)
            .collect();
        let dead: Vec<Uuid> = ids.into_iter().filter(|id| !self.deliver(*id, event.clone())).collect();
        for id in dead {
            self.remove(id);
        }
    }

    /// Send the aggregate state, then the delta.
    fn announce(&mut self, channel: &str, delta: PresenceEvent) {
        let state = channel_state(&self.members, channel);
        self.fanout(channel, &PresenceEvent::Sync { state });
        self.fanout(channel, &delta);
    }

    fn remove(&mut self, id: Uuid) {
        let Some(m) = self.members.remove(&id) else {
            return;
        };
        debug!(channel = %m.channel, key = %m.key, "presence link detached");
        if let Some(p) = m.payload {
            self.announce(&m.channel, PresenceEvent::Leave {
                key: m.key,
                presences: vec![p],
            });
        }
    }

    fn handle(&mut self, cmd: PresenceCommand) {
        match cmd {
            PresenceCommand::Join { link, channel, key, events, reply } => {
                let state = channel_state(&self.members, &channel);
                let _ = events.try_send(PresenceEvent::Sync { state });
                self.members.insert(link, Member { channel, key, tx: events, payload: None });
                let _ = reply.send(());
            }
            PresenceCommand::Track { link, payload } => {
                let Some(m) = self.members.get_mut(&link) else {
                    return;
                };
                m.payload = Some(payload.clone());
                let (channel, key) = (m.channel.clone(), m.key.clone());
                self.announce(&channel, PresenceEvent::Join {
                    key,
                    presences: vec![payload],
                });
            }
            PresenceCommand::Untrack { link } => {
                let Some(m) = self.members.get_mut(&link) else {
                    return;
                };
                if let Some(p) = m.payload.take() {
                    let (channel, key) = (m.channel.clone(), m.key.clone());
                    self.announce(&channel, PresenceEvent::Leave {
                        key,
                        presences: vec![p],
                    });
                }
            }
            PresenceCommand::Broadcast { link, notice } => {
                let Some(channel) = self.members.get(&link).map(|m| m.channel.clone()) else {
                    return;
                };
                self.fanout(&channel, &PresenceEvent::Broadcast(notice));
            }
            PresenceCommand::Leave { link } => self.remove(link),
        }
    }
}

fn worker_loop(dropped_events: &AtomicU64, command_rx: &Receiver<PresenceCommand>, admin_rx: &Receiver<HubMsg>) {
    let mut hub = Hub {
        members: HashMap::new(),
        dropped_events,
    };

    loop {
        crossbeam_channel::select! {
            recv(command_rx) -> msg => match msg {
                Ok(cmd) => hub.handle(cmd),
                Err(_) => break,
            },
            recv(admin_rx) -> msg => match msg {
                Ok(HubMsg::Disconnect { channel, key, reply }) => {
                    let ids: Vec<Uuid> = hub
                        .members
                        .iter()
                        .filter(|(_, m)| m.channel == channel && m.key == key)
                        .map(|(id, _)| *id)
                        .collect();
                    for id in ids {
                        hub.remove(id);
                    }
                    let _ = reply.send(());
                }
                Err(_) => break,
            },
        }
    }

    debug!("presence worker stopped");
}
