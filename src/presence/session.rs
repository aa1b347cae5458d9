use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{GhostError, GhostResult};
use crate::notice::{Notice, NoticeKind};
use crate::session::SessionCode;

use super::hub::{PresenceHub, PresenceLink};
use super::identity::PlayerIdentity;
use super::payload::{BroadcastNotice, Player, PresencePayload};
use super::roster::PresenceRoster;
use super::PresenceConfig;

/// Presence for one participant in one session.
///
/// Tracks the participant on the session's presence channel and folds the
/// channel into a [`PresenceRoster`]. After a disconnect the roster keeps the
/// last known member list.
#[derive(Debug)]
pub struct PresenceSession {
    identity: PlayerIdentity,
    joined_at: DateTime<Utc>,
    link: PresenceLink,
    roster: PresenceRoster,
    connected: bool,
}

impl PresenceSession {
    /// Join the presence channel of `code` and start tracking.
    pub fn join(
        hub: &dyn PresenceHub,
        code: &SessionCode,
        identity: PlayerIdentity,
        cfg: &PresenceConfig,
    ) -> GhostResult<Self> {
        let link = hub.join(&code.presence_channel(), &identity.id)?;
        let joined_at = Utc::now();
        link.track(PresencePayload {
            name: identity.name.clone(),
            joined_at,
        })?;
        debug!(code = %code, player = %identity.id, "presence tracked");

        let roster = PresenceRoster::new(identity.id.clone(), cfg.dedupe_window);
        Ok(Self {
            identity,
            joined_at,
            link,
            roster,
            connected: true,
        })
    }

    /// This participant.
    #[must_use]
    pub const fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    /// Last known members.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        self.roster.players()
    }

    /// Number of last known members.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.roster.len()
    }

    /// True when nobody else is in the session.
    #[must_use]
    pub fn is_alone(&self) -> bool {
        self.roster.is_alone()
    }

    /// False once the channel has dropped.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    fn on_disconnect(&mut self, err: &GhostError) -> Notice {
        self.connected = false;
        warn!(channel = %self.link.channel(), player = %self.identity.id, error = %err, "presence channel lost");
        Notice::from(err)
    }

    /// Fold every queued event without blocking. Returns notices to show.
    pub fn poll(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if !self.connected {
            return notices;
        }
        loop {
            match self.link.try_recv() {
                Ok(Some(event)) => notices.extend(self.roster.apply(event)),
                Ok(None) => break,
                Err(e) => {
                    notices.push(self.on_disconnect(&e));
                    break;
                }
            }
        }
        notices
    }

    /// Fold events until one yields a notice or `timeout` passes.
    pub fn wait(&mut self, timeout: std::time::Duration) -> Option<Notice> {
        let deadline = std::time::Instant::now() + timeout;
        while self.connected {
            let left = deadline.saturating_duration_since(std::time::Instant::now());
            match self.link.recv_timeout(left) {
                Ok(Some(event)) => {
                    if let Some(n) = self.roster.apply(event) {
                        return Some(n);
                    }
                }
                Ok(None) => return None,
                Err(e) => return Some(self.on_disconnect(&e)),
            }
        }
        None
    }

    /// Tell everyone else about an action. Fire-and-forget.
    pub fn announce(&self, kind: NoticeKind, message: impl Into<String>) {
        let notice = BroadcastNotice::new(kind, message, self.identity.id.clone(), self.identity.name.clone());
        if let Err(e) = self.link.broadcast(notice) {
            warn!(player = %self.identity.id, error = %e, "broadcast not sent");
        }
    }

    /// Change the display name and re-track under it.
    pub fn rename(&mut self, name: &str) -> GhostResult<()> {
        self.identity.rename(name)?;
        self.link.track(PresencePayload {
            name: self.identity.name.clone(),
            joined_at: self.joined_at,
        })
    }

    /// Stop tracking and detach.
    pub fn leave(self) -> PlayerIdentity {
        let _ = self.link.untrack();
        self.link.leave();
        self.identity
    }
}
