//! Member list folded from presence events.

use std::collections::{HashSet, VecDeque};

use crate::notice::Notice;

use super::payload::{display_name, Player, PresenceEvent, PresenceState};

/// Member list plus broadcast filtering for one participant.
///
/// Only `Sync` changes the member list. `Join` and `Leave` for other keys
/// produce "joined"/"left" notices. Broadcasts from `self_id` are suppressed
/// and a broadcast whose `dedupe_id` was seen among the last `dedupe_window`
/// is dropped.
#[derive(Debug, Clone)]
pub struct PresenceRoster {
    self_id: String,
    players: Vec<Player>,
    recent: VecDeque<String>,
    recent_set: HashSet<String>,
    dedupe_window: usize,
}

impl PresenceRoster {
    /// Empty roster for the participant keyed `self_id`.
    pub fn new(self_id: impl Into<String>, dedupe_window: usize) -> Self {
        let dedupe_window = dedupe_window.max(1);
        Self {
            self_id: self_id.into(),
            players: Vec::new(),
            recent: VecDeque::with_capacity(dedupe_window),
            recent_set: HashSet::with_capacity(dedupe_window),
            dedupe_window,
        }
    }

    /// Current members, oldest first.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when nobody is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// True when this participant is the only member left.
    #[must_use]
    pub fn is_alone(&self) -> bool {
        self.players.iter().all(|p| p.id == self.self_id)
    }

    /// Fold one event. Returns a notice to show, if any.
    pub fn apply(&mut self, event: PresenceEvent) -> Option<Notice> {
        match event {
            PresenceEvent::Sync { state } => {
                self.rebuild(&state);
                None
            }
            PresenceEvent::Join { key, presences } if key != self.self_id => {
                Some(Notice::info(format!("{} joined", display_name(&key, &presences))))
            }
            PresenceEvent::Leave { key, presences } if key != self.self_id => {
                Some(Notice::info(format!("{} left", display_name(&key, &presences))))
            }
            PresenceEvent::Join { .. } | PresenceEvent::Leave { .. } => None,
            PresenceEvent::Broadcast(notice) => {
                if notice.sender_id == self.self_id || !self.remember(&notice.dedupe_id) {
                    return None;
                }
                Some(notice.to_notice())
            }
        }
    }

    fn rebuild(&mut self, state: &PresenceState) {
        let mut players: Vec<Player> = state
            .iter()
            .filter_map(|(key, presences)| {
                let first = presences.first()?;
                Some(Player {
                    id: key.clone(),
                    name: display_name(key, presences),
                    joined_at: first.joined_at,
                })
            })
            .collect();
        players.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));
        self.players = players;
    }

    /// Record a dedupe id. False if it was already seen.
    fn remember(&mut self, dedupe_id: &str) -> bool {
        if self.recent_set.contains(dedupe_id) {
            return false;
        }
        if self.recent.len() == self.dedupe_window {
            if let Some(old) = self.recent.pop_front() {
                self.recent_set.remove(&old);
            }
        }
        self.recent.push_back(dedupe_id.to_string());
        self.recent_set.insert(dedupe_id.to_string());
        true
    }
}
