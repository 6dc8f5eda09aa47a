//! Acknowledgment Tracker: per-(member, announcement) miss state.
//!
//! Every operation is a single synchronous step over the map, so no caller can
//! observe a half-applied update across an `.await`.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{AckKey, AckStatus, AnnouncementId, MemberId};

/// Result of one [`AckTracker::record_miss`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissOutcome {
    pub status: AckStatus,
    /// Previous count was below the threshold and the new one is at or above it.
    pub just_crossed: bool,
}

#[derive(Debug)]
pub struct AckTracker {
    threshold: u32,
    entries: HashMap<AckKey, AckStatus>,
}

impl AckTracker {
    /// `threshold` is clamped to at least 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            entries: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Increment the miss count, creating the entry lazily.
    pub fn record_miss(&mut self, key: AckKey) -> MissOutcome {
        let status = self.entries.entry(key).or_default();
        let previous = status.missed_count;
        status.missed_count = previous.saturating_add(1);
        let just_crossed = previous < self.threshold && status.missed_count >= self.threshold;
        debug!(%key, missed = status.missed_count, just_crossed, "Miss recorded");
        MissOutcome {
            status: *status,
            just_crossed,
        }
    }

    /// Forget the pair entirely. Returns what was tracked so callers can tell
    /// whether a moderator had been alerted.
    pub fn clear(&mut self, key: AckKey) -> Option<AckStatus> {
        self.entries.remove(&key)
    }

    pub fn get(&self, key: AckKey) -> Option<AckStatus> {
        self.entries.get(&key).copied()
    }

    pub fn was_notified(&self, key: AckKey) -> bool {
        self.entries
            .get(&key)
            .is_some_and(|status| status.moderator_notified)
    }

    /// Returns true when the flag flipped; false if already set or untracked.
    pub fn mark_notified(&mut self, key: AckKey) -> bool {
        match self.entries.get_mut(&key) {
            Some(status) if !status.moderator_notified => {
                status.moderator_notified = true;
                true
            }
            _ => false,
        }
    }

    /// Remove every entry for one announcement, returning the removed entries.
    pub fn purge_by_announcement(&mut self, id: AnnouncementId) -> Vec<(AckKey, AckStatus)> {
        let keys: Vec<AckKey> = self
            .entries
            .keys()
            .filter(|key| key.announcement == id)
            .copied()
            .collect();
        let mut removed: Vec<_> = keys
            .into_iter()
            .filter_map(|key| self.entries.remove(&key).map(|status| (key, status)))
            .collect();
        removed.sort_by_key(|(key, _)| *key);
        removed
    }

    pub fn purge_by_member(&mut self, member: MemberId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.member != member);
        before - self.entries.len()
    }

    pub fn entries_for_member(&self, member: MemberId) -> Vec<(AckKey, AckStatus)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|(key, _)| key.member == member)
            .map(|(key, status)| (*key, *status))
            .collect();
        entries.sort_by_key(|(key, _)| *key);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn notified_count(&self) -> usize {
        self.entries.values().filter(|s| s.moderator_notified).count()
    }
}
