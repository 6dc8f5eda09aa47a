use serde::Serialize;
use tracing::info;

use crate::store::AnnouncementStore;
use crate::tracker::AckTracker;
use crate::types::{AckKey, AckStatus, Announcement, AnnouncementId, MemberId};

/// The owned aggregate of store and tracker. Mutation goes through `&mut`, so
/// the single owning task serialises every change.
#[derive(Debug)]
pub struct Ledger {
    pub store: AnnouncementStore,
    pub tracker: AckTracker,
}

/// What [`Ledger::drop_announcement`] took out.
#[derive(Debug, Default)]
pub struct Removal {
    pub announcement: Option<Announcement>,
    pub purged: Vec<(AckKey, AckStatus)>,
}

impl Removal {
    /// Members a moderator had been alerted about for this announcement.
    pub fn notified_members(&self) -> Vec<MemberId> {
        let mut members: Vec<MemberId> = self
            .purged
            .iter()
            .filter(|(_, status)| status.moderator_notified)
            .map(|(key, _)| key.member)
            .collect();
        members.sort();
        members.dedup();
        members
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub announcements: usize,
    pub tracked_pairs: usize,
    pub notified_pairs: usize,
}

impl Ledger {
    pub fn new(threshold: u32) -> Self {
        Self {
            store: AnnouncementStore::new(),
            tracker: AckTracker::new(threshold),
        }
    }

    /// Remove an announcement and cascade into the tracker in one step.
    pub fn drop_announcement(&mut self, id: AnnouncementId) -> Removal {
        let announcement = self.store.remove(id);
        let purged = self.tracker.purge_by_announcement(id);
        if announcement.is_some() || !purged.is_empty() {
            info!(
                announcement = %id,
                purged = purged.len(),
                "Announcement dropped from tracking"
            );
        }
        Removal {
            announcement,
            purged,
        }
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            announcements: self.store.len(),
            tracked_pairs: self.tracker.len(),
            notified_pairs: self.tracker.notified_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelId;
    use chrono::Utc;

    fn announcement(id: u64) -> Announcement {
        Announcement {
            id: AnnouncementId(id),
            channel_id: ChannelId(1),
            space_id: None,
            created_at: Utc::now(),
            link: format!("https://example.test/{id}"),
            author_bot: false,
        }
    }

    #[test]
    fn drop_cascades_into_tracker() {
        let mut ledger = Ledger::new(1);
        ledger.store.upsert(announcement(1));
        ledger.store.upsert(announcement(2));
        let notified = AckKey::new(MemberId(9), AnnouncementId(1));
        ledger.tracker.record_miss(notified);
        ledger.tracker.mark_notified(notified);
        ledger.tracker.record_miss(AckKey::new(MemberId(8), AnnouncementId(1)));
        ledger.tracker.record_miss(AckKey::new(MemberId(8), AnnouncementId(2)));

        let removal = ledger.drop_announcement(AnnouncementId(1));
        assert!(removal.announcement.is_some());
        assert_eq!(removal.purged.len(), 2);
        assert_eq!(removal.notified_members(), vec![MemberId(9)]);
        assert_eq!(
            ledger.stats(),
            LedgerStats {
                announcements: 1,
                tracked_pairs: 1,
                notified_pairs: 0,
            }
        );
    }

    #[test]
    fn dropping_unknown_announcement_is_empty() {
        let mut ledger = Ledger::new(2);
        let removal = ledger.drop_announcement(AnnouncementId(77));
        assert!(removal.announcement.is_none());
        assert!(removal.purged.is_empty());
    }
}
