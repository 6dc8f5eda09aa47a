//! Announcement Store: the set of announcements that need tracking.

use std::collections::BTreeMap;

use tracing::debug;

use crate::types::{Announcement, AnnouncementId};

/// Announcements keyed by id. Iteration order is creation order because
/// platform ids grow monotonically.
#[derive(Debug, Default)]
pub struct AnnouncementStore {
    announcements: BTreeMap<AnnouncementId, Announcement>,
}

impl AnnouncementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite cached metadata. Returns true when the id was new.
    pub fn upsert(&mut self, announcement: Announcement) -> bool {
        let id = announcement.id;
        let is_new = self.announcements.insert(id, announcement).is_none();
        debug!(announcement = %id, is_new, "Announcement upserted");
        is_new
    }

    /// Remove an announcement. The caller owns the cascade into the tracker;
    /// see [`crate::Ledger::drop_announcement`].
    pub fn remove(&mut self, id: AnnouncementId) -> Option<Announcement> {
        self.announcements.remove(&id)
    }

    pub fn contains(&self, id: AnnouncementId) -> bool {
        self.announcements.contains_key(&id)
    }

    pub fn get(&self, id: AnnouncementId) -> Option<&Announcement> {
        self.announcements.get(&id)
    }

    /// Owned copy in creation order, safe to hold across suspension points.
    pub fn snapshot(&self) -> Vec<Announcement> {
        self.announcements.values().cloned().collect()
    }

    pub fn ids(&self) -> Vec<AnnouncementId> {
        self.announcements.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.announcements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.announcements.is_empty()
    }
}
