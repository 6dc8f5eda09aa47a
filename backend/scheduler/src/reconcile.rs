//! Reconciliation Sweep: re-derive the store from live channel history.

use std::collections::BTreeMap;

use ackwatch_core::{AckResult, Announcement, AnnouncementId};
use tracing::{debug, info, warn};

use crate::calls::bounded;
use crate::engine::Engine;
use crate::settings::HISTORY_PAGE_SIZE;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<AnnouncementId>,
    pub removed: Vec<AnnouncementId>,
    pub total: usize,
}

impl Engine {
    /// Fetch the full history of the monitored channel and diff it against the
    /// store. A failed page aborts the pass with the store untouched, since a
    /// partial history would read as mass deletion.
    pub async fn reconcile(&mut self) -> AckResult<ReconcileReport> {
        let live = self.fetch_history().await?;
        let mut report = ReconcileReport::default();

        for id in self.ledger.store.ids() {
            if live.contains_key(&id) {
                continue;
            }
            let removal = self.ledger.drop_announcement(id);
            self.report_removal(&removal, None).await;
            report.removed.push(id);
        }

        for (id, announcement) in live {
            if self.ledger.store.upsert(announcement) {
                report.added.push(id);
            }
        }

        report.total = self.ledger.store.len();
        info!(
            added = report.added.len(),
            removed = report.removed.len(),
            total = report.total,
            stats = ?self.ledger.stats(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    async fn fetch_history(&self) -> AckResult<BTreeMap<AnnouncementId, Announcement>> {
        let channel = self.settings.announcement_channel;
        let mut live = BTreeMap::new();
        let mut before: Option<AnnouncementId> = None;
        let mut pages = 0usize;

        loop {
            let page = bounded(
                self.settings.call_timeout,
                "fetch_channel_messages",
                self.platform
                    .fetch_channel_messages(channel, before, HISTORY_PAGE_SIZE),
            )
            .await
            .inspect_err(|e| warn!(%channel, pages, error = %e, "History fetch failed, reconciliation aborted"))?;

            if page.is_empty() {
                break;
            }
            pages += 1;
            // Pages come newest first; the oldest id is the next cursor.
            let oldest = page.iter().map(|a| a.id).min();
            for announcement in page {
                if announcement.author_bot {
                    continue;
                }
                live.insert(announcement.id, announcement);
            }
            if oldest.is_none() || oldest == before {
                break;
            }
            before = oldest;
        }

        debug!(%channel, pages, messages = live.len(), "Channel history fetched");
        Ok(live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{announcement, engine, seeded, settings};
    use ackwatch_core::{AckKey, MemberId};

    #[tokio::test]
    async fn adds_new_and_drops_stale_announcements() {
        let (mut engine, platform, _rx) = seeded(settings(1), &[10, 11], &[1]);
        engine.sweep().await;
        platform.clear_outbox();

        platform.delete(11);
        platform.post(announcement(12));
        let report = engine.reconcile().await.unwrap();

        assert_eq!(report.added, vec![AnnouncementId(12)]);
        assert_eq!(report.removed, vec![AnnouncementId(11)]);
        assert_eq!(report.total, 2);
        assert!(engine
            .ledger()
            .tracker
            .get(AckKey::new(MemberId(1), AnnouncementId(11)))
            .is_none());
        assert!(engine
            .ledger()
            .tracker
            .get(AckKey::new(MemberId(1), AnnouncementId(10)))
            .is_some());

        let posts = platform.staff_posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].matches("<@1>").count(), 1);
    }

    #[tokio::test]
    async fn walks_every_history_page() {
        let (mut engine, platform, _rx) = engine(settings(2));
        for id in 1..=250 {
            platform.post(announcement(id));
        }

        let report = engine.reconcile().await.unwrap();

        assert_eq!(report.added.len(), 250);
        assert_eq!(engine.ledger().store.len(), 250);
        assert!(engine.ledger().store.contains(AnnouncementId(1)));
    }

    #[tokio::test]
    async fn skips_bot_authored_messages() {
        let (mut engine, platform, _rx) = engine(settings(2));
        platform.post(announcement(1));
        platform.post(Announcement {
            author_bot: true,
            ..announcement(2)
        });

        let report = engine.reconcile().await.unwrap();

        assert_eq!(report.added, vec![AnnouncementId(1)]);
        assert!(!engine.ledger().store.contains(AnnouncementId(2)));
    }

    #[tokio::test]
    async fn unchanged_history_is_a_no_op() {
        let (mut engine, _platform, _rx) = seeded(settings(2), &[10, 11], &[]);
        let report = engine.reconcile().await.unwrap();
        assert!(report.added.is_empty());
        assert!(report.removed.is_empty());
        assert_eq!(report.total, 2);
    }

    #[tokio::test]
    async fn failed_history_leaves_store_untouched() {
        let (mut engine, platform, _rx) = seeded(settings(2), &[10, 11], &[1]);
        platform.delete(10);
        platform.fail_history(true);

        let err = engine.reconcile().await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(engine.ledger().store.len(), 2);
        assert!(platform.staff_posts().is_empty());
    }
}
