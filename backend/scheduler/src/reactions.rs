//! Immediate reactions to platform events.

use ackwatch_core::{
    marker_name, AckEvent, AckKey, Announcement, AnnouncementId, AnnouncementRef, ChannelId,
    Member, MemberRef, PlatformEvent, Ref,
};
use ackwatch_logging::{EscalationEvent, EventLogger};
use tracing::{debug, info, warn};

use crate::calls::bounded;
use crate::engine::Engine;
use crate::notice;

/// What an event changed, for tests and debug logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Ignored,
    Reconciled,
    Tracked(AnnouncementId),
    Cleared { key: AckKey, was_notified: bool },
    Reset { key: AckKey, was_notified: bool },
    Deleted { announcement: AnnouncementId, notified: usize },
}

impl Engine {
    pub async fn handle_event(&mut self, event: PlatformEvent) -> Reaction {
        let kind = event.kind();
        let reaction = match event {
            PlatformEvent::Ready => match self.reconcile().await {
                Ok(_) => Reaction::Reconciled,
                Err(e) => {
                    warn!(error = %e, "Startup reconciliation failed");
                    Reaction::Ignored
                }
            },
            PlatformEvent::AnnouncementCreated {
                channel_id,
                announcement,
            } => self.on_created(channel_id, announcement).await,
            PlatformEvent::AcknowledgeAdded(ack) => self.on_ack_added(ack).await,
            PlatformEvent::AcknowledgeRemoved(ack) => self.on_ack_removed(ack).await,
            PlatformEvent::AnnouncementDeleted {
                channel_id,
                announcement,
            } => self.on_deleted(channel_id, announcement).await,
        };
        debug!(%kind, ?reaction, "Platform event handled");
        reaction
    }

    fn monitored(&self, channel: ChannelId) -> bool {
        channel == self.settings.announcement_channel
    }

    async fn on_created(&mut self, channel: ChannelId, announcement: AnnouncementRef) -> Reaction {
        if !self.monitored(channel) {
            debug!(%channel, announcement = %announcement.id(), "Message outside monitored channel");
            return Reaction::Ignored;
        }
        let Some(announcement) = self.resolve_announcement(channel, announcement).await else {
            return Reaction::Ignored;
        };
        if announcement.author_bot {
            return Reaction::Ignored;
        }
        let id = announcement.id;
        if self.ledger.store.upsert(announcement) {
            info!(announcement = %id, "Tracking new announcement");
        }
        Reaction::Tracked(id)
    }

    async fn on_ack_added(&mut self, ack: AckEvent) -> Reaction {
        let Some(key) = self.acknowledgment_key(&ack).await else {
            return Reaction::Ignored;
        };
        let was_notified = self
            .ledger
            .tracker
            .clear(key)
            .is_some_and(|status| status.moderator_notified);

        if was_notified {
            let link = self.link_for(key.announcement);
            self.dispatcher
                .staff(&notice::resolved(key.member, link.as_deref()), None)
                .await;
            self.resolved_since_sweep.insert(key.member);
            EventLogger::log_event(
                None,
                EscalationEvent::Resolved {
                    member: key.member.get(),
                    batched: false,
                },
            );
        }
        debug!(%key, was_notified, "Acknowledgment added");
        Reaction::Cleared { key, was_notified }
    }

    async fn on_ack_removed(&mut self, ack: AckEvent) -> Reaction {
        let Some(key) = self.acknowledgment_key(&ack).await else {
            return Reaction::Ignored;
        };
        // Start from zero on the next sweep.
        let was_notified = self
            .ledger
            .tracker
            .clear(key)
            .is_some_and(|status| status.moderator_notified);

        if was_notified {
            let link = self.link_for(key.announcement);
            self.dispatcher
                .staff(
                    &notice::reopened(key.member, link.as_deref(), &self.settings.marker),
                    None,
                )
                .await;
            EventLogger::log_event(
                None,
                EscalationEvent::Reopened {
                    member: key.member.get(),
                    announcement: key.announcement.get(),
                },
            );
        }
        debug!(%key, was_notified, "Acknowledgment removed");
        Reaction::Reset { key, was_notified }
    }

    async fn on_deleted(&mut self, channel: ChannelId, id: AnnouncementId) -> Reaction {
        if !self.monitored(channel) {
            return Reaction::Ignored;
        }
        let removal = self.ledger.drop_announcement(id);
        let notified = removal.notified_members().len();
        self.report_removal(&removal, None).await;
        Reaction::Deleted {
            announcement: id,
            notified,
        }
    }

    /// Key for a marker event on the monitored channel from a human member.
    async fn acknowledgment_key(&self, ack: &AckEvent) -> Option<AckKey> {
        if !self.monitored(ack.channel_id)
            || marker_name(&ack.marker) != marker_name(&self.settings.marker)
        {
            debug!(member = %ack.member.id(), marker = %ack.marker, "Not an acknowledgment");
            return None;
        }
        let member = self.resolve_member(&ack.member).await?;
        if member.bot {
            debug!(member = %member.id, name = %member.name, "Ignoring bot reaction");
            return None;
        }
        Some(AckKey::new(member.id, ack.announcement))
    }

    async fn resolve_member(&self, member: &MemberRef) -> Option<Member> {
        match member {
            Ref::Full(member) => Some(member.clone()),
            Ref::Partial(id) => match bounded(
                self.settings.call_timeout,
                "fetch_member",
                self.platform.fetch_member(*id),
            )
            .await
            {
                Ok(member) => Some(member),
                Err(e) => {
                    warn!(member = %id, error = %e, "Failed to resolve member, event dropped");
                    None
                }
            },
        }
    }

    async fn resolve_announcement(
        &self,
        channel: ChannelId,
        announcement: AnnouncementRef,
    ) -> Option<Announcement> {
        match announcement {
            Ref::Full(announcement) => Some(announcement),
            Ref::Partial(id) => match bounded(
                self.settings.call_timeout,
                "fetch_announcement",
                self.platform.fetch_announcement(channel, id),
            )
            .await
            {
                Ok(announcement) => Some(announcement),
                Err(e) => {
                    warn!(announcement = %id, error = %e, "Failed to resolve announcement, event dropped");
                    None
                }
            },
        }
    }

    fn link_for(&self, id: AnnouncementId) -> Option<String> {
        self.ledger.store.get(id).map(|a| a.link.clone())
    }
}
