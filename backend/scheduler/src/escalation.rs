//! Escalation Engine: the periodic sweep over members × tracked announcements.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use ackwatch_core::{AckKey, Announcement, AnnouncementId, MemberId, SpaceId};
use ackwatch_logging::{EscalationEvent, EventLogger};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calls::bounded;
use crate::engine::Engine;
use crate::notice;

const SUSPENSION_REASON: &str = "Repeatedly missed announcement acknowledgments";

/// What one sweep did. Returned for logging and tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SweepReport {
    pub sweep_id: String,
    /// True when the sweep returned before evaluating anyone.
    pub skipped: bool,
    pub members: usize,
    /// Members who were sent a reminder (whether or not delivery succeeded).
    pub reminded: Vec<MemberId>,
    /// Pairs that crossed the threshold and were included in the moderator alert.
    pub escalated: Vec<AckKey>,
    /// Members reported in the batched resolution notice.
    pub resolved: Vec<MemberId>,
    /// Announcements whose acknowledgment set could not be re-fetched.
    pub dropped: Vec<AnnouncementId>,
    pub suspended: Vec<MemberId>,
}

impl Engine {
    /// Run one escalation sweep.
    pub async fn sweep(&mut self) -> SweepReport {
        let sweep_id = Uuid::new_v4().to_string();
        let mut report = SweepReport {
            sweep_id: sweep_id.clone(),
            ..Default::default()
        };

        if self.ledger.store.is_empty() {
            debug!(sweep_id = %sweep_id, "No tracked announcements, sweep skipped");
            report.skipped = true;
            return report;
        }

        let announcements = self.ledger.store.snapshot();
        let Some(space) = announcements.iter().find_map(|a| a.space_id) else {
            warn!(sweep_id = %sweep_id, "Tracked announcements carry no space id, sweep skipped");
            report.skipped = true;
            return report;
        };

        // Fresh every sweep so joins and departures are picked up.
        let members: Vec<_> = match bounded(
            self.settings.call_timeout,
            "fetch_members",
            self.platform.fetch_members(space),
        )
        .await
        {
            Ok(members) => members.into_iter().filter(|m| !m.bot).collect(),
            Err(e) => {
                warn!(sweep_id = %sweep_id, %space, error = %e, "Could not resolve member population, sweep skipped");
                report.skipped = true;
                return report;
            }
        };
        report.members = members.len();

        let mut live: Vec<(Announcement, HashSet<MemberId>)> = Vec::with_capacity(announcements.len());
        for announcement in announcements {
            match bounded(
                self.settings.call_timeout,
                "fetch_acknowledgers",
                self.platform
                    .fetch_acknowledgers(&announcement, &self.settings.marker),
            )
            .await
            {
                Ok(acknowledgers) => live.push((announcement, acknowledgers)),
                Err(e) => {
                    warn!(
                        sweep_id = %sweep_id,
                        announcement = %announcement.id,
                        error = %e,
                        "Acknowledgment re-fetch failed, treating announcement as deleted"
                    );
                    let removal = self.ledger.drop_announcement(announcement.id);
                    self.report_removal(&removal, Some(&sweep_id)).await;
                    report.dropped.push(announcement.id);
                }
            }
        }

        let mut escalations: BTreeMap<MemberId, Vec<Announcement>> = BTreeMap::new();
        let mut resolution_candidates: BTreeSet<MemberId> = BTreeSet::new();
        let mut to_suspend = Vec::new();

        for member in &members {
            let mut pending: Vec<Announcement> = Vec::new();

            for (announcement, acknowledgers) in &live {
                if !self.ledger.store.contains(announcement.id) {
                    continue;
                }
                let key = AckKey::new(member.id, announcement.id);

                if acknowledgers.contains(&member.id) {
                    if let Some(previous) = self.ledger.tracker.clear(key) {
                        if previous.moderator_notified {
                            resolution_candidates.insert(member.id);
                        }
                    }
                    continue;
                }

                let outcome = self.ledger.tracker.record_miss(key);
                pending.push(announcement.clone());
                if outcome.just_crossed && self.ledger.tracker.mark_notified(key) {
                    escalations
                        .entry(member.id)
                        .or_default()
                        .push(announcement.clone());
                    report.escalated.push(key);
                }
            }

            if let Some(tier) = self.suspensions.as_mut() {
                if tier.observe(member.id, !pending.is_empty()) {
                    to_suspend.push(member.id);
                }
            }

            if !pending.is_empty() {
                let text = notice::reminder(member.id, &pending, &self.settings.marker);
                self.dispatcher.direct(member.id, &text, Some(&sweep_id)).await;
                EventLogger::log_event(
                    Some(&sweep_id),
                    EscalationEvent::ReminderSent {
                        member: member.id.get(),
                        announcements: pending.iter().map(|a| a.id.get()).collect(),
                    },
                );
                report.reminded.push(member.id);
            }
        }

        if !escalations.is_empty() {
            let text = notice::moderator_alert(self.settings.moderator, &escalations);
            if self.dispatcher.staff(&text, Some(&sweep_id)).await {
                info!(sweep_id = %sweep_id, members = escalations.len(), "Moderator notification sent");
            }
            for (member, announcements) in &escalations {
                EventLogger::log_event(
                    Some(&sweep_id),
                    EscalationEvent::ModeratorAlerted {
                        member: member.get(),
                        announcements: announcements.iter().map(|a| a.id.get()).collect(),
                    },
                );
            }
        }

        report.resolved = self.resolve_members(resolution_candidates, &sweep_id).await;

        for member in to_suspend {
            if self.suspend(member, space, &sweep_id).await {
                report.suspended.push(member);
            }
        }

        self.resolved_since_sweep.clear();
        info!(
            sweep_id = %sweep_id,
            members = report.members,
            reminded = report.reminded.len(),
            escalated = report.escalated.len(),
            resolved = report.resolved.len(),
            stats = ?self.ledger.stats(),
            "Escalation sweep finished"
        );
        report
    }

    /// Members whose flagged pair was acknowledged during this sweep are
    /// resolved once nothing they still owe has a miss recorded. Members already
    /// announced by the immediate event path are left out.
    async fn resolve_members(
        &mut self,
        candidates: BTreeSet<MemberId>,
        sweep_id: &str,
    ) -> Vec<MemberId> {
        let mut resolved = Vec::new();
        for member in candidates {
            if self.resolved_since_sweep.contains(&member) {
                debug!(%member, "Already announced as resolved, skipping batched notice");
                continue;
            }
            let outstanding = self
                .ledger
                .tracker
                .entries_for_member(member)
                .iter()
                .any(|(_, status)| status.missed_count > 0);
            if outstanding {
                continue;
            }
            self.ledger.tracker.purge_by_member(member);
            EventLogger::log_event(
                Some(sweep_id),
                EscalationEvent::Resolved {
                    member: member.get(),
                    batched: true,
                },
            );
            resolved.push(member);
        }

        if !resolved.is_empty() {
            self.dispatcher
                .staff(&notice::resolution_batch(&resolved), Some(sweep_id))
                .await;
        }
        resolved
    }

    async fn suspend(&mut self, member: MemberId, space: SpaceId, sweep_id: &str) -> bool {
        let platform = Arc::clone(&self.platform);
        let engine_tx = self.engine_tx.clone();
        let timeout = self.settings.call_timeout;
        let Some(tier) = self.suspensions.as_mut() else {
            return false;
        };
        let duration = tier.duration();

        if let Err(e) = bounded(
            timeout,
            "suspend_member",
            platform.suspend_member(space, member, duration, SUSPENSION_REASON),
        )
        .await
        {
            warn!(sweep_id = %sweep_id, %member, error = %e, "Suspension failed");
            return false;
        }

        let until = tier.schedule_lift(member, space, platform, timeout, engine_tx);
        info!(sweep_id = %sweep_id, %member, %until, "Member suspended");
        EventLogger::log_event(
            Some(sweep_id),
            EscalationEvent::Suspended {
                member: member.get(),
                until,
            },
        );
        self.dispatcher
            .staff(&notice::suspended(member, duration, until), Some(sweep_id))
            .await;
        true
    }
}
