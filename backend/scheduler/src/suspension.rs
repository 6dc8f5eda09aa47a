//! Per-member suspension tier layered over per-pair tracking.
//!
//! A member's streak counts consecutive sweeps in which they left at least one
//! announcement unacknowledged. Reaching the threshold suspends them for the
//! configured duration and schedules a cancellable lift task keyed by member.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ackwatch_core::{EngineMessage, MemberId, Platform, SpaceId};
use ackwatch_logging::{EscalationEvent, EventLogger};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::calls::bounded;

#[derive(Debug)]
pub struct Suspension {
    pub space: SpaceId,
    pub until: DateTime<Utc>,
    /// Bumped on every suspension; lift reports from older ones are stale.
    pub generation: u64,
    lift: AbortHandle,
}

pub struct SuspensionTier {
    duration: Duration,
    threshold: u32,
    streaks: HashMap<MemberId, u32>,
    active: HashMap<MemberId, Suspension>,
    next_generation: u64,
}

impl SuspensionTier {
    pub fn new(duration: Duration, threshold: u32) -> Self {
        Self {
            duration,
            threshold: threshold.max(1),
            streaks: HashMap::new(),
            active: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Record one sweep's outcome for a member. Returns true when the streak
    /// reached the threshold; the streak is reset in that case.
    pub fn observe(&mut self, member: MemberId, missed_any: bool) -> bool {
        if !missed_any {
            self.streaks.remove(&member);
            return false;
        }
        let streak = self.streaks.entry(member).or_insert(0);
        *streak += 1;
        debug!(%member, streak = *streak, "Suspension streak");
        if *streak >= self.threshold {
            self.streaks.remove(&member);
            true
        } else {
            false
        }
    }

    pub fn streak(&self, member: MemberId) -> u32 {
        self.streaks.get(&member).copied().unwrap_or(0)
    }

    pub fn get(&self, member: MemberId) -> Option<&Suspension> {
        self.active.get(&member)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Store a suspension and spawn its lift task, replacing any earlier one.
    pub fn schedule_lift(
        &mut self,
        member: MemberId,
        space: SpaceId,
        platform: Arc<dyn Platform>,
        call_timeout: Duration,
        engine_tx: mpsc::Sender<EngineMessage>,
    ) -> DateTime<Utc> {
        let duration = self.duration;
        self.next_generation += 1;
        let generation = self.next_generation;
        let until = Utc::now()
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());

        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let lifted = match bounded(
                call_timeout,
                "lift_suspension",
                platform.lift_suspension(space, member),
            )
            .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!(%member, error = %e, "Scheduled suspension lift failed");
                    false
                }
            };
            let _ = engine_tx
                .send(EngineMessage::SuspensionLifted {
                    member,
                    generation,
                    lifted,
                })
                .await;
        });

        let previous = self.active.insert(
            member,
            Suspension {
                space,
                until,
                generation,
                lift: task.abort_handle(),
            },
        );
        if let Some(previous) = previous {
            previous.lift.abort();
            debug!(%member, "Replaced pending suspension lift");
        }
        until
    }

    /// The lift task reported back; forget the record unless a newer
    /// suspension has replaced it since.
    pub fn lifted(&mut self, member: MemberId, generation: u64, lifted: bool) {
        let current = self.active.get(&member).map(|s| s.generation);
        if current != Some(generation) {
            debug!(%member, generation, ?current, "Stale lift report ignored");
            return;
        }
        self.active.remove(&member);
        info!(%member, lifted, "Suspension ended");
        EventLogger::log_event(None, EscalationEvent::SuspensionLifted { member: member.get() });
    }

    /// Abort the pending lift and lift right away. Returns false if the member
    /// was not suspended.
    pub async fn cancel(
        &mut self,
        member: MemberId,
        platform: &dyn Platform,
        call_timeout: Duration,
    ) -> bool {
        let Some(suspension) = self.active.remove(&member) else {
            return false;
        };
        suspension.lift.abort();
        if let Err(e) = bounded(
            call_timeout,
            "lift_suspension",
            platform.lift_suspension(suspension.space, member),
        )
        .await
        {
            warn!(%member, error = %e, "Early suspension lift failed");
        }
        info!(%member, "Suspension cancelled early");
        true
    }

    /// Abort every pending lift task. Suspensions themselves expire on the platform.
    pub fn shutdown(&mut self) {
        for (member, suspension) in self.active.drain() {
            suspension.lift.abort();
            debug!(%member, "Pending suspension lift aborted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;

    #[test]
    fn streak_reaches_threshold_then_resets() {
        let mut tier = SuspensionTier::new(Duration::from_secs(60), 3);
        let m = MemberId(1);
        assert!(!tier.observe(m, true));
        assert!(!tier.observe(m, true));
        assert!(tier.observe(m, true));
        assert_eq!(tier.streak(m), 0);
        assert!(!tier.observe(m, true));
        assert_eq!(tier.streak(m), 1);
    }

    #[test]
    fn clean_sweep_resets_streak() {
        let mut tier = SuspensionTier::new(Duration::from_secs(60), 2);
        let m = MemberId(1);
        tier.observe(m, true);
        tier.observe(m, false);
        assert_eq!(tier.streak(m), 0);
        assert!(!tier.observe(m, true));
    }

    #[tokio::test(start_paused = true)]
    async fn lift_fires_after_duration_and_reports_back() {
        let platform = Arc::new(FakePlatform::new());
        let (tx, mut rx) = mpsc::channel(4);
        let mut tier = SuspensionTier::new(Duration::from_secs(600), 1);

        tier.schedule_lift(MemberId(5), SpaceId(9), platform.clone(), Duration::from_secs(5), tx);
        assert!(tier.get(MemberId(5)).is_some());

        let generation = tier.get(MemberId(5)).unwrap().generation;
        let msg = rx.recv().await.unwrap();
        assert_eq!(
            msg,
            EngineMessage::SuspensionLifted {
                member: MemberId(5),
                generation,
                lifted: true
            }
        );
        assert_eq!(platform.lifted(), vec![MemberId(5)]);

        tier.lifted(MemberId(5), generation, true);
        assert_eq!(tier.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_aborts_pending_lift() {
        let platform = Arc::new(FakePlatform::new());
        let (tx, mut rx) = mpsc::channel(4);
        let mut tier = SuspensionTier::new(Duration::from_secs(600), 1);
        tier.schedule_lift(MemberId(5), SpaceId(9), platform.clone(), Duration::from_secs(5), tx);

        assert!(tier.cancel(MemberId(5), platform.as_ref(), Duration::from_secs(5)).await);
        assert!(!tier.cancel(MemberId(5), platform.as_ref(), Duration::from_secs(5)).await);

        tokio::time::sleep(Duration::from_secs(1200)).await;
        assert!(rx.try_recv().is_err(), "aborted task must not report");
        assert_eq!(platform.lifted(), vec![MemberId(5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_previous_lift() {
        let platform = Arc::new(FakePlatform::new());
        let (tx, mut rx) = mpsc::channel(4);
        let mut tier = SuspensionTier::new(Duration::from_secs(600), 1);
        tier.schedule_lift(MemberId(5), SpaceId(9), platform.clone(), Duration::from_secs(5), tx.clone());
        tier.schedule_lift(MemberId(5), SpaceId(9), platform.clone(), Duration::from_secs(5), tx);

        rx.recv().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1200)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(platform.lifted().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_lift_report_keeps_newer_suspension() {
        let platform = Arc::new(FakePlatform::new());
        let (tx, mut rx) = mpsc::channel(4);
        let mut tier = SuspensionTier::new(Duration::from_secs(600), 1);

        tier.schedule_lift(MemberId(5), SpaceId(9), platform.clone(), Duration::from_secs(5), tx.clone());
        let first = tier.get(MemberId(5)).unwrap().generation;
        // The first lift already reported before the member was suspended again.
        let EngineMessage::SuspensionLifted { generation, .. } = rx.recv().await.unwrap() else {
            panic!("expected a lift report");
        };
        assert_eq!(generation, first);
        tier.schedule_lift(MemberId(5), SpaceId(9), platform.clone(), Duration::from_secs(5), tx);
        let second = tier.get(MemberId(5)).unwrap().generation;
        assert_ne!(first, second);

        tier.lifted(MemberId(5), first, true);
        assert_eq!(tier.get(MemberId(5)).map(|s| s.generation), Some(second));

        // The live record still reaches its task.
        assert!(tier.cancel(MemberId(5), platform.as_ref(), Duration::from_secs(5)).await);
        tokio::time::sleep(Duration::from_secs(1200)).await;
        assert!(rx.try_recv().is_err(), "replacement task was aborted by cancel");
    }
}
