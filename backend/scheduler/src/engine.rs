use std::collections::HashSet;
use std::sync::Arc;

use ackwatch_core::{EngineMessage, Ledger, MemberId, Platform, Removal};
use ackwatch_logging::{EscalationEvent, EventLogger};
use tokio::sync::mpsc;
use tracing::info;

use crate::dispatch::Dispatcher;
use crate::notice;
use crate::settings::EngineSettings;
use crate::suspension::SuspensionTier;

/// Owns the ledger and every piece of escalation state. Only the scheduler's
/// task holds it, so all mutation is serialised through `&mut self`.
pub struct Engine {
    pub(crate) ledger: Ledger,
    pub(crate) platform: Arc<dyn Platform>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) settings: EngineSettings,
    pub(crate) suspensions: Option<SuspensionTier>,
    /// Members who got an immediate resolved notice since the last sweep; the
    /// batched notice skips them.
    pub(crate) resolved_since_sweep: HashSet<MemberId>,
    pub(crate) engine_tx: mpsc::Sender<EngineMessage>,
}

impl Engine {
    pub fn new(
        settings: EngineSettings,
        platform: Arc<dyn Platform>,
        engine_tx: mpsc::Sender<EngineMessage>,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            Arc::clone(&platform),
            settings.staff_channel,
            settings.call_timeout,
        );
        let suspensions = settings
            .suspension
            .map(|duration| SuspensionTier::new(duration, settings.threshold));
        Self {
            ledger: Ledger::new(settings.threshold),
            platform,
            dispatcher,
            settings,
            suspensions,
            resolved_since_sweep: HashSet::new(),
            engine_tx,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn suspensions(&self) -> Option<&SuspensionTier> {
        self.suspensions.as_ref()
    }

    /// A lift task finished; drop its record if it is still the current one.
    pub fn suspension_lifted(&mut self, member: MemberId, generation: u64, lifted: bool) {
        if let Some(tier) = self.suspensions.as_mut() {
            tier.lifted(member, generation, lifted);
        }
    }

    /// Lift a member's suspension now instead of waiting for the timer.
    pub async fn cancel_suspension(&mut self, member: MemberId) -> bool {
        let platform = Arc::clone(&self.platform);
        let timeout = self.settings.call_timeout;
        match self.suspensions.as_mut() {
            Some(tier) => tier.cancel(member, platform.as_ref(), timeout).await,
            None => false,
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(tier) = self.suspensions.as_mut() {
            tier.shutdown();
        }
        info!(stats = ?self.ledger.stats(), "Engine stopped");
    }

    /// Tell the staff channel which notified members lost their pending alert
    /// because the announcement went away.
    pub(crate) async fn report_removal(&self, removal: &Removal, sweep_id: Option<&str>) {
        let members = removal.notified_members();
        let Some(id) = removal
            .announcement
            .as_ref()
            .map(|a| a.id)
            .or_else(|| removal.purged.first().map(|(key, _)| key.announcement))
        else {
            return;
        };
        EventLogger::log_event(
            sweep_id,
            EscalationEvent::AnnouncementDeleted {
                announcement: id.get(),
                notified_members: members.iter().map(|m| m.get()).collect(),
            },
        );
        if members.is_empty() {
            return;
        }
        self.dispatcher
            .staff(&notice::deletion(id, &members), sweep_id)
            .await;
    }
}
