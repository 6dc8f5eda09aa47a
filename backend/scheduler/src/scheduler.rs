use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use ackwatch_core::EngineMessage;

use crate::engine::Engine;

/// Drives the engine: one timer for escalation sweeps, an independent one for
/// reconciliation, and platform events in between. Everything runs on this one
/// task, so handlers never overlap.
pub struct Scheduler {
    engine: Engine,
}

impl Scheduler {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn name(&self) -> &str {
        "scheduler"
    }

    pub async fn start(mut self, mut rx: mpsc::Receiver<EngineMessage>) -> Result<Engine> {
        let sweep_every = self.engine.settings().sweep_interval;
        let reconcile_every = self.engine.settings().reconcile_interval;
        info!(
            sweep_secs = sweep_every.as_secs(),
            reconcile_secs = reconcile_every.as_secs(),
            "Scheduler started"
        );

        // First ticks one period out: the startup reconciliation runs on Ready.
        let mut sweep_ticker = time::interval_at(Instant::now() + sweep_every, sweep_every);
        sweep_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reconcile_ticker =
            time::interval_at(Instant::now() + reconcile_every, reconcile_every);
        reconcile_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = sweep_ticker.tick() => {
                    self.engine.sweep().await;
                }
                _ = reconcile_ticker.tick() => {
                    if let Err(e) = self.engine.reconcile().await {
                        warn!(error = %e, "Reconciliation failed, will retry next interval");
                    }
                }
                msg = rx.recv() => {
                    match msg {
                        Some(EngineMessage::Platform(event)) => {
                            self.engine.handle_event(event).await;
                        }
                        Some(EngineMessage::SuspensionLifted { member, generation, lifted }) => {
                            self.engine.suspension_lifted(member, generation, lifted);
                        }
                        Some(EngineMessage::Shutdown) => {
                            info!("Shutdown requested");
                            break;
                        }
                        None => {
                            debug!("Engine channel closed");
                            break;
                        }
                    }
                }
            }
        }

        self.engine.shutdown();
        info!("Scheduler stopped");
        Ok(self.engine)
    }
}
