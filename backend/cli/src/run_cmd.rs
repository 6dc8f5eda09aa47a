//! `ackwatch run`: wire the Discord adapter, the platform and the engine task.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use ackwatch_channels::{ChannelAdapter, DiscordAdapter, DiscordPlatform};
use ackwatch_config::{validate, AckwatchConfig};
use ackwatch_core::{AckBus, ChannelId, EngineMessage, MemberId};
use ackwatch_logging::init_logger;
use ackwatch_scheduler::{Engine, EngineSettings, Scheduler};

pub fn engine_settings(config: &AckwatchConfig) -> EngineSettings {
    EngineSettings {
        marker: config.checkmark.clone(),
        threshold: config.max_missed_checkins,
        sweep_interval: config.reminder_interval,
        reconcile_interval: config.reconcile_interval,
        suspension: config.suspension_duration,
        call_timeout: config.call_timeout,
        ..EngineSettings::new(
            ChannelId(config.announcement_channel_id),
            ChannelId(config.staff_channel_id),
            MemberId(config.moderator_id),
        )
    }
}

pub async fn run(config: AckwatchConfig) -> Result<()> {
    init_logger(config.log_dir.as_deref(), &config.log_level);
    info!(
        announcement_channel = config.announcement_channel_id,
        staff_channel = config.staff_channel_id,
        threshold = config.max_missed_checkins,
        "Starting ackwatch"
    );
    for warning in validate(&config).warnings {
        warn!("{warning}");
    }

    let mut bus = AckBus::new();
    let engine_rx = bus
        .take_engine_rx()
        .ok_or_else(|| anyhow::anyhow!("engine receiver already taken"))?;

    let platform = Arc::new(DiscordPlatform::from_token(&config.discord_token));
    let engine = Engine::new(engine_settings(&config), platform, bus.engine_tx.clone());
    let scheduler = Scheduler::new(engine);
    info!(component = scheduler.name(), "Engine task starting");
    let engine_task = tokio::spawn(scheduler.start(engine_rx));

    let adapter = Arc::new(DiscordAdapter::new(config.discord_token.clone()));
    let adapter_ref = Arc::clone(&adapter);
    let adapter_tx = bus.engine_tx.clone();
    let adapter_task = tokio::spawn(async move {
        if let Err(e) = adapter_ref.start(adapter_tx).await {
            error!(adapter = adapter_ref.name(), error = %e, "Adapter stopped with error");
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Ctrl-C received, shutting down"),
        _ = adapter_task => warn!("Discord connection ended, shutting down"),
    }

    adapter.stop().await;
    if bus.engine_tx.send(EngineMessage::Shutdown).await.is_err() {
        warn!("Engine already stopped");
    }
    match engine_task.await {
        Ok(Ok(engine)) => info!(stats = ?engine.ledger().stats(), "ackwatch stopped"),
        Ok(Err(e)) => error!(error = %e, "Engine task failed"),
        Err(e) => error!(error = %e, "Engine task panicked"),
    }
    Ok(())
}
