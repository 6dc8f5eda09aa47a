use ackwatch_core::EngineMessage;
use async_trait::async_trait;
use tokio::sync::mpsc;

pub mod discord;
pub mod discord_convert;
pub mod discord_platform;

pub use discord::DiscordAdapter;
pub use discord_platform::DiscordPlatform;

/// Gateway side of a platform: turns the live event stream into engine messages.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Connect and forward events until the connection ends.
    async fn start(&self, engine_tx: mpsc::Sender<EngineMessage>) -> anyhow::Result<()>;

    /// Close the connection started by [`ChannelAdapter::start`].
    async fn stop(&self) {}
}
