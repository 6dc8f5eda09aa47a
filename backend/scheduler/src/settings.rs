use std::time::Duration;

use ackwatch_core::{ChannelId, MemberId};

/// Page size for channel history and acknowledger enumeration.
pub const HISTORY_PAGE_SIZE: u8 = 100;

/// Everything the engine needs to know about its deployment.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub announcement_channel: ChannelId,
    pub staff_channel: ChannelId,
    pub moderator: MemberId,
    pub marker: String,
    pub threshold: u32,
    pub sweep_interval: Duration,
    pub reconcile_interval: Duration,
    /// `None` disables the per-member suspension tier.
    pub suspension: Option<Duration>,
    /// Upper bound on any single platform call.
    pub call_timeout: Duration,
}

impl EngineSettings {
    pub fn new(announcement_channel: ChannelId, staff_channel: ChannelId, moderator: MemberId) -> Self {
        Self {
            announcement_channel,
            staff_channel,
            moderator,
            marker: "✅".to_string(),
            threshold: 2,
            sweep_interval: Duration::from_secs(4 * 60 * 60),
            reconcile_interval: Duration::from_secs(15 * 60),
            suspension: None,
            call_timeout: Duration::from_secs(15),
        }
    }
}
