//! Notification Dispatcher: a stateless sink for reminders and staff notices.

use std::sync::Arc;
use std::time::Duration;

use ackwatch_core::{ChannelId, MemberId, Platform};
use ackwatch_logging::{EscalationEvent, EventLogger};
use tracing::{debug, warn};

use crate::calls::bounded;

/// Sends text and reports whether it got through. Delivery failures are logged
/// and never retried; tracking state does not depend on the outcome.
#[derive(Clone)]
pub struct Dispatcher {
    platform: Arc<dyn Platform>,
    staff_channel: ChannelId,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(platform: Arc<dyn Platform>, staff_channel: ChannelId, call_timeout: Duration) -> Self {
        Self {
            platform,
            staff_channel,
            call_timeout,
        }
    }

    pub async fn direct(&self, member: MemberId, text: &str, sweep_id: Option<&str>) -> bool {
        let sent = bounded(
            self.call_timeout,
            "send_direct",
            self.platform.send_direct(member, text),
        )
        .await;
        match sent {
            Ok(()) => {
                debug!(%member, "Direct message sent");
                true
            }
            Err(e) => {
                warn!(%member, error = %e, "Could not send direct message");
                EventLogger::log_event(
                    sweep_id,
                    EscalationEvent::DeliveryFailed {
                        target: format!("member {member}"),
                        error_msg: e.to_string(),
                    },
                );
                false
            }
        }
    }

    pub async fn staff(&self, text: &str, sweep_id: Option<&str>) -> bool {
        let sent = bounded(
            self.call_timeout,
            "send_to_channel",
            self.platform.send_to_channel(self.staff_channel, text),
        )
        .await;
        match sent {
            Ok(()) => true,
            Err(e) => {
                warn!(channel = %self.staff_channel, error = %e, "Could not post to staff channel");
                EventLogger::log_event(
                    sweep_id,
                    EscalationEvent::DeliveryFailed {
                        target: format!("channel {}", self.staff_channel),
                        error_msg: e.to_string(),
                    },
                );
                false
            }
        }
    }
}
