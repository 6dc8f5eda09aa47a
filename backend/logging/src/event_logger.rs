//! Escalation Event Logger
//!
//! State transitions worth auditing (reminders, alerts, resolutions,
//! suspensions) written as structured records under the `ackwatch_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EscalationEvent {
    ReminderSent {
        member: u64,
        announcements: Vec<u64>,
    },
    ModeratorAlerted {
        member: u64,
        announcements: Vec<u64>,
    },
    Resolved {
        member: u64,
        batched: bool,
    },
    Reopened {
        member: u64,
        announcement: u64,
    },
    AnnouncementDeleted {
        announcement: u64,
        notified_members: Vec<u64>,
    },
    Suspended {
        member: u64,
        until: DateTime<Utc>,
    },
    SuspensionLifted {
        member: u64,
    },
    DeliveryFailed {
        target: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub sweep_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub event: EscalationEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Log one escalation event. `sweep_id` ties it to the sweep that caused it.
    pub fn log_event(sweep_id: Option<&str>, mut event: EscalationEvent) {
        if let EscalationEvent::DeliveryFailed { error_msg, .. } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }

        let entry = EventLogEntry {
            sweep_id: sweep_id.map(str::to_owned),
            timestamp: Utc::now(),
            event,
        };

        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "ackwatch_events", event = %json, "Escalation event"),
            Err(_) => info!(target: "ackwatch_events", event = ?entry, "Escalation event"),
        }
    }
}
