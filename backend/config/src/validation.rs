//! Config validation: fatal errors at parse time, warnings after.

use thiserror::Error;

use crate::defaults::MAX_SUSPENSION_MS;
use crate::schema::AckwatchConfig;

/// Startup configuration failure. Fatal: the process must not start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Non-fatal findings from one validation pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Check relationships between otherwise valid settings.
pub fn validate(config: &AckwatchConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.reconcile_interval > config.reminder_interval {
        report.warn(format!(
            "RECONCILE_INTERVAL ({:?}) is longer than REMINDER_INTERVAL ({:?}); sweeps may act on deleted announcements",
            config.reconcile_interval, config.reminder_interval
        ));
    }
    if config.announcement_channel_id == config.staff_channel_id {
        report.warn("GENERAL_CHANNEL_ID equals ANNOUNCEMENT_CHANNEL_ID; alerts will be tracked as announcements");
    }
    if let Some(duration) = config.suspension_duration {
        if duration.as_millis() as u64 == MAX_SUSPENSION_MS {
            report.warn("SUSPENSION_DURATION is at the platform maximum of 28 days");
        }
    }

    report
}
