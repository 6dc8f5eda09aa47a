use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::redact::redact_token;

/// ackwatch runtime configuration, read once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct AckwatchConfig {
    /// Bot token. Never serialized.
    #[serde(skip_serializing)]
    pub discord_token: String,
    /// Channel whose messages are announcements.
    pub announcement_channel_id: u64,
    /// Moderator/staff channel receiving alerts and notices.
    pub staff_channel_id: u64,
    /// Moderator mentioned at the top of alerts.
    pub moderator_id: u64,
    /// Acknowledgment marker.
    pub checkmark: String,
    #[serde(serialize_with = "as_millis")]
    pub reminder_interval: Duration,
    #[serde(serialize_with = "as_millis")]
    pub reconcile_interval: Duration,
    pub max_missed_checkins: u32,
    /// `None` disables the suspension tier.
    #[serde(serialize_with = "opt_as_millis")]
    pub suspension_duration: Option<Duration>,
    #[serde(serialize_with = "as_millis")]
    pub call_timeout: Duration,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

fn opt_as_millis<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.serialize_some(&(d.as_millis() as u64)),
        None => s.serialize_none(),
    }
}

impl fmt::Display for AckwatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "discord_token           = {}", redact_token(&self.discord_token))?;
        writeln!(f, "announcement_channel_id = {}", self.announcement_channel_id)?;
        writeln!(f, "staff_channel_id        = {}", self.staff_channel_id)?;
        writeln!(f, "moderator_id            = {}", self.moderator_id)?;
        writeln!(f, "checkmark               = {}", self.checkmark)?;
        writeln!(f, "reminder_interval       = {:?}", self.reminder_interval)?;
        writeln!(f, "reconcile_interval      = {:?}", self.reconcile_interval)?;
        writeln!(f, "max_missed_checkins     = {}", self.max_missed_checkins)?;
        match self.suspension_duration {
            Some(d) => writeln!(f, "suspension_duration     = {d:?}")?,
            None => writeln!(f, "suspension_duration     = disabled")?,
        }
        writeln!(f, "call_timeout            = {:?}", self.call_timeout)?;
        write!(f, "log_level               = {}", self.log_level)
    }
}
