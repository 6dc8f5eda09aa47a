//! Default values applied when optional variables are unset.

pub const CHECKMARK: &str = "✅";
/// Four hours.
pub const REMINDER_INTERVAL_MS: u64 = 14_400_000;
/// Fifteen minutes.
pub const RECONCILE_INTERVAL_MS: u64 = 900_000;
pub const MAX_MISSED_CHECKINS: u32 = 2;
/// Zero disables the suspension tier.
pub const SUSPENSION_DURATION_MS: u64 = 0;
pub const CALL_TIMEOUT_MS: u64 = 15_000;
pub const LOG_LEVEL: &str = "info";

/// Longest timeout the platform accepts (28 days).
pub const MAX_SUSPENSION_MS: u64 = 28 * 24 * 60 * 60 * 1000;
