//! Environment loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::defaults;
use crate::schema::AckwatchConfig;
use crate::validation::ConfigError;

impl AckwatchConfig {
    /// Load configuration from the process environment, on top of `./.env`
    /// when that file exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(Path::new(DOTENV_FILE))
    }

    /// Like [`AckwatchConfig::from_env`] with an explicit dotenv path. Process
    /// variables win over file entries.
    pub fn from_env_with(dotenv_path: &Path) -> Result<Self, ConfigError> {
        let mut vars = load_dotenv(dotenv_path)?;
        vars.extend(std::env::vars());
        Self::from_vars(&vars)
    }

    /// Load configuration from a variable map (useful for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        let discord_token = lookup("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let announcement_channel_id = required_id(&lookup, "ANNOUNCEMENT_CHANNEL_ID")?;
        let staff_channel_id = required_id(&lookup, "GENERAL_CHANNEL_ID")?;
        let moderator_id = required_id(&lookup, "MODERATOR_ID")?;

        let checkmark = lookup("CHECKMARK").unwrap_or_else(|| defaults::CHECKMARK.to_string());

        let reminder_interval = positive_millis(
            &lookup,
            "REMINDER_INTERVAL",
            defaults::REMINDER_INTERVAL_MS,
        )?;
        let reconcile_interval = positive_millis(
            &lookup,
            "RECONCILE_INTERVAL",
            defaults::RECONCILE_INTERVAL_MS,
        )?;
        let call_timeout = positive_millis(&lookup, "CALL_TIMEOUT", defaults::CALL_TIMEOUT_MS)?;

        let max_missed_checkins: u32 = parse_or(
            &lookup,
            "MAX_MISSED_CHECKINS",
            defaults::MAX_MISSED_CHECKINS,
        )?;
        if max_missed_checkins == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_MISSED_CHECKINS",
                reason: "must be at least 1".into(),
            });
        }

        let suspension_ms: u64 = parse_or(
            &lookup,
            "SUSPENSION_DURATION",
            defaults::SUSPENSION_DURATION_MS,
        )?;
        let suspension_duration = match suspension_ms {
            0 => None,
            ms if ms > defaults::MAX_SUSPENSION_MS => {
                warn!(
                    requested_ms = ms,
                    max_ms = defaults::MAX_SUSPENSION_MS,
                    "SUSPENSION_DURATION above platform maximum, clamping"
                );
                Some(Duration::from_millis(defaults::MAX_SUSPENSION_MS))
            }
            ms => Some(Duration::from_millis(ms)),
        };

        Ok(Self {
            discord_token,
            announcement_channel_id,
            staff_channel_id,
            moderator_id,
            checkmark,
            reminder_interval,
            reconcile_interval,
            max_missed_checkins,
            suspension_duration,
            call_timeout,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| defaults::LOG_LEVEL.to_string()),
            log_dir: lookup("LOG_DIR").map(PathBuf::from),
        })
    }
}

const DOTENV_FILE: &str = ".env";

/// Entries of a dotenv file. A missing file is not an error.
fn load_dotenv(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let invalid = |e: dotenvy::Error| ConfigError::Invalid {
        var: "DOTENV",
        reason: format!("{}: {e}", path.display()),
    };
    match dotenvy::from_path_iter(path) {
        Ok(entries) => {
            let vars = entries.collect::<Result<HashMap<_, _>, _>>().map_err(invalid)?;
            debug!(path = %path.display(), entries = vars.len(), "Loaded dotenv file");
            Ok(vars)
        }
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(invalid(e)),
    }
}

fn required_id(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<u64, ConfigError> {
    let raw = lookup(var).ok_or(ConfigError::Missing(var))?;
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            reason: "id must be non-zero".into(),
        }),
        Ok(id) => Ok(id),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: format!("{raw:?} is not a numeric id ({e})"),
        }),
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}

fn positive_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let ms: u64 = parse_or(lookup, var, default)?;
    if ms == 0 {
        return Err(ConfigError::Invalid {
            var,
            reason: "interval must be greater than zero".into(),
        });
    }
    Ok(Duration::from_millis(ms))
}
