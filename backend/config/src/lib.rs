//! `ackwatch-config`: runtime configuration for the acknowledgment watcher.
//!
//! Provides:
//! - Typed config schema with defaults
//! - Environment loading (`from_env`, or `from_vars` for tests)
//! - Validation with fatal errors and non-fatal warnings
//! - Token redaction for safe logging/display

pub mod defaults;
pub mod env;
pub mod redact;
pub mod schema;
pub mod validation;

pub use redact::redact_token;
pub use schema::AckwatchConfig;
pub use validation::{validate, ConfigError, ValidationReport};
