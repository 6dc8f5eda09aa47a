//! Structured logging for ackwatch.
//!
//! Console and rolling NDJSON output, secret redaction, and the escalation event log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EscalationEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
