use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the ackwatch runtime.
#[derive(Debug, Error)]
pub enum AckError {
    /// A fetch against the platform failed: the target vanished or the network hiccuped.
    #[error("fetch failed ({what}): {reason}")]
    TransientFetch { what: String, reason: String },

    /// A direct message or channel post could not be delivered.
    #[error("delivery failed ({target}): {reason}")]
    Delivery { target: String, reason: String },

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AckError {
    pub fn fetch(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::TransientFetch {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn delivery(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::Delivery {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Fetch failures and timeouts are isolated per item and never abort a sweep.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFetch { .. } | Self::Timeout { .. })
    }
}

pub type AckResult<T> = Result<T, AckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert!(AckError::fetch("message 1", "unknown message").is_transient());
        assert!(AckError::Timeout {
            operation: "fetch_members".into(),
            after: Duration::from_secs(1),
        }
        .is_transient());
        assert!(!AckError::delivery("member 7", "cannot send to this user").is_transient());
    }

    #[test]
    fn display_includes_context() {
        let err = AckError::fetch("acknowledgers of 42", "404 Not Found");
        assert_eq!(err.to_string(), "fetch failed (acknowledgers of 42): 404 Not Found");
    }
}
