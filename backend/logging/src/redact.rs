//! Log Redaction Layer
//!
//! Scrubs bot tokens and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

/// Discord bot tokens: three dot-separated base64url segments.
static BOT_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_-]{23,28}\.[A-Za-z0-9_-]{6,7}\.[A-Za-z0-9_-]{27,}").unwrap()
});
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Bot|Bearer)\s+[A-Za-z0-9\-\._~+/]+=*").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "$1 [REDACTED_TOKEN]");
    BOT_TOKEN_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Authorization: Bot MTA1MjM0NTY3ODkwMTIzNDU2Nzg5.GaBcDe.abcdefghijklmnopqrstuvwxyz0123";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("MTA1MjM0NTY3ODkwMTIzNDU2Nzg5"));
        assert!(clean.contains("[REDACTED_TOKEN]"));
    }

    #[test]
    fn bare_token_is_redacted() {
        let raw = "token=MTA1MjM0NTY3ODkwMTIzNDU2Nzg5.GaBcDe.abcdefghijklmnopqrstuvwxyz0123 rejected";
        assert_eq!(redact_sensitive_data(raw), "token=[REDACTED_TOKEN] rejected");
    }

    #[test]
    fn plain_text_untouched() {
        let raw = "Missing Access (code 50001)";
        assert_eq!(redact_sensitive_data(raw), raw);
    }
}
