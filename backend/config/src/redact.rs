//! Config redaction: mask the bot token before it reaches logs or stdout.

/// Keep the first four characters and mask the rest.
pub fn redact_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 8 {
        "***".to_string()
    } else {
        format!("{visible}***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_long_tokens() {
        assert_eq!(redact_token("MTA1MjM0.GaBcDe.secretsecret"), "MTA1***");
    }

    #[test]
    fn hides_short_tokens_entirely() {
        assert_eq!(redact_token("abc"), "***");
        assert_eq!(redact_token(""), "***");
    }
}
