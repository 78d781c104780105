//! # Text Processing Utilities
//!
//! Redaction helpers used before credentials can reach a log line or the
//! terminal.

use once_cell::sync::Lazy;
use regex::Regex;

const REDACTED: &str = "[REDACTED]";
const MASK_VISIBLE_CHARS: usize = 4;
const MASK_MIN_LENGTH: usize = 8;

/// Redacts values that look like secrets in a string.
///
/// Header values (`Authorization`, `CF-Access-Client-Secret`), bare bearer
/// tokens and `NAME=value` pairs whose name ends in KEY, TOKEN, SECRET or
/// PASSWORD are replaced with `[REDACTED]`. The name or header prefix is kept
/// so the redacted line still says what was hidden.
///
/// # Example
/// ```rust
/// use strata_util::redact_sensitive;
///
/// let redacted = redact_sensitive("STRATA_MCP_TOKEN=abc123 mode=hold");
/// assert_eq!(redacted, "STRATA_MCP_TOKEN=[REDACTED] mode=hold");
///
/// let redacted = redact_sensitive("Authorization: Bearer secret123");
/// assert_eq!(redacted, "Authorization: Bearer [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REDACTED}")
            })
            .to_string();
    }
    redacted
}

/// Shortens a credential for display, keeping only a recognizable prefix.
///
/// Empty values render as `(not set)`; short values are fully masked.
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return "(not set)".to_string();
    }
    if value.chars().count() <= MASK_MIN_LENGTH {
        return "********".to_string();
    }
    let visible: String = value.chars().take(MASK_VISIBLE_CHARS).collect();
    format!("{visible}...")
}

fn redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

/// Ordered list of patterns; each captures the prefix to keep in group 1.
fn build_redact_patterns() -> Vec<Regex> {
    [
        r"(?i)(authorization:\s*(?:bearer\s+)?)([^\s,]+)",
        r"(?i)(cf-access-client-secret:\s*)([^\s,]+)",
        r"(?i)(bearer\s+)([A-Za-z0-9\-\._~\+/]+=*)",
        r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_authorization_header_value() {
        assert_eq!(
            redact_sensitive("authorization: Bearer eyJhbGciOi.x.y"),
            "authorization: Bearer [REDACTED]"
        );
    }

    #[test]
    fn redacts_access_secret_header() {
        assert_eq!(
            redact_sensitive("CF-Access-Client-Secret: c7dcf2a0af2add1c"),
            "CF-Access-Client-Secret: [REDACTED]"
        );
    }

    #[test]
    fn redacts_environment_style_pairs() {
        assert_eq!(
            redact_sensitive("STRATA_CF_CLIENT_SECRET=abc STRATA_SETTINGS_PATH=/tmp/x"),
            "STRATA_CF_CLIENT_SECRET=[REDACTED] STRATA_SETTINGS_PATH=/tmp/x"
        );
    }

    #[test]
    fn leaves_plain_text_alone() {
        let text = "Connected! Found 3 tools available.";
        assert_eq!(redact_sensitive(text), text);
    }

    #[test]
    fn mask_secret_keeps_short_prefix() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("short"), "********");
        assert_eq!(mask_secret("8ddb218662ab334a.access"), "8ddb...");
    }
}
