use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

const REDACTED: &str = "[REDACTED]";

/// Format a secret value, respecting the show_secrets flag.
pub fn format_secret(secret: &SecretString, show_secrets: bool) -> String {
    if show_secrets {
        secret.expose_secret().to_string()
    } else {
        REDACTED.to_string()
    }
}

/// Format an optional secret value.
pub fn format_optional_secret(secret: Option<&SecretString>, show_secrets: bool) -> String {
    match secret {
        Some(s) => format_secret(s, show_secrets),
        None => "(not set)".to_string(),
    }
}

/// Format a header value for diagnostics. Values marked sensitive are
/// redacted unless show_secrets is set.
pub fn format_header_value(value: &HeaderValue, show_secrets: bool) -> String {
    if value.is_sensitive() && !show_secrets {
        return REDACTED.to_string();
    }
    match value.to_str() {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
    }
}
