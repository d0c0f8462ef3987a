use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::SecretString;
use upsql::api::{ApiRequest, AuthFiller, TokenFiller};
use upsql::masking::{format_header_value, format_optional_secret, format_secret};

#[test]
fn test_secret_masked_by_default() {
    let secret = SecretString::from("my-super-secret-password".to_string());
    let output = format_secret(&secret, false);
    assert_eq!(output, "[REDACTED]");
    assert!(!output.contains("my-super-secret-password"));
}

#[test]
fn test_secret_exposed_with_show_secrets() {
    let secret = SecretString::from("my-super-secret-password".to_string());
    let output = format_secret(&secret, true);
    assert_eq!(output, "my-super-secret-password");
}

#[test]
fn test_secret_debug_is_redacted() {
    let secret = SecretString::from("password123".to_string());
    let debug_output = format!("{:?}", secret);
    assert!(!debug_output.contains("password123"), "Debug should not expose secret: {}", debug_output);
}

#[test]
fn test_optional_secret_none() {
    let output = format_optional_secret(None, false);
    assert_eq!(output, "(not set)");
}

#[test]
fn test_optional_secret_some_masked() {
    let secret = SecretString::from("token123".to_string());
    let output = format_optional_secret(Some(&secret), false);
    assert_eq!(output, "[REDACTED]");
}

#[test]
fn test_optional_secret_some_exposed() {
    let secret = SecretString::from("token123".to_string());
    let output = format_optional_secret(Some(&secret), true);
    assert_eq!(output, "token123");
}

#[test]
fn test_sensitive_header_masked_by_default() {
    let mut value = HeaderValue::from_static("token123");
    value.set_sensitive(true);
    assert_eq!(format_header_value(&value, false), "[REDACTED]");
    assert_eq!(format_header_value(&value, true), "token123");
}

#[test]
fn test_plain_header_shown() {
    let value = HeaderValue::from_static("application/json");
    assert_eq!(format_header_value(&value, false), "application/json");
}

#[test]
fn test_filled_credentials_are_masked() {
    let filler = TokenFiller::new(&SecretString::from("token123".to_string())).unwrap();
    let filled = filler.fill(&ApiRequest::new(Method::GET, "http://localhost/users"));
    let shown = format_header_value(&filled.headers[AUTHORIZATION], false);
    assert!(!shown.contains("token123"), "Got: {}", shown);
}
