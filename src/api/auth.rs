//! Token issuance and API base-URL discovery.
//!
//! Both run against the authentication endpoint, which may differ from the
//! endpoint that executes queries.

use crate::api::auth_filler::{CredentialsFiller, TokenFiller};
use crate::api::requester::Requester;
use crate::error::UpsqlError;
use secrecy::SecretString;
use serde_json::{Value, json};

pub const DEFAULT_AUTH_URL: &str = "https://api.upsolver.com";
const TOKEN_DISPLAY_NAME: &str = "upsql";

/// What a successful login yields: a token and the URL to use it against.
#[derive(Debug)]
pub struct AuthSettings {
    pub token: SecretString,
    pub base_url: String,
}

/// Verify the credentials and issue a new API token for them.
pub async fn authenticate(
    auth_url: &str,
    email: &str,
    password: &SecretString,
    verbose: bool,
    show_secrets: bool,
) -> Result<AuthSettings, UpsqlError> {
    let requester = Requester::new(auth_url, CredentialsFiller::new(email, password)?)?
        .with_verbose(verbose, show_secrets);

    // A 403 here means the credentials were rejected.
    requester.get("/users").await?;

    let resp = requester
        .post("/api-tokens", json!({ "displayName": TOKEN_DISPLAY_NAME }))
        .await?;
    let token = match resp.at("apiToken")? {
        Value::String(t) => SecretString::from(t.clone()),
        _ => return Err(UpsqlError::payload(&resp, "apiToken is not a string")),
    };

    let base_url = discover_base_url(auth_url, &token, verbose, show_secrets).await?;
    Ok(AuthSettings { token, base_url })
}

/// Ask the authentication endpoint where queries should be sent. Falls back
/// to the authentication endpoint itself when no dedicated API host exists.
pub async fn discover_base_url(
    auth_url: &str,
    token: &SecretString,
    verbose: bool,
    show_secrets: bool,
) -> Result<String, UpsqlError> {
    let requester =
        Requester::new(auth_url, TokenFiller::new(token)?)?.with_verbose(verbose, show_secrets);

    let resp = requester.get("/environments/local-api").await?;
    match resp.get("dnsInfo.name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => Ok(normalize_url(name)),
        _ => Ok(requester.base_url().to_string()),
    }
}

/// Bare host names get an https scheme; trailing slashes are dropped.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
