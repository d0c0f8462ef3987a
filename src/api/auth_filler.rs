//! Authentication material for outgoing requests.
//!
//! An `AuthFiller` never touches the request it is given: it returns a copy
//! with its headers merged in. Filling a request that already carries the
//! filler's header is a programming error and panics.

use crate::api::request::ApiRequest;
use crate::error::UpsqlError;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

pub const EMAIL_HEADER: HeaderName = HeaderName::from_static("x-api-email");
pub const PASSWORD_HEADER: HeaderName = HeaderName::from_static("x-api-password");
pub const TOKEN_HEADER: HeaderName = AUTHORIZATION;

pub trait AuthFiller: Send + Sync {
    fn fill(&self, request: &ApiRequest) -> ApiRequest;
}

impl<F> AuthFiller for F
where
    F: Fn(&ApiRequest) -> ApiRequest + Send + Sync,
{
    fn fill(&self, request: &ApiRequest) -> ApiRequest {
        self(request)
    }
}

/// Identifies the caller by email and password. Used only to obtain a token.
#[derive(Debug, Clone)]
pub struct CredentialsFiller {
    email: HeaderValue,
    password: HeaderValue,
}

impl CredentialsFiller {
    pub fn new(email: &str, password: &SecretString) -> Result<Self, UpsqlError> {
        Ok(Self {
            email: header_value(email, "email")?,
            password: sensitive_value(password, "password")?,
        })
    }
}

impl AuthFiller for CredentialsFiller {
    fn fill(&self, request: &ApiRequest) -> ApiRequest {
        assert!(
            !request.headers.contains_key(&EMAIL_HEADER),
            "request already carries {EMAIL_HEADER}"
        );
        assert!(
            !request.headers.contains_key(&PASSWORD_HEADER),
            "request already carries {PASSWORD_HEADER}"
        );
        let mut filled = request.clone();
        filled.headers.insert(EMAIL_HEADER, self.email.clone());
        filled.headers.insert(PASSWORD_HEADER, self.password.clone());
        filled
    }
}

/// Sends an API token with every request.
#[derive(Debug, Clone)]
pub struct TokenFiller {
    token: HeaderValue,
}

impl TokenFiller {
    pub fn new(token: &SecretString) -> Result<Self, UpsqlError> {
        Ok(Self {
            token: sensitive_value(token, "token")?,
        })
    }
}

impl AuthFiller for TokenFiller {
    fn fill(&self, request: &ApiRequest) -> ApiRequest {
        assert!(
            !request.headers.contains_key(&TOKEN_HEADER),
            "request already carries {TOKEN_HEADER}"
        );
        let mut filled = request.clone();
        filled.headers.insert(TOKEN_HEADER, self.token.clone());
        filled
    }
}

/// Fills nothing. For endpoints that need no authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthFiller for NoAuth {
    fn fill(&self, request: &ApiRequest) -> ApiRequest {
        request.clone()
    }
}

fn header_value(value: &str, what: &str) -> Result<HeaderValue, UpsqlError> {
    HeaderValue::from_str(value).map_err(|_| UpsqlError::Config {
        message: format!("{what} contains characters that are not allowed in an HTTP header"),
    })
}

fn sensitive_value(secret: &SecretString, what: &str) -> Result<HeaderValue, UpsqlError> {
    let mut value = header_value(secret.expose_secret(), what)?;
    value.set_sensitive(true);
    Ok(value)
}
