use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;

/// An outgoing platform request described as plain data.
///
/// Built by the `Requester` for every call, passed through the configured
/// `AuthFiller` and discarded once sent.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}
