//! Read-oriented wrapper around a platform HTTP response.
//!
//! The body is captured once as text; JSON parsing happens lazily on first
//! access and is cached for the lifetime of the wrapper.

use crate::error::UpsqlError;
use crate::nested::NestedAccessor;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::OnceLock;

/// Header the platform uses to correlate a response with its own logs.
pub const REQUEST_ID_HEADER: &str = "x-api-requestid";

#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: String,
    json: OnceLock<Result<Value, String>>,
}

impl Response {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            json: OnceLock::new(),
        }
    }

    /// Drain a reqwest response into an owned wrapper.
    pub async fn read(resp: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.text().await?;
        Ok(Self::new(status, headers, body))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
    }

    /// The parsed body. Fails with a payload error when the body is not JSON.
    pub fn json(&self) -> Result<&Value, UpsqlError> {
        let parsed = self
            .json
            .get_or_init(|| serde_json::from_str(&self.body).map_err(|e| e.to_string()));
        parsed
            .as_ref()
            .map_err(|e| UpsqlError::payload(self, format!("response body is not valid JSON: {e}")))
    }

    /// Resolve a dotted path, returning `None` when any segment is missing.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let json = self.json().ok()?;
        NestedAccessor::new(json).get(path).ok()
    }

    /// Resolve a dotted path that must be present.
    pub fn at(&self, path: &str) -> Result<&Value, UpsqlError> {
        let json = self.json()?;
        NestedAccessor::new(json)
            .get(path)
            .map_err(|missing| UpsqlError::Payload {
                reason: missing.to_string(),
                path: Some(missing.path),
                response: Box::new(self.clone()),
            })
    }

    /// Best-effort human readable reason carried by an error response.
    pub fn detail_message(&self) -> Option<String> {
        if let Some(detail) = self.get("detailMessage").or_else(|| self.get("message")) {
            return Some(match detail {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }
        let body = self.body.trim();
        if body.is_empty() || body == "null" {
            None
        } else {
            Some(body.to_string())
        }
    }
}
