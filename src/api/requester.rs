//! The single point of network I/O against the platform API.
//!
//! A `Requester` owns its `reqwest::Client`, so connections are pooled for
//! the lifetime of one logical session. Every call builds an `ApiRequest`,
//! runs it through the `AuthFiller`, sends it and hands the response to the
//! validator. Nothing here retries.

use crate::api::auth_filler::AuthFiller;
use crate::api::request::ApiRequest;
use crate::api::response::Response;
use crate::error::UpsqlError;
use crate::masking::format_header_value;
use crate::verbose;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Accepts a response unchanged or turns it into a typed failure.
pub type Validator = fn(Response) -> Result<Response, UpsqlError>;

pub struct Requester {
    base_url: String,
    auth: Box<dyn AuthFiller>,
    client: Client,
    validator: Validator,
    verbose: bool,
    show_secrets: bool,
}

impl Requester {
    pub fn new(base_url: &str, auth: impl AuthFiller + 'static) -> Result<Self, UpsqlError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| UpsqlError::Network {
                message: format!("failed to build HTTP client: {}", e),
                source: e,
            })?;
        Ok(Self::with_client(base_url, auth, client))
    }

    pub fn with_client(base_url: &str, auth: impl AuthFiller + 'static, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: Box::new(auth),
            client,
            validator: validate_status,
            verbose: false,
            show_secrets: false,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_verbose(mut self, verbose: bool, show_secrets: bool) -> Self {
        self.verbose = verbose;
        self.show_secrets = show_secrets;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a platform path; a missing leading `/` is added.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response, UpsqlError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, json: Value) -> Result<Response, UpsqlError> {
        self.send(Method::POST, path, Some(json)).await
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        json: Option<Value>,
    ) -> Result<Response, UpsqlError> {
        let mut request = ApiRequest::new(method, self.url_for(path));
        request.body = json;
        let request = self.auth.fill(&request);

        let correlation = Uuid::new_v4();
        self.log_request(&correlation, &request);

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| UpsqlError::Network {
            message: format!("{} {} failed: {}", request.method, request.url, e),
            source: e,
        })?;
        let response = Response::read(resp).await.map_err(|e| UpsqlError::Network {
            message: format!("failed to read response from {}: {}", request.url, e),
            source: e,
        })?;

        self.log_response(&correlation, &response);
        (self.validator)(response)
    }

    fn log_request(&self, correlation: &Uuid, request: &ApiRequest) {
        if !self.verbose {
            return;
        }
        verbose::emit(
            true,
            &format!("[{}] -> {} {}", correlation, request.method, request.url),
        );
        verbose::emit(
            true,
            &format!("[{}]    headers: {}", correlation, self.format_headers(&request.headers)),
        );
        if let Some(ref body) = request.body {
            verbose::emit(true, &format!("[{}]    body: {}", correlation, body));
        }
    }

    fn log_response(&self, correlation: &Uuid, response: &Response) {
        if !self.verbose {
            return;
        }
        verbose::emit(
            true,
            &format!(
                "[{}] <- {} (request id: {})",
                correlation,
                response.status(),
                response.request_id().unwrap_or("-")
            ),
        );
        verbose::emit(
            true,
            &format!("[{}]    headers: {}", correlation, self.format_headers(response.headers())),
        );
        verbose::emit(true, &format!("[{}]    body: {}", correlation, response.body()));
    }

    fn format_headers(&self, headers: &HeaderMap) -> String {
        headers
            .iter()
            .map(|(name, value)| format!("{}={}", name, format_header_value(value, self.show_secrets)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Default response policy: 2xx passes, 403 is an authentication failure,
/// anything else is an API failure.
pub fn validate_status(response: Response) -> Result<Response, UpsqlError> {
    if response.is_success() {
        return Ok(response);
    }
    if response.status() == 403 {
        let message = match response.detail_message() {
            Some(detail) => format!("access denied: {}", detail),
            None => "access denied".to_string(),
        };
        return Err(UpsqlError::Auth {
            message,
            response: Box::new(response),
        });
    }
    Err(UpsqlError::Api {
        response: Box::new(response),
        reason: None,
    })
}
