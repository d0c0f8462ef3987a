use crate::api::response::Response;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpsqlError {
    #[error("network: {message}")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("auth: {message} (run 'upsql authenticate' to obtain a new token)")]
    Auth {
        message: String,
        response: Box<Response>,
    },

    #[error("api: {}", describe_response(.response, .reason.as_deref()))]
    Api {
        response: Box<Response>,
        reason: Option<String>,
    },

    #[error("payload: {reason}{}", request_id_suffix(.response))]
    Payload {
        reason: String,
        path: Option<String>,
        response: Box<Response>,
    },

    #[error("timeout: result still pending after {:.1}s{}", .waited.as_secs_f64(), request_id_suffix(.response))]
    PendingTimeout {
        waited: Duration,
        response: Box<Response>,
    },

    #[error("config: {message}")]
    Config { message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("format: {message}")]
    Format { message: String },
}

impl UpsqlError {
    /// Api failures proper plus the payload and pending-timeout refinements.
    pub fn is_api_failure(&self) -> bool {
        matches!(
            self,
            UpsqlError::Api { .. } | UpsqlError::Payload { .. } | UpsqlError::PendingTimeout { .. }
        )
    }

    /// Any failure that came back from the platform in an HTTP response.
    pub fn is_request_failure(&self) -> bool {
        self.is_api_failure() || matches!(self, UpsqlError::Auth { .. })
    }

    /// The response that caused this error, if there was one.
    pub fn response(&self) -> Option<&Response> {
        match self {
            UpsqlError::Auth { response, .. }
            | UpsqlError::Api { response, .. }
            | UpsqlError::Payload { response, .. }
            | UpsqlError::PendingTimeout { response, .. } => Some(response),
            _ => None,
        }
    }

    pub(crate) fn payload(response: &Response, reason: impl Into<String>) -> Self {
        UpsqlError::Payload {
            reason: reason.into(),
            path: None,
            response: Box::new(response.clone()),
        }
    }

    pub(crate) fn api(response: &Response, reason: impl Into<String>) -> Self {
        UpsqlError::Api {
            response: Box::new(response.clone()),
            reason: Some(reason.into()),
        }
    }
}

fn describe_response(response: &Response, reason: Option<&str>) -> String {
    let mut msg = format!("HTTP {}", response.status());
    if let Some(reason) = reason {
        msg.push_str(&format!(": {reason}"));
    } else if let Some(detail) = response.detail_message() {
        msg.push_str(&format!(": {detail}"));
    }
    msg.push_str(&request_id_suffix(response));
    msg
}

fn request_id_suffix(response: &Response) -> String {
    match response.request_id() {
        Some(id) => format!(" [request id: {id}]"),
        None => String::new(),
    }
}
