//! Resolves a submitted-query response into one page of rows.
//!
//! The platform answers a query either with data (`Success`) or with a
//! `Pending` marker pointing at a path to poll. `ResultPoller` absorbs any
//! number of pending round trips within a wait budget, then extracts the
//! grid and the optional pointer to the next page.
//!
//! Only the pending state is retried. Non-2xx responses, malformed payloads
//! and transport errors surface to the caller immediately.

use crate::api::requester::Requester;
use crate::api::response::Response;
use crate::error::UpsqlError;
use crate::verbose;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(500);
/// Pending budget used when the caller configures none.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(10);

/// One result row: column name to value, in column order.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Success,
    Pending,
}

impl QueryStatus {
    /// 200 + "Success" is ready; 201 (created) or 202 (still running) +
    /// "Pending" must be polled. Anything else is not a valid query answer.
    pub fn classify(status_code: u16, status: &str) -> Option<Self> {
        match (status_code, status) {
            (200, "Success") => Some(QueryStatus::Success),
            (201 | 202, "Pending") => Some(QueryStatus::Pending),
            _ => None,
        }
    }
}

/// A chunk of rows from a single response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPage {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Path to GET for the following page, if any.
    pub next: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResultPoller {
    wait_interval: Duration,
    max_wait: Option<Duration>,
    verbose: bool,
}

impl ResultPoller {
    pub fn new(wait_interval: Duration, max_wait: Option<Duration>) -> Self {
        Self {
            wait_interval,
            max_wait,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Wait for `response` to become ready and return its page.
    ///
    /// The budget is measured from the moment this call starts, i.e. from
    /// when the submission (or page) response arrived. It is checked before
    /// each sleep, so the total wait may overshoot by up to one interval
    /// plus one round trip.
    pub async fn resolve(
        &self,
        requester: &Requester,
        response: Response,
    ) -> Result<ResultPage, UpsqlError> {
        let started = Instant::now();
        let mut response = response;
        let mut polls = 0u32;

        loop {
            if !response.is_success() {
                return Err(UpsqlError::Api {
                    response: Box::new(response),
                    reason: None,
                });
            }

            let payload = status_payload(&response)?;
            let status = payload
                .get("status")
                .and_then(Value::as_str)
                .ok_or_else(|| UpsqlError::payload(&response, "expected \"status\" field in response object"))?;

            match QueryStatus::classify(response.status(), status) {
                Some(QueryStatus::Success) => {
                    verbose::emit(
                        self.verbose,
                        &format!("result ready after {} poll(s)", polls),
                    );
                    return extract_page(&response, payload);
                }
                Some(QueryStatus::Pending) => {
                    let current = payload
                        .get("current")
                        .and_then(Value::as_str)
                        .ok_or_else(|| UpsqlError::payload(&response, "pending response has no \"current\" path"))?
                        .to_string();

                    let waited = started.elapsed();
                    if let Some(max_wait) = self.max_wait
                        && waited >= max_wait
                    {
                        return Err(UpsqlError::PendingTimeout {
                            waited,
                            response: Box::new(response),
                        });
                    }

                    verbose::emit(
                        self.verbose,
                        &format!("result pending, polling {} in {}ms", current, self.wait_interval.as_millis()),
                    );
                    tokio::time::sleep(self.wait_interval).await;
                    polls += 1;
                    response = requester.get(&current).await?;
                }
                None => {
                    let reason = format!(
                        "unexpected query status \"{}\" with HTTP {}",
                        status,
                        response.status()
                    );
                    return Err(UpsqlError::api(&response, reason));
                }
            }
        }
    }
}

/// The status object of a query response. The platform returns either the
/// object itself or a one-element array holding it.
pub fn status_payload(response: &Response) -> Result<&Map<String, Value>, UpsqlError> {
    match response.json()? {
        Value::Object(obj) => Ok(obj),
        Value::Array(items) => match items.as_slice() {
            [Value::Object(obj)] => Ok(obj),
            [] => Err(UpsqlError::payload(response, "got an empty list instead of a result object")),
            [Value::Object(_), ..] => Err(UpsqlError::payload(response, "got list with multiple objects")),
            _ => Err(UpsqlError::payload(response, "failed to find result object")),
        },
        _ => Err(UpsqlError::payload(response, "failed to find result object")),
    }
}

fn extract_page(response: &Response, payload: &Map<String, Value>) -> Result<ResultPage, UpsqlError> {
    let Some(result) = payload.get("result").filter(|r| !r.is_null()) else {
        // Statements without a result grid answer with the status object only.
        let columns = payload.keys().cloned().collect();
        return Ok(ResultPage {
            columns,
            rows: vec![payload.clone()],
            next: None,
        });
    };

    let grid = result
        .get("grid")
        .ok_or_else(|| missing_path(response, "result.grid"))?;
    let columns = grid
        .get("columns")
        .and_then(Value::as_array)
        .ok_or_else(|| missing_path(response, "result.grid.columns"))?
        .iter()
        .map(|c| {
            c.get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| UpsqlError::payload(response, "grid column without a name"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let data = grid
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| missing_path(response, "result.grid.data"))?;

    let rows = data
        .iter()
        .map(|row| {
            row.as_array()
                .map(|values| zip_row(&columns, values))
                .ok_or_else(|| UpsqlError::payload(response, "grid row is not an array"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // A next pointer of the wrong type must not end the stream early.
    let next = match result.get("next") {
        None | Some(Value::Null) => None,
        Some(Value::String(path)) => Some(path.clone()),
        Some(other) => {
            return Err(UpsqlError::Payload {
                reason: format!("result.next is not a path: {}", other),
                path: Some("result.next".to_string()),
                response: Box::new(response.clone()),
            });
        }
    };

    Ok(ResultPage {
        columns,
        rows,
        next,
    })
}

/// Pair column names with positional values. Surplus values on either side
/// are dropped.
pub fn zip_row(columns: &[String], values: &[Value]) -> Row {
    columns
        .iter()
        .cloned()
        .zip(values.iter().cloned())
        .collect()
}

fn missing_path(response: &Response, path: &str) -> UpsqlError {
    UpsqlError::Payload {
        reason: format!("missing {} in payload", path),
        path: Some(path.to_string()),
        response: Box::new(response.clone()),
    }
}
