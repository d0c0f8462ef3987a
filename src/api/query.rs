use crate::api::poller::{DEFAULT_WAIT_INTERVAL, ResultPage, ResultPoller};
use crate::api::requester::Requester;
use crate::error::UpsqlError;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde_json::json;
use std::time::Duration;

pub const QUERY_PATH: &str = "/query";

/// Pages of one statement's result, produced on demand.
pub type PageStream<'a> = BoxStream<'a, Result<ResultPage, UpsqlError>>;

enum Step {
    Submit(String),
    Follow(String),
    Done,
}

/// Runs statements against the query endpoint and drains their pages.
pub struct QueryExecutor {
    requester: Requester,
    wait_interval: Duration,
    verbose: bool,
}

impl QueryExecutor {
    pub fn new(requester: Requester) -> Self {
        Self {
            requester,
            wait_interval: DEFAULT_WAIT_INTERVAL,
            verbose: false,
        }
    }

    pub fn with_wait_interval(mut self, wait_interval: Duration) -> Self {
        self.wait_interval = wait_interval;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Submit `sql` once and lazily yield its result pages.
    ///
    /// Nothing is sent until the first page is pulled. Each further pull
    /// follows the previous page's `next` pointer; the stream ends after the
    /// page that has none, or right after the first error. `timeout` bounds
    /// the pending wait of every single page (`None` waits forever).
    ///
    /// Panics if `sql` is empty.
    pub fn execute(&self, sql: &str, timeout: Option<Duration>) -> PageStream<'_> {
        assert!(!sql.is_empty(), "cannot execute an empty statement");

        let requester = &self.requester;
        let poller = ResultPoller::new(self.wait_interval, timeout).with_verbose(self.verbose);

        stream::try_unfold(Step::Submit(sql.to_string()), move |step| {
            advance(requester, poller.clone(), step)
        })
        .boxed()
    }
}

async fn advance(
    requester: &Requester,
    poller: ResultPoller,
    step: Step,
) -> Result<Option<(ResultPage, Step)>, UpsqlError> {
    let response = match step {
        Step::Submit(sql) => requester.post(QUERY_PATH, json!({ "sql": sql })).await?,
        Step::Follow(path) => requester.get(&path).await?,
        Step::Done => return Ok(None),
    };

    let page = poller.resolve(requester, response).await?;
    let next = match page.next {
        Some(ref path) => Step::Follow(path.clone()),
        None => Step::Done,
    };
    Ok(Some((page, next)))
}
