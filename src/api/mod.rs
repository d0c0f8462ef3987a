//! Client side of the platform's query protocol.
//!
//! Leaves first: `auth_filler` injects credentials into an `ApiRequest`,
//! `requester` sends it and validates the status, `response` wraps what came
//! back, `poller` waits out pending results and extracts a page, and `query`
//! chains submission and page following into a stream.

pub mod auth;
pub mod auth_filler;
pub mod poller;
pub mod query;
pub mod request;
pub mod requester;
pub mod response;

pub use auth_filler::{AuthFiller, CredentialsFiller, NoAuth, TokenFiller};
pub use poller::{QueryStatus, ResultPage, ResultPoller, Row};
pub use query::{PageStream, QueryExecutor};
pub use request::ApiRequest;
pub use requester::{Requester, Validator, validate_status};
pub use response::Response;
