//! Command-line client for a remote SQL execution API.
//!
//! Statements are submitted over HTTP; the platform answers with either a
//! result grid or a pending marker that has to be polled, and large results
//! arrive as a chain of pages. `api` drives that protocol, the remaining
//! modules supply configuration, rendering and the command line around it.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod masking;
pub mod nested;
pub mod output;
pub mod verbose;
