//! Core library for the `apiload` driver.
//!
//! A run acquires a small pool of OAuth access tokens, sends one warm-up
//! call per token, then a scripted main phase that cycles through user-info,
//! company-listing and per-company transaction calls. Calls go out in
//! bounded batches, a few of them deliberately faulty (a corrupted token, an
//! unauthorized company, a request flagged to trigger a server error), and
//! every call is reported on its own line between a start and an end banner.
pub mod api;
pub mod args;
pub mod config;
pub mod context;
pub mod entry;
pub mod error;
pub mod executor;
pub mod logger;
pub mod plan;
pub mod report;
pub mod run;
