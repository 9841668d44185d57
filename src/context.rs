//! Per-call correlation state and run-wide counters.
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::Instant;
use uuid::Uuid;

/// The fixed set of API operations a scripted run performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    UserInfo,
    Companies,
    CompanyTransactions { company_id: Arc<str> },
}

impl Operation {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Operation::UserInfo => "user-info",
            Operation::Companies => "companies",
            Operation::CompanyTransactions { .. } => "company-transactions",
        }
    }

    #[must_use]
    pub fn company_id(&self) -> Option<&str> {
        match self {
            Operation::CompanyTransactions { company_id } => Some(company_id),
            Operation::UserInfo | Operation::Companies => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.company_id() {
            Some(company_id) => write!(f, "{}:{}", self.name(), company_id),
            None => f.write_str(self.name()),
        }
    }
}

/// What an API call resolved to. Built by the client, never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl CallOutcome {
    #[must_use]
    pub const fn success(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            error: None,
        }
    }

    #[must_use]
    pub const fn rejected(status_code: u16, detail: String) -> Self {
        Self {
            status_code: Some(status_code),
            error: Some(detail),
        }
    }

    #[must_use]
    pub const fn transport(detail: String) -> Self {
        Self {
            status_code: None,
            error: Some(detail),
        }
    }

    #[must_use]
    pub fn timed_out(limit: Duration) -> Self {
        Self::transport(format!("timed out after {}ms", limit.as_millis()))
    }
}

/// An in-flight API call.
///
/// Created right before dispatch and owned by that single request. The only
/// way out is [`CallContext::complete`], which consumes it.
#[derive(Debug)]
pub struct CallContext {
    session_id: Arc<str>,
    operation: Operation,
    correlation_id: String,
    ordinal: usize,
    cause_500: bool,
    start_time: DateTime<Local>,
    started: Instant,
}

impl CallContext {
    #[must_use]
    pub fn start(
        session_id: Arc<str>,
        operation: Operation,
        ordinal: usize,
        cause_500: bool,
    ) -> Self {
        Self {
            session_id,
            operation,
            correlation_id: Uuid::new_v4().to_string(),
            ordinal,
            cause_500,
            start_time: Local::now(),
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub const fn operation(&self) -> &Operation {
        &self.operation
    }

    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// 1-based creation ordinal across the whole run, warm-up included.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Whether the target API should be asked to fail this call with a 500.
    #[must_use]
    pub const fn cause_500(&self) -> bool {
        self.cause_500
    }

    #[must_use]
    pub fn complete(self, outcome: CallOutcome) -> CompletedCall {
        let duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        CompletedCall {
            session_id: self.session_id,
            operation: self.operation,
            correlation_id: self.correlation_id,
            ordinal: self.ordinal,
            cause_500: self.cause_500,
            start_time: self.start_time,
            duration_ms,
            status_code: outcome.status_code,
            error: outcome.error,
        }
    }
}

/// A finished call. Read-only from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCall {
    session_id: Arc<str>,
    operation: Operation,
    correlation_id: String,
    ordinal: usize,
    cause_500: bool,
    start_time: DateTime<Local>,
    duration_ms: u64,
    status_code: Option<u16>,
    error: Option<String>,
}

impl CompletedCall {
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub const fn operation(&self) -> &Operation {
        &self.operation
    }

    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[must_use]
    pub const fn cause_500(&self) -> bool {
        self.cause_500
    }

    #[must_use]
    pub const fn start_time(&self) -> &DateTime<Local> {
        &self.start_time
    }

    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Run-scoped totals. Both only ever go up.
///
/// Atomics keep the counts exact on a multi-thread runtime too.
#[derive(Debug, Default)]
pub struct RunCounters {
    total: AtomicU64,
    errors: AtomicU64,
}

impl RunCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Arc<str> {
        Arc::from("session-1")
    }

    #[test]
    fn complete_copies_outcome_once() -> Result<(), String> {
        let context = CallContext::start(session(), Operation::Companies, 3, false);
        let correlation_id = context.correlation_id().to_owned();
        let done = context.complete(CallOutcome::rejected(403, "forbidden".to_owned()));

        if done.correlation_id() != correlation_id {
            return Err("Correlation id changed on completion".to_owned());
        }
        if done.status_code() != Some(403) {
            return Err(format!("Unexpected status: {:?}", done.status_code()));
        }
        if !done.is_error() {
            return Err("Expected error outcome".to_owned());
        }
        if done.ordinal() != 3 || done.session_id() != "session-1" {
            return Err("Identity fields not carried over".to_owned());
        }
        Ok(())
    }

    #[test]
    fn correlation_ids_are_unique() -> Result<(), String> {
        let first = CallContext::start(session(), Operation::UserInfo, 1, false);
        let second = CallContext::start(session(), Operation::UserInfo, 2, false);
        if first.correlation_id() == second.correlation_id() {
            return Err("Expected distinct correlation ids".to_owned());
        }
        Ok(())
    }

    #[test]
    fn operation_display_includes_company() -> Result<(), String> {
        let operation = Operation::CompanyTransactions {
            company_id: Arc::from("acme"),
        };
        let rendered = operation.to_string();
        if rendered != "company-transactions:acme" {
            return Err(format!("Unexpected display: {}", rendered));
        }
        if Operation::UserInfo.to_string() != "user-info" {
            return Err("Unexpected user-info display".to_owned());
        }
        Ok(())
    }

    #[test]
    fn counters_only_increase() -> Result<(), String> {
        let counters = RunCounters::new();
        counters.record_created();
        counters.record_created();
        counters.record_error();
        if counters.total() != 2 || counters.errors() != 1 {
            return Err(format!(
                "Unexpected counters: {}/{}",
                counters.errors(),
                counters.total()
            ));
        }
        Ok(())
    }
}
