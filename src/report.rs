//! Streams one line per completed call plus start and end banners.
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::style::Stylize;
use tokio::time::Instant;
use tracing::warn;

use crate::context::{CompletedCall, RunCounters};
use crate::executor::CompletionSink;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
/// Shown for any field a call does not carry.
const MISSING: &str = "-";

pub struct Reporter<W: Write> {
    out: W,
    counters: Arc<RunCounters>,
    no_color: bool,
    session_id: Option<Arc<str>>,
    started: Option<Instant>,
}

impl<W: Write> Reporter<W> {
    #[must_use]
    pub const fn new(out: W, counters: Arc<RunCounters>, no_color: bool) -> Self {
        Self {
            out,
            counters,
            no_color,
            session_id: None,
            started: None,
        }
    }

    /// Prints the start banner and starts the run clock.
    pub fn start(&mut self, session_id: Arc<str>) {
        let banner = render_start_banner(&session_id, &Local::now());
        self.session_id = Some(session_id);
        self.started = Some(Instant::now());
        self.write_line(&banner);
    }

    /// Prints the end banner and returns the elapsed run time.
    pub fn finish(&mut self) -> Duration {
        let elapsed = self
            .started
            .map_or(Duration::ZERO, |started| started.elapsed());
        let banner = render_end_banner(
            self.session_id.as_deref().unwrap_or(MISSING),
            elapsed,
            self.counters.errors(),
            self.counters.total(),
        );
        self.write_line(&banner);
        if let Err(err) = self.out.flush() {
            warn!("Failed to flush report output: {}", err);
        }
        elapsed
    }

    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{}", line) {
            warn!("Failed to write report line: {}", err);
        }
    }
}

impl<W: Write> CompletionSink for Reporter<W> {
    fn record(&mut self, call: &CompletedCall) {
        if call.is_error() {
            self.counters.record_error();
        }
        let line = render_call(call, self.no_color);
        self.write_line(&line);
    }
}

#[must_use]
pub fn render_start_banner(session_id: &str, started_at: &DateTime<Local>) -> String {
    format!(
        "=== Session {} started at {} ===",
        session_id,
        started_at.format(TIMESTAMP_FORMAT)
    )
}

#[must_use]
pub fn render_end_banner(session_id: &str, elapsed: Duration, errors: u64, total: u64) -> String {
    format!(
        "=== Session {} finished in {}ms: {}/{} requests failed ===",
        session_id,
        elapsed.as_millis(),
        errors,
        total
    )
}

/// One line for `call`. Pure, so rendering the same call twice is identical.
#[must_use]
pub fn render_call(call: &CompletedCall, no_color: bool) -> String {
    let status = call
        .status_code()
        .map_or_else(|| MISSING.to_owned(), |code| code.to_string());
    let status = paint_status(status, call, no_color);
    let operation = call.operation().to_string();
    let mut line = format!(
        "{} {} {} {} {}ms",
        call.start_time().format(TIMESTAMP_FORMAT),
        non_empty(&operation),
        non_empty(call.correlation_id()),
        status,
        call.duration_ms()
    );
    if call.cause_500() {
        line.push_str(" [cause-500]");
    }
    if let Some(error) = call.error() {
        line.push_str(" error: ");
        line.push_str(&single_line(error));
    }
    line
}

fn paint_status(status: String, call: &CompletedCall, no_color: bool) -> String {
    if no_color {
        return status;
    }
    match call.status_code() {
        Some(code) if !call.is_error() && (200..300).contains(&code) => status.green().to_string(),
        Some(code) if (400..500).contains(&code) => status.yellow().to_string(),
        Some(_) | None => status.red().to_string(),
    }
}

fn non_empty(value: &str) -> &str {
    if value.is_empty() { MISSING } else { value }
}

fn single_line(value: &str) -> String {
    let flattened: String = value
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();
    let trimmed = flattened.trim();
    if trimmed.is_empty() {
        MISSING.to_owned()
    } else {
        trimmed.to_owned()
    }
}
