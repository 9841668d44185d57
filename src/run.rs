//! One scripted run: acquire tokens, warm up, run the main phase, report.
use std::io::Write;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use uuid::Uuid;

use crate::api::{ApiClient, Authenticator};
use crate::context::{CompletedCall, RunCounters};
use crate::error::{AppError, AppResult, AuthError};
use crate::executor::BatchExecutor;
use crate::plan::{PlanSettings, build_plan};
use crate::report::Reporter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Size of the token pool, and of the warm-up phase.
    pub token_count: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    pub request_timeout: Duration,
    pub no_color: bool,
    pub plan: PlanSettings,
}

#[derive(Debug)]
pub struct RunReport {
    pub session_id: Arc<str>,
    /// Warm-up calls first, then main-phase calls, each in plan order.
    pub calls: Vec<CompletedCall>,
    pub total: u64,
    pub errors: u64,
    pub elapsed: Duration,
}

/// Runs the whole scenario, writing report lines to `out`.
///
/// # Errors
///
/// Returns an error only when the token pool cannot be acquired. Failed API
/// calls are part of the report, not errors.
pub async fn run_scenario<A, C, W>(
    settings: &RunSettings,
    authenticator: &mut A,
    client: &C,
    out: W,
) -> AppResult<RunReport>
where
    A: Authenticator + ?Sized,
    C: ApiClient + ?Sized,
    W: Write,
{
    let tokens = acquire_tokens(authenticator, settings.token_count)
        .await
        .map_err(|err| {
            error!("Token acquisition failed: {}", err);
            AppError::auth(err)
        })?;

    let plan = build_plan(&tokens, &settings.plan);
    let session_id: Arc<str> = Arc::from(Uuid::new_v4().to_string());
    let counters = Arc::new(RunCounters::new());
    let mut reporter = Reporter::new(out, Arc::clone(&counters), settings.no_color);
    let executor = BatchExecutor::new(
        client,
        Arc::clone(&session_id),
        &counters,
        settings.batch_size,
        settings.request_timeout,
    );

    reporter.start(Arc::clone(&session_id));

    info!(requests = plan.warmup.len(), "Starting warm-up phase");
    let mut calls = executor.run(plan.warmup, &mut reporter).await;

    info!(requests = plan.main.len(), "Starting main phase");
    let main_calls = executor.run(plan.main, &mut reporter).await;
    calls.extend(main_calls);

    let elapsed = reporter.finish();
    info!(
        total = counters.total(),
        errors = counters.errors(),
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        "Run complete"
    );

    Ok(RunReport {
        session_id,
        calls,
        total: counters.total(),
        errors: counters.errors(),
        elapsed,
    })
}

async fn acquire_tokens<A>(
    authenticator: &mut A,
    count: NonZeroUsize,
) -> Result<Vec<Arc<str>>, AuthError>
where
    A: Authenticator + ?Sized,
{
    authenticator.initialise().await?;
    let mut tokens = Vec::with_capacity(count.get());
    for _ in 0..count.get() {
        let token = authenticator.access_token().await?;
        tokens.push(Arc::from(token));
    }
    info!(tokens = tokens.len(), "Token pool ready");
    Ok(tokens)
}
