//! Deterministic request plan for one scripted run.
//!
//! The plan is pure data: every descriptor knows its operation, its bound
//! token, its global creation ordinal, and whether it carries the
//! server-error flag. Nothing here touches the network.
use std::sync::Arc;

use crate::api::ApiClient;
use crate::context::{CallContext, CallOutcome, Operation};

/// Main-phase operations rotate with this period.
pub const OPERATION_CYCLE: usize = 5;
/// Appended to a token to make the target reject it.
pub const CORRUPT_TOKEN_SUFFIX: &str = "-invalid";

pub const DEFAULT_MAIN_REQUESTS: usize = 95;
pub const DEFAULT_CORRUPT_TOKEN_INDEX: usize = 10;
pub const DEFAULT_UNAUTHORIZED_INDEX: usize = 32;
pub const DEFAULT_SERVER_ERROR_ORDINAL: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Companies {
    pub a: Arc<str>,
    pub b: Arc<str>,
    pub c: Arc<str>,
    /// An id the authenticated caller has no access to.
    pub unauthorized: Arc<str>,
}

/// Where faults are injected. `None` disables that fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultInjection {
    /// Main-phase index whose token gets corrupted.
    pub corrupt_token_index: Option<usize>,
    /// Main-phase index whose company-B id is swapped for the unauthorized one.
    pub unauthorized_index: Option<usize>,
    /// 1-based creation ordinal (warm-up included) that asks for a 500.
    pub server_error_ordinal: Option<usize>,
}

impl FaultInjection {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            corrupt_token_index: None,
            unauthorized_index: None,
            server_error_ordinal: None,
        }
    }
}

impl Default for FaultInjection {
    fn default() -> Self {
        Self {
            corrupt_token_index: Some(DEFAULT_CORRUPT_TOKEN_INDEX),
            unauthorized_index: Some(DEFAULT_UNAUTHORIZED_INDEX),
            server_error_ordinal: Some(DEFAULT_SERVER_ERROR_ORDINAL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSettings {
    pub main_requests: usize,
    pub companies: Companies,
    pub faults: FaultInjection,
}

/// A deferred API call. Cheap to build; executed by the batch executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    operation: Operation,
    token: Arc<str>,
    ordinal: usize,
    cause_500: bool,
}

impl RequestDescriptor {
    #[must_use]
    pub const fn new(operation: Operation, token: Arc<str>, ordinal: usize, cause_500: bool) -> Self {
        Self {
            operation,
            token,
            ordinal,
            cause_500,
        }
    }

    #[must_use]
    pub const fn operation(&self) -> &Operation {
        &self.operation
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[must_use]
    pub const fn cause_500(&self) -> bool {
        self.cause_500
    }

    /// Materialises the context this descriptor will populate.
    #[must_use]
    pub fn start(&self, session_id: Arc<str>) -> CallContext {
        CallContext::start(
            session_id,
            self.operation.clone(),
            self.ordinal,
            self.cause_500,
        )
    }

    /// Performs the call through `client`.
    pub async fn invoke<C>(&self, client: &C, context: &CallContext) -> CallOutcome
    where
        C: ApiClient + ?Sized,
    {
        match &self.operation {
            Operation::UserInfo => client.user_info(&self.token, context).await,
            Operation::Companies => client.companies(&self.token, context).await,
            Operation::CompanyTransactions { company_id } => {
                client
                    .company_transactions(&self.token, context, company_id)
                    .await
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioPlan {
    pub warmup: Vec<RequestDescriptor>,
    pub main: Vec<RequestDescriptor>,
}

impl ScenarioPlan {
    #[must_use]
    pub fn len(&self) -> usize {
        self.warmup.len().saturating_add(self.main.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warmup.is_empty() && self.main.is_empty()
    }
}

/// Builds the warm-up and main phases for `tokens`.
///
/// Warm-up issues one user-info call per token so the target does its
/// first-time claims work before anything is timed. The main phase cycles
/// tokens by `index % tokens.len()` and operations by `index % 5`.
/// An empty token set yields an empty plan.
#[must_use]
pub fn build_plan(tokens: &[Arc<str>], settings: &PlanSettings) -> ScenarioPlan {
    if tokens.is_empty() {
        return ScenarioPlan::default();
    }

    let faults = settings.faults;
    let warmup_len = tokens.len();

    let warmup = tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let ordinal = index.saturating_add(1);
            RequestDescriptor::new(
                Operation::UserInfo,
                Arc::clone(token),
                ordinal,
                faults.server_error_ordinal == Some(ordinal),
            )
        })
        .collect();

    let mut main = Vec::with_capacity(settings.main_requests);
    for (index, token) in tokens.iter().cycle().take(settings.main_requests).enumerate() {
        let token = if faults.corrupt_token_index == Some(index) {
            corrupt_token(token)
        } else {
            Arc::clone(token)
        };
        let operation = main_operation(index, &settings.companies, faults.unauthorized_index);
        let ordinal = warmup_len.saturating_add(index).saturating_add(1);
        main.push(RequestDescriptor::new(
            operation,
            token,
            ordinal,
            faults.server_error_ordinal == Some(ordinal),
        ));
    }

    ScenarioPlan { warmup, main }
}

fn main_operation(index: usize, companies: &Companies, unauthorized_index: Option<usize>) -> Operation {
    let transactions = |company_id: &Arc<str>| Operation::CompanyTransactions {
        company_id: Arc::clone(company_id),
    };
    match index % OPERATION_CYCLE {
        0 => Operation::UserInfo,
        1 => transactions(&companies.a),
        2 if unauthorized_index == Some(index) => transactions(&companies.unauthorized),
        2 => transactions(&companies.b),
        3 => Operation::Companies,
        _ => transactions(&companies.c),
    }
}

fn corrupt_token(token: &str) -> Arc<str> {
    Arc::from(format!("{}{}", token, CORRUPT_TOKEN_SUFFIX))
}
