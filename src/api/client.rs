use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::context::{CallContext, CallOutcome};
use crate::error::{AppError, AppResult, HttpSetupError};

use super::ApiClient;

pub const SESSION_ID_HEADER: &str = "X-Session-Id";
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";
/// Asks the target to fail the request with a 500.
pub const CAUSE_500_HEADER: &str = "X-Cause-500";
/// Placeholder substituted in the transactions path.
pub const COMPANY_ID_PLACEHOLDER: &str = "{company_id}";

pub const DEFAULT_USER_INFO_PATH: &str = "/connect/userinfo";
pub const DEFAULT_COMPANIES_PATH: &str = "/companies";
pub const DEFAULT_TRANSACTIONS_PATH: &str = "/companies/{company_id}/transactions";

const USER_AGENT: &str = concat!("apiload/", env!("CARGO_PKG_VERSION"));
/// Longest response body excerpt kept on an error outcome.
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub base_url: Url,
    pub user_info_path: String,
    pub companies_path: String,
    /// Must contain `{company_id}`.
    pub transactions_path: String,
}

impl ApiEndpoints {
    #[must_use]
    pub fn with_defaults(base_url: Url) -> Self {
        Self {
            base_url,
            user_info_path: DEFAULT_USER_INFO_PATH.to_owned(),
            companies_path: DEFAULT_COMPANIES_PATH.to_owned(),
            transactions_path: DEFAULT_TRANSACTIONS_PATH.to_owned(),
        }
    }

    /// Appends `path` to the base URL, keeping any prefix the API is
    /// mounted under.
    #[must_use]
    pub fn url_for(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }

    fn transactions(&self, company_id: &str) -> String {
        self.transactions_path
            .replace(COMPANY_ID_PLACEHOLDER, company_id)
    }
}

/// [`ApiClient`] over a shared reqwest connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    client: Client,
    endpoints: ApiEndpoints,
}

impl ReqwestApiClient {
    /// Builds the client with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(endpoints: ApiEndpoints, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| AppError::http(HttpSetupError::BuildClientFailed { source: err }))?;
        Ok(Self { client, endpoints })
    }

    async fn get(&self, path: &str, token: &str, context: &CallContext) -> CallOutcome {
        let url = self.endpoints.url_for(path);

        let mut request = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(SESSION_ID_HEADER, context.session_id())
            .header(CORRELATION_ID_HEADER, context.correlation_id());
        if context.cause_500() {
            request = request.header(CAUSE_500_HEADER, "true");
        }

        debug!(
            operation = context.operation().name(),
            correlation_id = context.correlation_id(),
            path,
            "Dispatching request"
        );

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await;
                outcome_from_response(status, body)
            }
            Err(err) => CallOutcome::transport(describe_transport_error(&err)),
        }
    }
}

#[async_trait]
impl ApiClient for ReqwestApiClient {
    async fn user_info(&self, token: &str, context: &CallContext) -> CallOutcome {
        self.get(&self.endpoints.user_info_path, token, context)
            .await
    }

    async fn companies(&self, token: &str, context: &CallContext) -> CallOutcome {
        self.get(&self.endpoints.companies_path, token, context)
            .await
    }

    async fn company_transactions(
        &self,
        token: &str,
        context: &CallContext,
        company_id: &str,
    ) -> CallOutcome {
        let path = self.endpoints.transactions(company_id);
        self.get(&path, token, context).await
    }
}

fn outcome_from_response(
    status: StatusCode,
    body: Result<String, reqwest::Error>,
) -> CallOutcome {
    let code = status.as_u16();
    match body {
        Ok(_) if status.is_success() => CallOutcome::success(code),
        Ok(text) => CallOutcome::rejected(code, rejection_detail(status, &text)),
        Err(err) => CallOutcome::rejected(code, format!("failed to read body: {}", err)),
    }
}

fn rejection_detail(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Unexpected status");
    let excerpt: String = body.trim().chars().take(BODY_EXCERPT_CHARS).collect();
    if excerpt.is_empty() {
        reason.to_owned()
    } else {
        format!("{}: {}", reason, excerpt)
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        format!("request failed: {}", err)
    }
}
