use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::api::{
    ApiEndpoints, Authenticator, COMPANY_ID_PLACEHOLDER, OAuthAuthenticator, OAuthGrant, ReqwestApiClient,
    StaticAuthenticator,
};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::executor::DEFAULT_BATCH_SIZE;
use crate::plan::{
    Companies, DEFAULT_CORRUPT_TOKEN_INDEX, DEFAULT_MAIN_REQUESTS, DEFAULT_SERVER_ERROR_ORDINAL,
    DEFAULT_UNAUTHORIZED_INDEX, FaultInjection, OPERATION_CYCLE, PlanSettings,
};
use crate::run::RunSettings;

use super::types::{ApiConfig, AuthConfig, ConfigFile, DurationValue, ScenarioConfig};

pub const DEFAULT_TOKEN_COUNT: usize = 5;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Operation slot (`index % 5`) that targets company B.
const COMPANY_B_SLOT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSettings {
    OAuth {
        token_url: String,
        client_id: String,
        client_secret: Option<String>,
        scope: Option<String>,
        grant: OAuthGrant,
        timeout: Duration,
    },
    Static {
        tokens: Vec<String>,
    },
}

/// Fully validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub run: RunSettings,
    pub endpoints: ApiEndpoints,
    pub auth: AuthSettings,
}

impl DriverConfig {
    /// Validates a parsed config file.
    ///
    /// # Errors
    ///
    /// Returns an error when a required setting is missing or a value could
    /// not drive the scripted scenario.
    pub fn from_file(file: ConfigFile) -> AppResult<Self> {
        let api = file
            .api
            .ok_or_else(|| AppError::config(ConfigError::MissingSection { section: "api" }))?;
        let auth = file
            .auth
            .ok_or_else(|| AppError::config(ConfigError::MissingSection { section: "auth" }))?;
        let scenario = file.scenario.unwrap_or_default();

        let request_timeout = resolve_duration("api.timeout", api.timeout.as_ref())?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let run = resolve_run(scenario, request_timeout, file.no_color.unwrap_or(false))?;
        let endpoints = resolve_endpoints(api)?;
        let auth = resolve_auth(auth, run.token_count, request_timeout)?;

        Ok(Self {
            run,
            endpoints,
            auth,
        })
    }

    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn api_client(&self) -> AppResult<ReqwestApiClient> {
        ReqwestApiClient::new(self.endpoints.clone(), self.run.request_timeout)
    }

    /// # Errors
    ///
    /// Returns an error when the token endpoint client cannot be built.
    pub fn authenticator(&self) -> AppResult<Box<dyn Authenticator>> {
        match &self.auth {
            AuthSettings::OAuth {
                token_url,
                client_id,
                client_secret,
                scope,
                grant,
                timeout,
            } => Ok(Box::new(OAuthAuthenticator::new(
                token_url.clone(),
                client_id.clone(),
                client_secret.clone(),
                scope.clone(),
                grant.clone(),
                *timeout,
            )?)),
            AuthSettings::Static { tokens } => Ok(Box::new(StaticAuthenticator::new(tokens.clone()))),
        }
    }
}

fn resolve_duration(
    field: &'static str,
    value: Option<&DurationValue>,
) -> AppResult<Option<Duration>> {
    value
        .map(|value| {
            value.to_duration().map_err(|err| {
                AppError::config(ConfigError::InvalidDuration { field, source: err })
            })
        })
        .transpose()
}

fn positive(field: &'static str, value: usize) -> AppResult<NonZeroUsize> {
    NonZeroUsize::new(value).ok_or_else(|| AppError::validation(ValidationError::MustBePositive { field }))
}

fn required(field: &'static str, value: Option<String>) -> AppResult<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::config(ConfigError::MissingField { field }))
}

fn resolve_run(
    scenario: ScenarioConfig,
    request_timeout: Duration,
    no_color: bool,
) -> AppResult<RunSettings> {
    let token_count = positive(
        "scenario.token_count",
        scenario.token_count.unwrap_or(DEFAULT_TOKEN_COUNT),
    )?;
    let batch_size = positive(
        "scenario.batch_size",
        scenario.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
    )?;
    let main_requests = scenario.main_requests.unwrap_or(DEFAULT_MAIN_REQUESTS);

    let companies = Companies {
        a: Arc::from(required("scenario.company_a", scenario.company_a)?),
        b: Arc::from(required("scenario.company_b", scenario.company_b)?),
        c: Arc::from(required("scenario.company_c", scenario.company_c)?),
        unauthorized: Arc::from(required(
            "scenario.unauthorized_company",
            scenario.unauthorized_company,
        )?),
    };

    let faults = if scenario.fault_injection.unwrap_or(true) {
        let faults = FaultInjection {
            corrupt_token_index: Some(
                scenario
                    .corrupt_token_index
                    .unwrap_or(DEFAULT_CORRUPT_TOKEN_INDEX),
            ),
            unauthorized_index: Some(
                scenario
                    .unauthorized_index
                    .unwrap_or(DEFAULT_UNAUTHORIZED_INDEX),
            ),
            server_error_ordinal: Some(
                scenario
                    .server_error_ordinal
                    .unwrap_or(DEFAULT_SERVER_ERROR_ORDINAL),
            ),
        };
        validate_faults(&faults, token_count.get(), main_requests)?;
        faults
    } else {
        FaultInjection::none()
    };

    Ok(RunSettings {
        token_count,
        batch_size,
        request_timeout,
        no_color,
        plan: PlanSettings {
            main_requests,
            companies,
            faults,
        },
    })
}

fn validate_faults(
    faults: &FaultInjection,
    token_count: usize,
    main_requests: usize,
) -> Result<(), ValidationError> {
    if let Some(index) = faults.corrupt_token_index
        && index >= main_requests
    {
        return Err(ValidationError::IndexOutOfRange {
            field: "scenario.corrupt_token_index",
            index,
            main_requests,
        });
    }
    if let Some(index) = faults.unauthorized_index {
        if index >= main_requests {
            return Err(ValidationError::IndexOutOfRange {
                field: "scenario.unauthorized_index",
                index,
                main_requests,
            });
        }
        if index % OPERATION_CYCLE != COMPANY_B_SLOT {
            return Err(ValidationError::UnauthorizedIndexNotCompanyB { index });
        }
    }
    if let Some(ordinal) = faults.server_error_ordinal {
        let total = token_count.saturating_add(main_requests);
        if ordinal == 0 || ordinal > total {
            return Err(ValidationError::OrdinalOutOfRange { ordinal, total });
        }
    }
    Ok(())
}

fn resolve_endpoints(api: ApiConfig) -> AppResult<ApiEndpoints> {
    let base_url = required("api.base_url", api.base_url)?;
    let base_url = Url::parse(&base_url).map_err(|err| {
        AppError::validation(ValidationError::InvalidBaseUrl {
            url: base_url.clone(),
            source: err,
        })
    })?;

    let mut endpoints = ApiEndpoints::with_defaults(base_url);
    if let Some(path) = api.user_info_path {
        endpoints.user_info_path = path;
    }
    if let Some(path) = api.companies_path {
        endpoints.companies_path = path;
    }
    if let Some(path) = api.transactions_path {
        if !path.contains(COMPANY_ID_PLACEHOLDER) {
            return Err(AppError::validation(
                ValidationError::MissingCompanyPlaceholder { template: path },
            ));
        }
        endpoints.transactions_path = path;
    }
    Ok(endpoints)
}

fn resolve_auth(
    auth: AuthConfig,
    token_count: NonZeroUsize,
    default_timeout: Duration,
) -> AppResult<AuthSettings> {
    match (auth.tokens, auth.token_url) {
        (Some(_), Some(_)) => Err(AppError::config(ConfigError::Conflict {
            left: "auth.tokens",
            right: "auth.token_url",
        })),
        (Some(tokens), None) => {
            if tokens.len() < token_count.get() {
                return Err(AppError::validation(
                    ValidationError::NotEnoughStaticTokens {
                        available: tokens.len(),
                        required: token_count.get(),
                    },
                ));
            }
            Ok(AuthSettings::Static { tokens })
        }
        (None, token_url) => {
            let token_url = required("auth.token_url", token_url)?;
            let client_id = required("auth.client_id", auth.client_id)?;
            let timeout =
                resolve_duration("auth.timeout", auth.timeout.as_ref())?.unwrap_or(default_timeout);
            let grant = auth
                .refresh_token
                .map_or(OAuthGrant::ClientCredentials, OAuthGrant::RefreshToken);
            Ok(AuthSettings::OAuth {
                token_url,
                client_id,
                client_secret: auth.client_secret,
                scope: auth.scope,
                grant,
                timeout,
            })
        }
    }
}
