use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;

use super::parse::{non_zero, parse_duration_value};

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub no_color: Option<bool>,
    pub api: Option<ApiConfig>,
    pub auth: Option<AuthConfig>,
    pub scenario: Option<ScenarioConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout: Option<DurationValue>,
    pub user_info_path: Option<String>,
    pub companies_path: Option<String>,
    pub transactions_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthConfig {
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
    pub refresh_token: Option<String>,
    pub timeout: Option<DurationValue>,
    /// Pre-issued tokens; replaces the OAuth flow entirely.
    pub tokens: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScenarioConfig {
    pub token_count: Option<usize>,
    pub main_requests: Option<usize>,
    pub batch_size: Option<usize>,
    pub company_a: Option<String>,
    pub company_b: Option<String>,
    pub company_c: Option<String>,
    pub unauthorized_company: Option<String>,
    pub fault_injection: Option<bool>,
    pub corrupt_token_index: Option<usize>,
    pub unauthorized_index: Option<usize>,
    pub server_error_ordinal: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => non_zero(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}
