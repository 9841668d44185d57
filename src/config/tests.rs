use super::{AuthSettings, DriverConfig, load_config_file};
use std::time::Duration;
use tempfile::tempdir;

use crate::api::OAuthGrant;
use crate::error::{AppError, ConfigError, ValidationError};

const BASE_TOML: &str = r#"
no_color = true

[api]
base_url = "http://localhost:8080/"
timeout = "750ms"

[auth]
token_url = "http://localhost:8080/connect/token"
client_id = "client-1"
client_secret = "secret"
refresh_token = "rt-1"

[scenario]
company_a = "company-a"
company_b = "company-b"
company_c = "company-c"
unauthorized_company = "company-x"
"#;

fn write_config(name: &str, content: &str) -> Result<(tempfile::TempDir, std::path::PathBuf), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join(name);
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;
    Ok((dir, path))
}

fn resolve(content: &str) -> Result<Result<DriverConfig, AppError>, String> {
    let (_dir, path) = write_config("apiload.toml", content)?;
    let file = load_config_file(&path).map_err(|err| err.to_string())?;
    Ok(DriverConfig::from_file(file))
}

#[test]
fn toml_config_resolves_with_defaults() -> Result<(), String> {
    let config = resolve(BASE_TOML)?.map_err(|err| err.to_string())?;
    if config.run.token_count.get() != 5 || config.run.batch_size.get() != 5 {
        return Err("Expected default token_count and batch_size".to_owned());
    }
    if config.run.plan.main_requests != 95 {
        return Err(format!("Unexpected main_requests: {}", config.run.plan.main_requests));
    }
    if config.run.request_timeout != Duration::from_millis(750) {
        return Err(format!("Unexpected timeout: {:?}", config.run.request_timeout));
    }
    if !config.run.no_color {
        return Err("Expected no_color".to_owned());
    }
    let faults = config.run.plan.faults;
    if faults.corrupt_token_index != Some(10)
        || faults.unauthorized_index != Some(32)
        || faults.server_error_ordinal != Some(14)
    {
        return Err(format!("Unexpected fault defaults: {:?}", faults));
    }
    match config.auth {
        AuthSettings::OAuth { grant, .. } if grant == OAuthGrant::RefreshToken("rt-1".to_owned()) => Ok(()),
        other => Err(format!("Unexpected auth settings: {:?}", other)),
    }
}

#[test]
fn json_config_with_static_tokens() -> Result<(), String> {
    let content = r#"{
  "api": { "base_url": "http://localhost:8080/", "timeout": 5 },
  "auth": { "tokens": ["a", "b"] },
  "scenario": {
    "token_count": 2,
    "main_requests": 40,
    "batch_size": 3,
    "company_a": "ca",
    "company_b": "cb",
    "company_c": "cc",
    "unauthorized_company": "cx",
    "unauthorized_index": 7
  }
}"#;
    let (_dir, path) = write_config("apiload.json", content)?;
    let file = load_config_file(&path).map_err(|err| err.to_string())?;
    let config = DriverConfig::from_file(file).map_err(|err| err.to_string())?;
    if config.run.request_timeout != Duration::from_secs(5) {
        return Err(format!("Unexpected timeout: {:?}", config.run.request_timeout));
    }
    if config.run.plan.faults.unauthorized_index != Some(7) {
        return Err("Expected unauthorized_index override".to_owned());
    }
    match config.auth {
        AuthSettings::Static { tokens } if tokens.len() == 2 => Ok(()),
        other => Err(format!("Unexpected auth settings: {:?}", other)),
    }
}

#[test]
fn unauthorized_index_must_target_company_b() -> Result<(), String> {
    let content = format!("{}unauthorized_index = 31\n", BASE_TOML);
    match resolve(&content)? {
        Err(AppError::Validation(ValidationError::UnauthorizedIndexNotCompanyB { index: 31 })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn fault_indices_must_fit_main_phase() -> Result<(), String> {
    let content = format!("{}main_requests = 10\n", BASE_TOML);
    match resolve(&content)? {
        Err(AppError::Validation(ValidationError::IndexOutOfRange { index: 10, .. })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn disabled_faults_skip_index_validation() -> Result<(), String> {
    let content = format!("{}main_requests = 10\nfault_injection = false\n", BASE_TOML);
    let config = resolve(&content)?.map_err(|err| err.to_string())?;
    if config.run.plan.faults.corrupt_token_index.is_some() {
        return Err("Expected faults disabled".to_owned());
    }
    Ok(())
}

#[test]
fn server_error_ordinal_must_be_in_run() -> Result<(), String> {
    let content = format!("{}server_error_ordinal = 101\n", BASE_TOML);
    match resolve(&content)? {
        Err(AppError::Validation(ValidationError::OrdinalOutOfRange { ordinal: 101, total: 100 })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn zero_batch_size_is_rejected() -> Result<(), String> {
    let content = format!("{}batch_size = 0\n", BASE_TOML);
    match resolve(&content)? {
        Err(AppError::Validation(ValidationError::MustBePositive { field: "scenario.batch_size" })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn tokens_and_token_url_conflict() -> Result<(), String> {
    let content = BASE_TOML.replace("client_id = \"client-1\"", "client_id = \"client-1\"\ntokens = [\"a\"]");
    match resolve(&content)? {
        Err(AppError::Config(ConfigError::Conflict { .. })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn too_few_static_tokens_is_rejected() -> Result<(), String> {
    let content = BASE_TOML.replace(
        "token_url = \"http://localhost:8080/connect/token\"\nclient_id = \"client-1\"\nclient_secret = \"secret\"\nrefresh_token = \"rt-1\"",
        "tokens = [\"a\", \"b\"]",
    );
    match resolve(&content)? {
        Err(AppError::Validation(ValidationError::NotEnoughStaticTokens { available: 2, required: 5 })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn missing_company_is_reported() -> Result<(), String> {
    let content = BASE_TOML.replace("company_c = \"company-c\"\n", "");
    match resolve(&content)? {
        Err(AppError::Config(ConfigError::MissingField { field: "scenario.company_c" })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn transactions_path_needs_placeholder() -> Result<(), String> {
    let content = BASE_TOML.replace(
        "timeout = \"750ms\"",
        "timeout = \"750ms\"\ntransactions_path = \"/transactions\"",
    );
    match resolve(&content)? {
        Err(AppError::Validation(ValidationError::MissingCompanyPlaceholder { .. })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn invalid_duration_is_reported() -> Result<(), String> {
    let content = BASE_TOML.replace("\"750ms\"", "\"10parsecs\"");
    match resolve(&content)? {
        Err(AppError::Config(ConfigError::InvalidDuration { field: "api.timeout", .. })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let (_dir, path) = write_config("apiload.yaml", "api: {}")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other.map(|_| ()))),
    }
}

#[test]
fn extension_is_checked_before_reading() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    match load_config_file(&dir.path().join("absent.ini")) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "ini" => {}
        other => return Err(format!("Unexpected result: {:?}", other.map(|_| ()))),
    }
    match load_config_file(&dir.path().join("apiload")) {
        Err(AppError::Config(ConfigError::MissingExtension)) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other.map(|_| ()))),
    }
}

#[test]
fn zero_second_timeout_is_rejected() -> Result<(), String> {
    let content = BASE_TOML.replace("\"750ms\"", "0");
    match resolve(&content)? {
        Err(AppError::Config(ConfigError::InvalidDuration {
            field: "api.timeout",
            source: ValidationError::DurationZero,
        })) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}
