use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Default config filenames checked when `--config` is not given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["apiload.toml", "apiload.json"];

/// Loads a configuration file from the provided path or default locations.
///
/// # Errors
///
/// Returns an error when no config file exists, or it cannot be read or
/// parsed.
pub fn load_config(path: Option<&Path>) -> AppResult<ConfigFile> {
    if let Some(path) = path {
        return load_config_file(path);
    }

    DEFAULT_CONFIG_FILES
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
        .map_or_else(
            || Err(AppError::config(ConfigError::NotFound)),
            |candidate| load_config_file(&candidate),
        )
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or(ConfigError::MissingExtension)?;
        match ext {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedExtension {
                ext: other.to_owned(),
            }),
        }
    }
}

/// Reads `path`, picking the parser from its extension before touching the
/// file.
pub(crate) fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let format = Format::of(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = match format {
        Format::Toml => toml::from_str(&content).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        }),
        Format::Json => serde_json::from_str(&content).map_err(|source| ConfigError::ParseJson {
            path: path.to_path_buf(),
            source,
        }),
    };
    parsed.map_err(AppError::config)
}
