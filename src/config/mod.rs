//! Configuration loading and validation.
mod loader;
mod parse;
mod settings;
pub mod types;

#[cfg(test)]
mod tests;

pub use loader::{DEFAULT_CONFIG_FILES, load_config};
pub use settings::{AuthSettings, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TOKEN_COUNT, DriverConfig};

#[cfg(test)]
pub(crate) use loader::load_config_file;
