mod app;
mod auth;
mod config;
mod http;
mod validation;

pub use app::{AppError, AppResult};
pub use auth::AuthError;
pub use config::ConfigError;
pub use http::HttpSetupError;
pub use validation::ValidationError;
