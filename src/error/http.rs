use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpSetupError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}
