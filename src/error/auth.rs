use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token URL '{url}': {source}")]
    InvalidTokenUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Token endpoint request failed: {source}")]
    TokenRequestFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Token endpoint returned status {status}: {body}")]
    TokenRejected { status: u16, body: String },
    #[error("Token response could not be decoded: {source}")]
    TokenResponseInvalid {
        #[source]
        source: reqwest::Error,
    },
    #[error("Token response did not contain an access token.")]
    MissingAccessToken,
    #[error("Authenticator used before initialise().")]
    NotInitialised,
    #[error("Static token pool exhausted after {issued} token(s).")]
    TokenPoolExhausted { issued: usize },
}
