use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("'{field}' must be >= 1.")]
    MustBePositive { field: &'static str },
    #[error("'{field}' ({index}) is outside the main phase of {main_requests} request(s).")]
    IndexOutOfRange {
        field: &'static str,
        index: usize,
        main_requests: usize,
    },
    #[error(
        "unauthorized_index {index} does not select a company-B transactions request (index % 5 must be 2)."
    )]
    UnauthorizedIndexNotCompanyB { index: usize },
    #[error("server_error_ordinal {ordinal} must be within 1..={total}.")]
    OrdinalOutOfRange { ordinal: usize, total: usize },
    #[error("Static token list has {available} token(s) but token_count is {required}.")]
    NotEnoughStaticTokens { available: usize, required: usize },
    #[error("Path template '{template}' must contain '{{company_id}}'.")]
    MissingCompanyPlaceholder { template: String },
}
