use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Product is already tracked: {0}")]
    AlreadyTracked(String),

    #[error("Timed out fetching the page")]
    FetchTimeout,

    #[error("Failed to fetch the page: {0}")]
    Fetch(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Classify a reqwest failure: timeouts are reported separately from
    /// every other network or HTTP error.
    pub fn from_fetch(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::FetchTimeout
        } else {
            AppError::Fetch(err.to_string())
        }
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
