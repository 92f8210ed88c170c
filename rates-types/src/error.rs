//! Error types for the exchange rates service.

/// Domain-level errors (validation and lookup failures).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid date format. Use yyyymmdd.")]
    InvalidDate(String),

    #[error("Value must be a positive number (integer or decimal).")]
    InvalidRate(String),

    #[error("Page must be a positive integer.")]
    InvalidPage,

    #[error("Limit must be a positive integer between 1 and 100.")]
    InvalidLimit,

    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Currency does not exist.")]
    CurrencyNotFound(String),

    #[error("No rate data available.")]
    NoRateData,
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::CurrencyNotFound(_) | DomainError::NoRateData => {
                AppError::NotFound(err.to_string())
            }
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
        }
    }
}
