use thiserror::Error;

/// Everything that can end an import run early.
///
/// The HTTP layer only ever shows callers a terse message per variant,
/// the detail carried here is for operator logs.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to fetch candles: {0}")]
    Fetch(String),

    #[error("malformed candle row: {0}")]
    MalformedCandle(String),

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        ImportError::Fetch(err.to_string())
    }
}

impl From<sea_orm::DbErr> for ImportError {
    fn from(err: sea_orm::DbErr) -> Self {
        ImportError::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
