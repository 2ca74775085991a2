//! Error types for Spendwise

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid amount for {field}: {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("Income must be greater than zero to compute a debt ratio")]
    ZeroIncome,

    #[error("Unknown expense category: {0}")]
    UnknownCategory(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response from AI: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from bad caller input (as opposed to I/O or the backend)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount { .. }
                | Self::ZeroIncome
                | Self::UnknownCategory(_)
                | Self::InvalidData(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
