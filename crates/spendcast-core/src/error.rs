//! Error types for Spendcast

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing historicalData")]
    MissingHistory,

    #[error("Insufficient historical data: need at least {required} months, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Failed to prepare data")]
    DataPreparation,

    #[error("Insufficient training data: need at least {required} daily points, got {actual}")]
    InsufficientTrainingData { required: usize, actual: usize },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was caused by the caller's input (as opposed to a
    /// failure while preparing data or fitting the model)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingHistory | Error::InsufficientHistory { .. } | Error::InvalidData(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
