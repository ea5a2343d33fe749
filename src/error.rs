use thiserror::Error;

/// Errors surfaced by the check engines.
///
/// `Configuration` is the only variant callers should treat as a bug signal.
/// `InsufficientData` is returned by the rate primitives on the first sample
/// for a key; the engines swallow it and omit the trend results for that run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Not enough data yet: {0}")]
    InsufficientData(String),
}

impl CheckError {
    pub fn config(msg: impl Into<String>) -> Self {
        CheckError::Configuration(msg.into())
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, CheckError::InsufficientData(_))
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
