//! Error types for Lakshya

use thiserror::Error;

/// Lakshya error type
#[derive(Error, Debug)]
pub enum LakshyaError {
    /// Invalid configuration or parameter value. The previous valid
    /// configuration stays in effect.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation was called before `initialize()` completed.
    #[error("Goal checker not initialized: {0}")]
    Uninitialized(&'static str),
}

impl From<toml::de::Error> for LakshyaError {
    fn from(e: toml::de::Error) -> Self {
        LakshyaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LakshyaError>;
