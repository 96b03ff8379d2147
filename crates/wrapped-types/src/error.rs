//! Error types for ai-wrapped.

use thiserror::Error;

/// How a caller should present an error to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wrong file or wrong platform selected
    WrongInput,
    /// Input was readable but held nothing to analyze
    NoData,
    /// Programmer or environment error
    Internal,
}

/// Unified error type for the parse/aggregate pipeline.
#[derive(Debug, Error)]
pub enum WrappedError {
    /// Malformed or unrecognized export document
    #[error(
        "Failed to parse {platform} export: {reason}. Please re-export your data from {platform} and try again."
    )]
    Parse { platform: String, reason: String },

    /// Unsupported platform selector or invalid settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Well-formed input without a single usable message
    #[error("No messages found in the provided conversation data. Please check your export file.")]
    EmptyDataset,

    /// Share token was not valid base64 or not the expected payload
    #[error("Invalid share token: {0}")]
    InvalidShareToken(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WrappedError {
    /// Create a parse error for a platform.
    pub fn parse(platform: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::Parse {
            platform: platform.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a share-token error.
    pub fn share_token(message: impl Into<String>) -> Self {
        Self::InvalidShareToken(message.into())
    }

    /// Category used to pick user-facing messaging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            WrappedError::Parse { .. } | WrappedError::InvalidShareToken(_) => {
                ErrorCategory::WrongInput
            }
            WrappedError::EmptyDataset => ErrorCategory::NoData,
            WrappedError::Configuration(_) | WrappedError::Serialization(_) => {
                ErrorCategory::Internal
            }
        }
    }
}
