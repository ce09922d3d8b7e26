//! Error types for iam-krn
//!
//! This module defines the error hierarchy used throughout the crate.
//! Identifier errors are terminal input-validation failures: parsing and
//! construction never return a partially built value.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("KRN error: {0}")]
    Krn(#[from] KrnError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// KRN validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KrnError {
    /// A token violates the charset, a required token is missing,
    /// or the token count is wrong
    #[error("malformed KRN: {0}")]
    Malformed(String),

    /// A wildcard is misplaced, repeated, or followed by more tokens
    #[error("malformed wildcard KRN: {0}")]
    MalformedWildcard(String),
}

impl KrnError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    pub(crate) fn wildcard(reason: impl Into<String>) -> Self {
        Self::MalformedWildcard(reason.into())
    }

    /// Whether the error is about wildcard placement
    pub fn is_wildcard_error(&self) -> bool {
        matches!(self, Self::MalformedWildcard(_))
    }
}

/// Action validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("malformed action '{action}': {reason}")]
    Malformed { action: String, reason: String },

    #[error("malformed wildcard action '{action}': {reason}")]
    MalformedWildcard { action: String, reason: String },
}

impl ActionError {
    pub(crate) fn malformed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            action: action.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn wildcard(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedWildcard {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is about wildcard placement
    pub fn is_wildcard_error(&self) -> bool {
        matches!(self, Self::MalformedWildcard { .. })
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },
}

/// Statement store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid KRN: {0}")]
    Krn(#[from] KrnError),

    #[error("Invalid action: {0}")]
    Action(#[from] ActionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
