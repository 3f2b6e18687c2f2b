//! Error types for the I/O edges of the crate.
//!
//! Analysis itself never fails: parse problems, detector faults and rule-engine
//! failures become [`crate::core::Diagnostic`]s. These errors are raised only by
//! configuration loading, curriculum loading and the rule-engine process boundary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Curriculum catalog errors
    #[error("Curriculum error: {0}")]
    Curriculum(String),

    /// External rule-engine errors
    #[error("Rule engine error: {0}")]
    RuleEngine(String),

    /// Errors annotated with the file or step that produced them
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a file system error with path context
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    pub fn rule_engine(message: impl Into<String>) -> Self {
        Self::RuleEngine(message.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
