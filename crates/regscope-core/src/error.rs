//! Error types for regscope

use thiserror::Error;

/// Result type alias using RegscopeError
pub type Result<T> = std::result::Result<T, RegscopeError>;

/// Error type alias for convenience
pub type Error = RegscopeError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for regscope
#[derive(Debug, Error)]
pub enum RegscopeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RegscopeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            RegscopeError::NotFound("extract 9".into()).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            RegscopeError::InvalidInput("blank".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            RegscopeError::Llm("timeout".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }
}
