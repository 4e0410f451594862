//! Error types for the CLI application.
//!
//! Every command handler returns `Result<(), CliError>`; [`crate::run`] maps
//! the error to an exit code.
//!
//! ## Batch Validation Errors
//!
//! `BatchValidationError<T>` ties a message to the item that produced it. The
//! `stats` command uses it to report malformed action log lines.

use std::fmt;

/// Custom error type for CLI operations.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// Match setup or rules error
    Game(String),

    /// Server, connection or protocol failure
    Network(String),

    /// Operation was interrupted (e.g., by user with Ctrl+C)
    Interrupted(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Game(msg) => write!(f, "Game error: {}", msg),
            CliError::Network(msg) => write!(f, "Network error: {}", msg),
            CliError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<dobble_engine::errors::GameError> for CliError {
    fn from(error: dobble_engine::errors::GameError) -> Self {
        CliError::Game(error.to_string())
    }
}

impl From<dobble_server::ServerError> for CliError {
    fn from(error: dobble_server::ServerError) -> Self {
        match error {
            dobble_server::ServerError::ConfigError(msg) => CliError::Config(msg),
            other => CliError::Network(other.to_string()),
        }
    }
}

impl From<dobble_server::ClientError> for CliError {
    fn from(error: dobble_server::ClientError) -> Self {
        CliError::Network(error.to_string())
    }
}

impl From<crate::config::ConfigError> for CliError {
    fn from(error: crate::config::ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

/// An error tied to the item that caused it.
///
/// # Examples
///
/// ```rust
/// use dobble_cli::BatchValidationError;
///
/// let error = BatchValidationError {
///     item_context: 5,
///     message: "unknown return code".to_string(),
/// };
/// assert_eq!(error.to_string(), "5: unknown return code");
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    /// Context identifying the item that failed validation
    pub item_context: T,
    /// Descriptive error message
    pub message: String,
}

impl<T: std::fmt::Display> std::fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}
