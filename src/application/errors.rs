//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No valid bot token provided")]
    MissingToken,

    #[error("Interaction has already been acknowledged")]
    AlreadyAcknowledged,

    #[error("Interaction has not been acknowledged yet")]
    NotAcknowledged,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Response failed: {0}")]
    Response(#[from] BotError),
}

/// Errors raised while building commands and events
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Commands need valid callbacks")]
    MissingExecute,

    #[error("Events must have a name")]
    MissingName,

    #[error("Events must have a handler")]
    MissingHandler,

    #[error("Invalid command data: {0}")]
    InvalidData(String),
}

/// Directory loader errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Couldn't find {} for {kind}", path.display())]
    NotFound { path: PathBuf, kind: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("Unknown handler: {0}")]
    UnknownHandler(String),

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_to_respond() -> Result<(), CommandError> {
        Err(BotError::AlreadyAcknowledged)?;
        Ok(())
    }

    #[test]
    fn responder_failures_surface_as_command_errors() {
        let err = fails_to_respond().unwrap_err();
        assert!(matches!(err, CommandError::Response(BotError::AlreadyAcknowledged)));
        assert_eq!(
            err.to_string(),
            "Response failed: Interaction has already been acknowledged"
        );
    }
}
