//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, Ident};
use crate::exitcode;

/// Errors raised while registering commands or dispatching arguments.
#[derive(Error, Debug)]
pub enum ShebangError {
    #[error("{0}")]
    Definition(#[from] DomainError),

    #[error("the command {0} has already been registered")]
    DuplicateCommand(Ident),

    #[error("no commands have been registered")]
    NoCommandsRegistered,

    #[error("the command {0} does not exist")]
    UnknownCommand(Ident),

    #[error("the command {command} does not have a {action} action")]
    MissingAction { command: Ident, action: Ident },

    #[error("the -{0} option is required")]
    MissingRequiredOption(Ident),

    #[error("you need to define your own {0} action")]
    NotImplemented(Ident),

    #[error("{0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Message(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("action {action} failed")]
    ActionFailed {
        action: Ident,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for framework operations.
pub type ShebangResult<T> = Result<T, ShebangError>;

impl ShebangError {
    /// Wrap an error raised by a command's own action.
    pub fn action_failed(
        action: impl Into<Ident>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ActionFailed {
            action: action.into(),
            source: source.into(),
        }
    }

    /// True for errors caused by user input at dispatch time.
    ///
    /// Only these are subject to the error policy; the rest are programming
    /// mistakes and always propagate.
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            ShebangError::NoCommandsRegistered
                | ShebangError::UnknownCommand(_)
                | ShebangError::MissingAction { .. }
                | ShebangError::MissingRequiredOption(_)
                | ShebangError::InvalidArguments(_)
                | ShebangError::Message(_)
        )
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShebangError::UnknownCommand(_)
            | ShebangError::MissingAction { .. }
            | ShebangError::MissingRequiredOption(_)
            | ShebangError::InvalidArguments(_) => exitcode::USAGE,
            ShebangError::Message(_) => exitcode::FAILURE,
            ShebangError::Config { .. } => exitcode::CONFIG,
            ShebangError::Io(_) => exitcode::IOERR,
            ShebangError::Definition(_)
            | ShebangError::DuplicateCommand(_)
            | ShebangError::NoCommandsRegistered
            | ShebangError::NotImplemented(_)
            | ShebangError::ActionFailed { .. } => exitcode::SOFTWARE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_message_error_when_displayed_then_equals_message() {
        assert_eq!(ShebangError::Message("test".into()).to_string(), "test");
    }

    #[test]
    fn given_definition_errors_when_classified_then_not_dispatch_errors() {
        assert!(!ShebangError::DuplicateCommand(Ident::from("x")).is_dispatch_error());
        assert!(!ShebangError::NotImplemented(Ident::from("index")).is_dispatch_error());
        assert!(ShebangError::UnknownCommand(Ident::from("x")).is_dispatch_error());
        assert!(ShebangError::NoCommandsRegistered.is_dispatch_error());
    }

    #[test]
    fn given_usage_errors_when_mapping_exit_code_then_returns_usage() {
        let err = ShebangError::MissingRequiredOption(Ident::from("n"));
        assert_eq!(err.exit_code(), exitcode::USAGE);
        assert_eq!(err.to_string(), "the -n option is required");
    }
}
