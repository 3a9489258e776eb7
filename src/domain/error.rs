//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::Ident;

/// Domain errors are mistakes in a command definition.
/// They are detected when a descriptor is registered, never at dispatch time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("option name '{name}' is used more than once in command {command}")]
    DuplicateOption { command: Ident, name: Ident },

    #[error("short option name '{name}' must be a single character (command {command})")]
    InvalidShortName { command: Ident, name: Ident },

    #[error("long option name must not be empty (command {command})")]
    EmptyLongName { command: Ident },

    #[error("long option name '{name}' must not start with '-' or contain whitespace or '=' (command {command})")]
    InvalidLongName { command: Ident, name: Ident },
}
