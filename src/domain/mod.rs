//! Domain layer: command definitions
//!
//! Independent of parsing, output and configuration.

pub mod descriptor;
pub mod error;
pub mod ident;
pub mod option;

pub use descriptor::{CommandDescriptor, DefinitionResult, USAGE_TOPIC};
pub use error::DomainError;
pub use ident::{is_flag_like, Ident};
pub use option::{FlagSpec, Opt, OptionConfig, OptionValue, ValueType, DEFAULT_VALUE_KEY};
