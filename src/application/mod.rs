//! Application layer: command runtime, registry and dispatch
//!
//! This layer turns domain definitions into runnable commands.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod registry;

pub use command::{
    Actions, Command, CommandInstance, Context, Flow, OptionValues, Parsed, Runnable, HELP_ACTION,
};
pub use dispatcher::Dispatcher;
pub use error::{ShebangError, ShebangResult};
pub use registry::CommandRegistry;
