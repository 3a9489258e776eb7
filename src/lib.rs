//! shebang: a small framework for command line programs built from named
//! commands and actions.
//!
//! ```ignore
//! let mut registry = CommandRegistry::new();
//! registry.register(
//!     CommandDescriptor::new("default")
//!         .banner("Greets people.")
//!         .o('h', "help", "Shows this help message", OptionConfig::new().method("help")),
//!     Greet::default,
//! )?;
//! let flow = Dispatcher::new(registry, Settings::load(None)?).run_from_env()?;
//! std::process::exit(flow.exit_code());
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{
    Actions, Command, CommandRegistry, Context, Dispatcher, Flow, ShebangError, ShebangResult,
};
pub use config::{ErrorPolicy, RequiredPolicy, Settings};
pub use domain::{CommandDescriptor, Ident, OptionConfig, OptionValue, ValueType};
