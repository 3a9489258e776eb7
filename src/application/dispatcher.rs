//! Dispatcher: resolves command, action and flags from a flat argument list

use std::io::{self, Write};

use tracing::{debug, instrument};

use crate::application::command::{Flow, Parsed, Runnable};
use crate::application::error::{ShebangError, ShebangResult};
use crate::application::registry::CommandRegistry;
use crate::cli::output;
use crate::config::{ErrorPolicy, Settings};
use crate::domain::Ident;

/// Entry point of a shebang program.
///
/// Invocation shape: `<program> [command] [action] [flags...] [positional...]`.
#[derive(Debug)]
pub struct Dispatcher {
    registry: CommandRegistry,
    settings: Settings,
}

impl Dispatcher {
    pub fn new(registry: CommandRegistry, settings: Settings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Dispatch `args` (without the program name) against stdout and stderr.
    pub fn run<I, S>(&self, args: I) -> ShebangResult<Flow>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stdout = io::stdout();
        let stderr = io::stderr();
        let mut out = stdout.lock();
        let mut err = stderr.lock();
        let flow = self.run_with(args, &mut out, &mut err);
        out.flush()?;
        flow
    }

    /// Dispatch the arguments of the current process.
    pub fn run_from_env(&self) -> ShebangResult<Flow> {
        self.run(std::env::args().skip(1))
    }

    /// Dispatch `args`, writing normal output to `out` and reported errors to `err`.
    pub fn run_with<I, S>(
        &self,
        args: I,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> ShebangResult<Flow>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        match self.dispatch(args, out) {
            Ok(flow) => Ok(flow),
            Err(e) => self.report(e, err),
        }
    }

    /// Fail the current invocation with `message`, subject to the error policy.
    pub fn error(&self, message: impl Into<String>, err: &mut dyn Write) -> ShebangResult<Flow> {
        self.report(ShebangError::Message(message.into()), err)
    }

    /// Apply the error policy to a dispatch error.
    ///
    /// Errors in command definitions always propagate.
    fn report(&self, e: ShebangError, err: &mut dyn Write) -> ShebangResult<Flow> {
        if !e.is_dispatch_error() || self.settings.error_policy == ErrorPolicy::Raise {
            return Err(e);
        }
        debug!(error = %e, "reporting dispatch error");
        writeln!(err, "{}", output::error_line(&e))?;
        err.flush()?;
        Ok(Flow::Exit(e.exit_code()))
    }

    #[instrument(level = "debug", skip(self, out))]
    fn dispatch(&self, args: Vec<String>, out: &mut dyn Write) -> ShebangResult<Flow> {
        if self.registry.is_empty() {
            return Err(ShebangError::NoCommandsRegistered);
        }

        let mut args = args.into_iter().peekable();

        let mut command = self.settings.default_command.clone();
        if let Some(name) = args
            .peek()
            .and_then(|token| Ident::parse_token(token))
            .filter(|name| self.registry.contains(name.as_str()))
        {
            command = name;
            args.next();
        }

        let mut instance: Box<dyn Runnable> = self
            .registry
            .instantiate(command.as_str(), &self.settings)
            .ok_or_else(|| ShebangError::UnknownCommand(command.clone()))?;

        let mut action = self.settings.default_action.clone();
        if let Some(name) = args
            .peek()
            .and_then(|token| Ident::parse_token(token))
            .filter(|name| instance.exposes(name.as_str()))
        {
            action = name;
            args.next();
        }
        debug!(%command, %action, "resolved");

        let positional = match instance.parse(args.collect(), out)? {
            Parsed::Args(positional) => positional,
            Parsed::Halted(flow) => return Ok(flow),
        };

        if !instance.exposes(action.as_str()) {
            return Err(ShebangError::MissingAction { command, action });
        }
        instance.invoke(&action, positional, out)
    }
}
