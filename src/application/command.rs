//! Command runtime: actions, invocation context and per-dispatch instances

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::error::{ShebangError, ShebangResult};
use crate::config::{RequiredPolicy, Settings};
use crate::domain::{CommandDescriptor, Ident, Opt, OptionValue};
use crate::exitcode;
use crate::infrastructure::parser::{FlagParser, SeenFlag};

/// Name of the built-in action that prints the help text.
pub const HELP_ACTION: &str = "help";

/// What the dispatcher should do after an action returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Carry on; after the main action this means the invocation succeeded.
    Continue,
    /// End the invocation now with the given exit code.
    Exit(i32),
}

impl Flow {
    pub fn is_exit(&self) -> bool {
        matches!(self, Flow::Exit(_))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Flow::Continue => exitcode::OK,
            Flow::Exit(code) => *code,
        }
    }
}

/// A user-defined command.
///
/// ```ignore
/// #[derive(Default)]
/// struct Greet;
///
/// impl Command for Greet {
///     fn actions() -> Actions<Self> {
///         Actions::new().action("index", Self::index)
///     }
/// }
/// ```
pub trait Command: 'static {
    /// Table of the actions this command exposes.
    fn actions() -> Actions<Self>
    where
        Self: Sized;
}

type ActionFn<C> = Box<dyn Fn(&mut C, &mut Context<'_>) -> ShebangResult<Flow>>;

/// Named actions of a command, in declaration order.
pub struct Actions<C> {
    entries: Vec<(Ident, ActionFn<C>)>,
}

impl<C> Default for Actions<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> Actions<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action. A later action with the same name replaces the earlier one.
    pub fn action<F>(mut self, name: impl Into<Ident>, action: F) -> Self
    where
        F: Fn(&mut C, &mut Context<'_>) -> ShebangResult<Flow> + 'static,
    {
        let name = name.into();
        self.entries.retain(|(n, _)| *n != name);
        self.entries.push((name, Box::new(action)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ActionFn<C>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, action)| action)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &Ident> {
        self.entries.iter().map(|(n, _)| n)
    }
}

impl<C> fmt::Debug for Actions<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Flag values of one command instance, keyed by short and long name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionValues {
    values: HashMap<Ident, OptionValue>,
}

impl OptionValues {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Store a value under both names of the option.
    pub fn set(&mut self, option: &Opt, value: OptionValue) {
        self.values.insert(option.short().clone(), value.clone());
        self.values.insert(option.long().clone(), value);
    }

    pub fn has_value(&self, option: &Opt) -> bool {
        self.get(option.long().as_str())
            .is_some_and(OptionValue::has_value)
    }
}

/// Everything an action gets to see while it runs.
pub struct Context<'a> {
    command: &'a Ident,
    action: &'a Ident,
    args: &'a [String],
    value: Option<&'a OptionValue>,
    values: &'a OptionValues,
    help: &'a str,
    out: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    pub fn command(&self) -> &Ident {
        self.command
    }

    pub fn action(&self) -> &Ident {
        self.action
    }

    /// Positional arguments left after flag parsing; empty for flag callbacks.
    pub fn args(&self) -> &[String] {
        self.args
    }

    /// Value captured for the flag that triggered this action, if any.
    pub fn value(&self) -> Option<&OptionValue> {
        self.value
    }

    /// Value of a flag by short or long name.
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn help_text(&self) -> &str {
        self.help
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }
}

/// Outcome of flag parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Leftover positional arguments.
    Args(Vec<String>),
    /// A flag callback ended the invocation.
    Halted(Flow),
}

/// Type-erased command instance, as created by the registry.
pub trait Runnable {
    fn name(&self) -> &Ident;

    /// True if `action` can be invoked on this instance.
    fn exposes(&self, action: &str) -> bool;

    fn parse(&mut self, args: Vec<String>, out: &mut dyn Write) -> ShebangResult<Parsed>;

    fn invoke(
        &mut self,
        action: &Ident,
        args: Vec<String>,
        out: &mut dyn Write,
    ) -> ShebangResult<Flow>;

    fn option(&self, name: &str) -> Option<&OptionValue>;

    fn help(&self) -> &str;
}

/// A command together with its flag values, created fresh for each dispatch.
pub struct CommandInstance<C: Command> {
    command: C,
    actions: Actions<C>,
    descriptor: Arc<CommandDescriptor>,
    values: OptionValues,
    parser: FlagParser,
    help: String,
    default_action: Ident,
    required_policy: RequiredPolicy,
}

impl<C: Command> CommandInstance<C> {
    /// Configure the flag tokenizer from the descriptor and fill in defaults.
    pub fn new(command: C, descriptor: Arc<CommandDescriptor>, settings: &Settings) -> Self {
        let mut parser = FlagParser::new(descriptor.name().as_str());
        if let Some(banner) = descriptor.banner_text() {
            parser.banner(banner);
        }
        for (title, text) in descriptor.help_topics() {
            parser.separator(format!("{}{}{}", settings.heading(title), settings.indent, text));
        }
        parser.separator(settings.heading("Options"));

        let mut values = OptionValues::default();
        for option in descriptor.options() {
            parser.on(option.to_tokenizer_spec());
            if let Some(default) = option.default_value() {
                values.set(option, default.clone());
            }
        }
        let help = parser.help();

        Self {
            command,
            actions: C::actions(),
            descriptor,
            values,
            parser,
            help,
            default_action: settings.default_action.clone(),
            required_policy: settings.required_policy,
        }
    }

    pub fn command(&self) -> &C {
        &self.command
    }

    /// Store each flag value and run its bound method, once per occurrence.
    ///
    /// Returns the flow of the first callback that ends the invocation.
    fn apply_flags(
        &mut self,
        seen: Vec<SeenFlag>,
        out: &mut dyn Write,
    ) -> ShebangResult<Option<Flow>> {
        let descriptor = Arc::clone(&self.descriptor);
        for flag in seen {
            let Some(option) = descriptor.options().iter().find(|o| *o.long() == flag.long.as_str())
            else {
                continue;
            };
            debug!(flag = %option.long(), value = %flag.value, "flag seen");
            self.values.set(option, flag.value.clone());

            let Some(method) = option.method() else {
                continue;
            };
            if !self.exposes(method.as_str()) {
                debug!(%method, "bound method not exposed, skipping");
                continue;
            }
            let flow = self.call(method, &[], Some(&flag.value), out)?;
            if flow.is_exit() {
                debug!(%method, "flag callback ended the invocation");
                return Ok(Some(flow));
            }
        }
        Ok(None)
    }

    fn call(
        &mut self,
        action: &Ident,
        args: &[String],
        value: Option<&OptionValue>,
        out: &mut dyn Write,
    ) -> ShebangResult<Flow> {
        let Self {
            command,
            actions,
            descriptor,
            values,
            help,
            default_action,
            ..
        } = self;

        let mut ctx = Context {
            command: descriptor.name(),
            action,
            args,
            value,
            values: &*values,
            help: help.as_str(),
            out,
        };

        if let Some(f) = actions.get(action.as_str()) {
            return f(command, &mut ctx);
        }
        if action == HELP_ACTION {
            let text = ctx.help;
            ctx.out().write_all(text.as_bytes())?;
            return Ok(Flow::Exit(exitcode::OK));
        }
        if *action == *default_action {
            return Err(ShebangError::NotImplemented(action.clone()));
        }
        Err(ShebangError::MissingAction {
            command: descriptor.name().clone(),
            action: action.clone(),
        })
    }
}

impl<C: Command> Runnable for CommandInstance<C> {
    fn name(&self) -> &Ident {
        self.descriptor.name()
    }

    fn exposes(&self, action: &str) -> bool {
        self.actions.contains(action) || action == HELP_ACTION || self.default_action == action
    }

    #[instrument(level = "debug", skip(self, out), fields(command = %self.descriptor.name()))]
    fn parse(&mut self, args: Vec<String>, out: &mut dyn Write) -> ShebangResult<Parsed> {
        let output = match self.parser.parse(&args) {
            Ok(output) => output,
            Err(failure) => {
                // A callback that ends the invocation wins over the bad argument.
                if let Some(flow) = self.apply_flags(failure.recognized, out)? {
                    return Ok(Parsed::Halted(flow));
                }
                return Err(ShebangError::InvalidArguments(failure.message));
            }
        };

        if let Some(flow) = self.apply_flags(output.seen, out)? {
            return Ok(Parsed::Halted(flow));
        }

        if self.required_policy == RequiredPolicy::Enforce {
            if let Some(missing) = self
                .descriptor
                .options()
                .iter()
                .find(|o| o.is_required() && !self.values.has_value(o))
            {
                return Err(ShebangError::MissingRequiredOption(missing.short().clone()));
            }
        }

        Ok(Parsed::Args(output.positional))
    }

    #[instrument(level = "debug", skip(self, args, out), fields(command = %self.descriptor.name()))]
    fn invoke(
        &mut self,
        action: &Ident,
        args: Vec<String>,
        out: &mut dyn Write,
    ) -> ShebangResult<Flow> {
        self.call(action, &args, None, out)
    }

    fn option(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    fn help(&self) -> &str {
        &self.help
    }
}
