//! Command registry: name -> descriptor + factory

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::command::{Command, CommandInstance, Runnable};
use crate::application::error::{ShebangError, ShebangResult};
use crate::config::Settings;
use crate::domain::{CommandDescriptor, Ident};

type Factory = Box<dyn Fn(Arc<CommandDescriptor>, &Settings) -> Box<dyn Runnable> + Send + Sync>;

struct Entry {
    descriptor: Arc<CommandDescriptor>,
    factory: Factory,
}

/// All known commands.
///
/// Filled once at start-up, then only read by the dispatcher.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<Ident, Entry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its descriptor's name.
    ///
    /// Fails if the name is taken or if the descriptor's options are invalid.
    /// `factory` builds a fresh command value for every dispatch.
    #[instrument(level = "debug", skip_all, fields(command = %descriptor.name()))]
    pub fn register<C, F>(&mut self, descriptor: CommandDescriptor, factory: F) -> ShebangResult<()>
    where
        C: Command,
        F: Fn() -> C + Send + Sync + 'static,
    {
        if self.commands.contains_key(descriptor.name()) {
            return Err(ShebangError::DuplicateCommand(descriptor.name().clone()));
        }
        descriptor.validate()?;

        let name = descriptor.name().clone();
        let factory: Factory = Box::new(
            move |descriptor: Arc<CommandDescriptor>, settings: &Settings| -> Box<dyn Runnable> {
                Box::new(CommandInstance::new(factory(), descriptor, settings))
            },
        );
        self.commands.insert(
            name,
            Entry {
                descriptor: Arc::new(descriptor),
                factory,
            },
        );
        debug!("command registered");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name).map(|entry| entry.descriptor.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &Ident> {
        self.commands.keys()
    }

    /// Build a new instance of the named command.
    pub fn instantiate(&self, name: &str, settings: &Settings) -> Option<Box<dyn Runnable>> {
        self.commands
            .get(name)
            .map(|entry| (entry.factory)(Arc::clone(&entry.descriptor), settings))
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
