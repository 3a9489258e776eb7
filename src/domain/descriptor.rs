//! Command descriptor: banner, help topics and flags of one command.

use std::collections::HashSet;

use crate::domain::error::DomainError;
use crate::domain::option::{Opt, OptionConfig};
use crate::domain::Ident;

/// Title of the help topic set by [`CommandDescriptor::usage`].
pub const USAGE_TOPIC: &str = "Usage";

/// Result type for descriptor validation.
pub type DefinitionResult<T> = Result<T, DomainError>;

/// Static metadata of a command.
///
/// Assembled with the builder methods, then handed to
/// [`CommandRegistry::register`](crate::application::CommandRegistry::register),
/// which freezes it for the rest of the process.
///
/// ```ignore
/// CommandDescriptor::new("default")
///     .banner("The default command.")
///     .usage("shebang [COMMAND] [OPTIONS]")
///     .o('v', "version", "Shows the current version", OptionConfig::new().method("version"))
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDescriptor {
    name: Ident,
    banner: Option<String>,
    help_topics: Vec<(String, String)>,
    options: Vec<Opt>,
}

impl CommandDescriptor {
    pub fn new(name: impl Into<Ident>) -> Self {
        Self {
            name: name.into(),
            banner: None,
            help_topics: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Set the banner, leading and trailing whitespace removed.
    pub fn banner(mut self, text: impl AsRef<str>) -> Self {
        self.banner = Some(text.as_ref().trim().to_string());
        self
    }

    /// Shortcut for `help("Usage", text)`.
    pub fn usage(self, text: impl AsRef<str>) -> Self {
        self.help(USAGE_TOPIC, text)
    }

    /// Add a help topic. Declaring a title again replaces its text in place.
    pub fn help(mut self, title: impl Into<String>, text: impl AsRef<str>) -> Self {
        let title = title.into();
        let text = text.as_ref().trim().to_string();

        match self.help_topics.iter_mut().find(|(t, _)| *t == title) {
            Some(topic) => topic.1 = text,
            None => self.help_topics.push((title, text)),
        }
        self
    }

    pub fn option(
        mut self,
        short: impl Into<Ident>,
        long: impl Into<Ident>,
        description: impl Into<String>,
        config: OptionConfig,
    ) -> Self {
        self.options.push(Opt::new(short, long, description, config));
        self
    }

    /// Alias of [`CommandDescriptor::option`].
    pub fn o(
        self,
        short: impl Into<Ident>,
        long: impl Into<Ident>,
        description: impl Into<String>,
        config: OptionConfig,
    ) -> Self {
        self.option(short, long, description, config)
    }

    pub fn name(&self) -> &Ident {
        &self.name
    }

    pub fn banner_text(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn help_topics(&self) -> &[(String, String)] {
        &self.help_topics
    }

    /// Text of a help topic by title.
    pub fn help_topic(&self, title: &str) -> Option<&str> {
        self.help_topics
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, text)| text.as_str())
    }

    pub fn options(&self) -> &[Opt] {
        &self.options
    }

    /// Look up an option by short or long name.
    pub fn find_option(&self, name: &str) -> Option<&Opt> {
        self.options.iter().find(|o| o.answers_to(name))
    }

    /// Check the option invariants: single character short names, long names
    /// that are non-empty words the tokenizer can register, and no name used
    /// twice across shorts and longs.
    pub fn validate(&self) -> DefinitionResult<()> {
        let mut seen: HashSet<&str> = HashSet::new();

        for option in &self.options {
            if option.short().as_short().filter(|c| *c != '-').is_none() {
                return Err(DomainError::InvalidShortName {
                    command: self.name.clone(),
                    name: option.short().clone(),
                });
            }
            let long = option.long().as_str();
            if long.is_empty() {
                return Err(DomainError::EmptyLongName {
                    command: self.name.clone(),
                });
            }
            if long.starts_with('-') || long.contains(|c: char| c.is_whitespace() || c == '=') {
                return Err(DomainError::InvalidLongName {
                    command: self.name.clone(),
                    name: option.long().clone(),
                });
            }
            for name in [option.short(), option.long()] {
                if !seen.insert(name.as_str()) {
                    return Err(DomainError::DuplicateOption {
                        command: self.name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
