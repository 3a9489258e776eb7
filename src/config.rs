//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/shebang/shebang.toml`
//! 3. Application config: file passed to [`Settings::load`]
//! 4. Environment variables: `SHEBANG_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ShebangError, ShebangResult};
use crate::domain::Ident;

/// What happens to errors caused by user input at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Return the error to the caller.
    #[default]
    Raise,
    /// Print `Error: <message>` to the error stream and end the invocation.
    Print,
}

/// Whether options declared as required must be given a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredPolicy {
    #[default]
    Enforce,
    Ignore,
}

impl FromStr for ErrorPolicy {
    type Err = ShebangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raise" => Ok(ErrorPolicy::Raise),
            "print" => Ok(ErrorPolicy::Print),
            other => Err(ShebangError::Config {
                message: format!("unknown error policy: {other}"),
            }),
        }
    }
}

impl FromStr for RequiredPolicy {
    type Err = ShebangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enforce" => Ok(RequiredPolicy::Enforce),
            "ignore" => Ok(RequiredPolicy::Ignore),
            other => Err(ShebangError::Config {
                message: format!("unknown required policy: {other}"),
            }),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Raise => f.write_str("raise"),
            ErrorPolicy::Print => f.write_str("print"),
        }
    }
}

/// Process-wide dispatch settings. Set once, before the first dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Command used when the arguments do not name one
    pub default_command: Ident,
    /// Action used when the arguments do not name one
    pub default_action: Ident,
    /// Inserted before help topic text
    pub indent: String,
    /// Heading of help sections; `{}` is replaced by the title
    pub heading: String,
    pub error_policy: ErrorPolicy,
    pub required_policy: RequiredPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_command: Ident::from("default"),
            default_action: Ident::from("index"),
            indent: "  ".into(),
            heading: "\n{}:\n".into(),
            error_policy: ErrorPolicy::default(),
            required_policy: RequiredPolicy::default(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub default_command: Option<Ident>,
    pub default_action: Option<Ident>,
    pub indent: Option<String>,
    pub heading: Option<String>,
    pub error_policy: Option<ErrorPolicy>,
    pub required_policy: Option<RequiredPolicy>,
}

/// Get the XDG config directory for shebang.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "shebang").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("shebang.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ShebangResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ShebangError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ShebangError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Render a section heading for `title`.
    pub fn heading(&self, title: &str) -> String {
        self.heading.replacen("{}", title, 1)
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            default_command: overlay
                .default_command
                .clone()
                .unwrap_or_else(|| self.default_command.clone()),
            default_action: overlay
                .default_action
                .clone()
                .unwrap_or_else(|| self.default_action.clone()),
            indent: overlay.indent.clone().unwrap_or_else(|| self.indent.clone()),
            heading: overlay
                .heading
                .clone()
                .unwrap_or_else(|| self.heading.clone()),
            error_policy: overlay.error_policy.unwrap_or(self.error_policy),
            required_policy: overlay.required_policy.unwrap_or(self.required_policy),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `path` - Optional application config file; must exist if given
    pub fn load(path: Option<&Path>) -> ShebangResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = path {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Load defaults overlaid with a single file, ignoring global config and
    /// environment.
    pub fn from_file(path: &Path) -> ShebangResult<Self> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply SHEBANG_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ShebangResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SHEBANG")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("default_command") {
            settings.default_command = Ident::from(val);
        }
        if let Ok(val) = config.get_string("default_action") {
            settings.default_action = Ident::from(val);
        }
        if let Ok(val) = config.get_string("indent") {
            settings.indent = val;
        }
        if let Ok(val) = config.get_string("heading") {
            settings.heading = val;
        }
        if let Ok(val) = config.get_string("error_policy") {
            settings.error_policy = val.parse()?;
        }
        if let Ok(val) = config.get_string("required_policy") {
            settings.required_policy = val.parse()?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ShebangResult<String> {
        toml::to_string_pretty(self).map_err(|e| ShebangError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# shebang configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/shebang/shebang.toml
#   App:    file passed by the application
#   Env:    SHEBANG_* environment variables

# Command run when none is given on the command line
# default_command = "default"

# Action run when none is given on the command line
# default_action = "index"

# Indentation of help topic text
# indent = "  "

# Heading of help sections, {} is replaced by the title
# heading = "\n{}:\n"

# "raise" returns errors to the caller, "print" writes them to stderr
# error_policy = "raise"

# "enforce" rejects missing required options, "ignore" does not
# required_policy = "enforce"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ShebangError {
    ShebangError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_matches_conventions() {
        let settings = Settings::default();
        assert_eq!(settings.default_command, "default");
        assert_eq!(settings.default_action, "index");
        assert_eq!(settings.indent, "  ");
        assert_eq!(settings.error_policy, ErrorPolicy::Raise);
        assert_eq!(settings.required_policy, RequiredPolicy::Enforce);
    }

    #[test]
    fn given_default_heading_when_rendering_then_wraps_title() {
        assert_eq!(Settings::default().heading("Usage"), "\nUsage:\n");
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_values() {
        let overlay = RawSettings {
            default_action: Some(Ident::from("run")),
            error_policy: Some(ErrorPolicy::Print),
            ..RawSettings::default()
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.default_action, "run");
        assert_eq!(merged.error_policy, ErrorPolicy::Print);
        assert_eq!(merged.default_command, "default");
        assert_eq!(merged.heading, "\n{}:\n");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("PRINT".parse::<ErrorPolicy>().unwrap(), ErrorPolicy::Print);
        assert_eq!("ignore".parse::<RequiredPolicy>().unwrap(), RequiredPolicy::Ignore);
        assert!("explode".parse::<ErrorPolicy>().is_err());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_through_toml() {
        let settings = Settings {
            error_policy: ErrorPolicy::Print,
            ..Settings::default()
        };
        let text = settings.to_toml().unwrap();
        assert!(text.contains("error_policy = \"print\""));

        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.default_command.is_none());
    }
}
