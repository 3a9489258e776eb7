//! Flag definitions and their values

use std::fmt;

use crate::domain::Ident;

/// Label shown after a long flag that expects a value.
pub const DEFAULT_VALUE_KEY: &str = "VALUE";

/// Kind of value a flag captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    /// Boolean switch, no value.
    #[default]
    Flag,
    String,
    Integer,
    Float,
    /// Comma separated list (`--tags a,b,c`).
    List,
}

impl ValueType {
    pub fn is_flag(&self) -> bool {
        matches!(self, ValueType::Flag)
    }
}

/// A value captured for a flag, or declared as its default.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
    Int(i64),
    Float(f64),
    List(Vec<String>),
}

impl OptionValue {
    /// False for empty strings and empty lists.
    pub fn has_value(&self) -> bool {
        match self {
            OptionValue::Str(s) => !s.is_empty(),
            OptionValue::List(items) => !items.is_empty(),
            OptionValue::Bool(_) | OptionValue::Int(_) | OptionValue::Float(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Str(s) => f.write_str(s),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Float(x) => write!(f, "{x}"),
            OptionValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        OptionValue::Float(x)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(items: Vec<String>) -> Self {
        OptionValue::List(items)
    }
}

/// Optional settings of a flag.
///
/// ```ignore
/// OptionConfig::new().value_type(ValueType::String).required(true).default_value("Shebang")
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionConfig {
    pub value_type: ValueType,
    pub key: String,
    pub method: Option<Ident>,
    pub required: bool,
    pub default: Option<OptionValue>,
}

impl Default for OptionConfig {
    fn default() -> Self {
        Self {
            value_type: ValueType::Flag,
            key: DEFAULT_VALUE_KEY.to_string(),
            method: None,
            required: false,
            default: None,
        }
    }
}

impl OptionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Action to invoke whenever the flag is given.
    pub fn method(mut self, method: impl Into<Ident>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Registration data handed to the flag tokenizer for one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// `-h`
    pub short: String,
    /// `--help`, or `--name VALUE` for flags that take a value
    pub long: String,
    pub description: Option<String>,
    pub value_type: ValueType,
}

impl FlagSpec {
    /// Long name without dashes and value key.
    pub fn long_name(&self) -> &str {
        let long = self.long.trim_start_matches("--");
        long.split_once(' ').map_or(long, |(name, _)| name)
    }

    /// Value key of the long form, if any.
    pub fn value_key(&self) -> Option<&str> {
        self.long.split_once(' ').map(|(_, key)| key)
    }

    pub fn short_char(&self) -> Option<char> {
        let mut chars = self.short.trim_start_matches('-').chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

/// A single command line flag.
///
/// The short and long names are aliases of the same value. The definition is
/// immutable; values captured at runtime belong to the command instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Opt {
    short: Ident,
    long: Ident,
    description: Option<String>,
    config: OptionConfig,
}

impl Opt {
    pub fn new(
        short: impl Into<Ident>,
        long: impl Into<Ident>,
        description: impl Into<String>,
        config: OptionConfig,
    ) -> Self {
        let description = description.into();
        Self {
            short: short.into(),
            long: long.into(),
            description: (!description.is_empty()).then_some(description),
            config,
        }
    }

    pub fn short(&self) -> &Ident {
        &self.short
    }

    pub fn long(&self) -> &Ident {
        &self.long
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn value_type(&self) -> ValueType {
        self.config.value_type
    }

    pub fn key(&self) -> &str {
        &self.config.key
    }

    pub fn method(&self) -> Option<&Ident> {
        self.config.method.as_ref()
    }

    pub fn default_value(&self) -> Option<&OptionValue> {
        self.config.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.config.required
    }

    /// True if `name` is this option's short or long name.
    pub fn answers_to(&self, name: &str) -> bool {
        self.short == name || self.long == name
    }

    pub fn to_tokenizer_spec(&self) -> FlagSpec {
        let mut long = format!("--{}", self.long);
        if !self.config.value_type.is_flag() {
            long.push(' ');
            long.push_str(&self.config.key);
        }

        FlagSpec {
            short: format!("-{}", self.short),
            long,
            description: self.description.clone(),
            value_type: self.config.value_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_new_option_when_created_then_uses_defaults() {
        let option = Opt::new('h', "help", "help message", OptionConfig::new().method("test"));

        assert_eq!(option.short(), &Ident::from("h"));
        assert_eq!(option.long(), &Ident::from("help"));
        assert_eq!(option.description(), Some("help message"));
        assert_eq!(option.method(), Some(&Ident::from("test")));
        assert_eq!(option.value_type(), ValueType::Flag);
        assert_eq!(option.key(), "VALUE");
        assert!(!option.is_required());
        assert!(option.default_value().is_none());
    }

    #[test]
    fn given_boolean_option_when_converting_then_renders_plain_long_form() {
        let option = Opt::new('h', "help", "help message", OptionConfig::new().method("test"));

        assert_eq!(
            option.to_tokenizer_spec(),
            FlagSpec {
                short: "-h".into(),
                long: "--help".into(),
                description: Some("help message".into()),
                value_type: ValueType::Flag,
            }
        );
    }

    #[test]
    fn given_typed_option_when_converting_then_appends_value_key() {
        let option = Opt::new(
            'n',
            "name",
            "A person's name",
            OptionConfig::new().value_type(ValueType::String),
        );
        let spec = option.to_tokenizer_spec();

        assert_eq!(spec.long, "--name VALUE");
        assert_eq!(spec.long_name(), "name");
        assert_eq!(spec.value_key(), Some("VALUE"));
        assert_eq!(spec.short_char(), Some('n'));
    }

    #[test]
    fn given_custom_key_when_converting_then_uses_it() {
        let option = Opt::new(
            'l',
            "list",
            "",
            OptionConfig::new().value_type(ValueType::List).key("ITEMS"),
        );
        let spec = option.to_tokenizer_spec();

        assert_eq!(spec.long, "--list ITEMS");
        assert_eq!(spec.description, None);
    }

    #[test]
    fn test_has_value() {
        assert!(!OptionValue::from("").has_value());
        assert!(!OptionValue::List(vec![]).has_value());
        assert!(OptionValue::from("x").has_value());
        assert!(OptionValue::from(false).has_value());
        assert!(OptionValue::from(0_i64).has_value());
    }

    #[test]
    fn test_answers_to() {
        let option = Opt::new('v', "version", "", OptionConfig::new());
        assert!(option.answers_to("v"));
        assert!(option.answers_to("version"));
        assert!(!option.answers_to("verbose"));
    }
}
