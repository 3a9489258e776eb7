//! Flag tokenizer backed by clap's builder API
//!
//! Commands register a banner, separator lines and one [`FlagSpec`] per
//! option. Parsing hands back the flags seen on the command line, in the order
//! they appeared, plus the leftover positional arguments.

use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, ColorChoice, Command};

use crate::domain::{FlagSpec, OptionValue, ValueType};

const POSITIONAL_ID: &str = "__positional";

/// A flag recognized during parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenFlag {
    /// Long name of the flag (its registration id).
    pub long: String,
    pub value: OptionValue,
}

/// Result of running the tokenizer over an argument list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseOutput {
    /// One entry per occurrence, in command line order.
    pub seen: Vec<SeenFlag>,
    pub positional: Vec<String>,
}

/// Tokenizer failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    pub message: String,
    /// Flags recognized before the offending argument.
    pub recognized: Vec<SeenFlag>,
}

/// Flag tokenizer configuration for one command.
#[derive(Debug, Clone, Default)]
pub struct FlagParser {
    name: String,
    banner: Option<String>,
    separators: Vec<String>,
    flags: Vec<FlagSpec>,
}

impl FlagParser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn banner(&mut self, text: impl Into<String>) {
        self.banner = Some(text.into());
    }

    /// Add a free text line to the help output, before the flag listing.
    pub fn separator(&mut self, line: impl Into<String>) {
        self.separators.push(line.into());
    }

    /// Register a flag.
    pub fn on(&mut self, spec: FlagSpec) {
        self.flags.push(spec);
    }

    /// Banner, separators, then the flag listing as rendered by clap.
    pub fn help(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        if let Some(banner) = self.banner.as_deref().filter(|b| !b.is_empty()) {
            lines.push(banner);
        }
        lines.extend(self.separators.iter().map(String::as_str));

        let mut help = lines.join("\n");
        if !help.is_empty() && !help.ends_with('\n') {
            help.push('\n');
        }

        let listing = self
            .command(Mode::Listing)
            .help_template("{options}")
            .render_help()
            .to_string();
        help.push_str(&listing);
        if !help.ends_with('\n') {
            help.push('\n');
        }
        help
    }

    /// Parse `args`, which must not include the program name.
    ///
    /// On failure the flags before the offending argument are still reported,
    /// so their callbacks can run the way they would have up to that point.
    pub fn parse(&self, args: &[String]) -> Result<ParseOutput, ParseFailure> {
        let command = self.command(Mode::Parsing);
        match command.clone().try_get_matches_from(args) {
            Ok(matches) => Ok(self.collect(&matches)),
            Err(e) => {
                let recognized = (0..args.len())
                    .rev()
                    .find_map(|cut| command.clone().try_get_matches_from(&args[..cut]).ok())
                    .map(|matches| self.collect(&matches).seen)
                    .unwrap_or_default();
                Err(ParseFailure {
                    message: describe_error(&e),
                    recognized,
                })
            }
        }
    }

    fn collect(&self, matches: &ArgMatches) -> ParseOutput {
        let mut seen: Vec<(usize, usize, SeenFlag)> = Vec::new();
        for (position, spec) in self.flags.iter().enumerate() {
            let id = spec.long_name();
            if matches.value_source(id) != Some(ValueSource::CommandLine) {
                continue;
            }
            let indices: Vec<usize> = matches
                .indices_of(id)
                .map(|indices| indices.collect())
                .unwrap_or_default();

            // Each value carries its own index; an occurrence starts at its first value.
            let mut offset = 0;
            for (count, value) in occurrences(matches, id, spec.value_type) {
                let index = indices.get(offset).copied().unwrap_or(usize::MAX);
                offset += count;
                seen.push((
                    index,
                    position,
                    SeenFlag {
                        long: id.to_string(),
                        value,
                    },
                ));
            }
        }
        seen.sort_by_key(|(index, position, _)| (*index, *position));

        let positional = matches
            .get_many::<String>(POSITIONAL_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        ParseOutput {
            seen: seen.into_iter().map(|(_, _, flag)| flag).collect(),
            positional,
        }
    }

    fn command(&self, mode: Mode) -> Command {
        let mut cmd = Command::new(self.name.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .color(ColorChoice::Never)
            .arg(
                Arg::new(POSITIONAL_ID)
                    .action(ArgAction::Append)
                    .num_args(0..)
                    .allow_negative_numbers(true)
                    .hide(true),
            );

        for spec in &self.flags {
            cmd = cmd.arg(to_arg(spec, mode));
        }
        cmd
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Every occurrence is kept.
    Parsing,
    /// Plain switches, so the listing shows no value placeholder for them.
    Listing,
}

fn to_arg(spec: &FlagSpec, mode: Mode) -> Arg {
    let mut arg = Arg::new(spec.long_name().to_string()).long(spec.long_name().to_string());
    if let Some(short) = spec.short_char() {
        arg = arg.short(short);
    }
    if let Some(description) = &spec.description {
        arg = arg.help(description.clone());
    }
    if let Some(key) = spec.value_key() {
        arg = arg.value_name(key.to_string());
    }

    match (spec.value_type, mode) {
        (ValueType::Flag, Mode::Listing) => arg.action(ArgAction::SetTrue),
        // `-xvf` still works: with require_equals and no minimum the attached
        // rest of a short cluster is not taken as a value.
        (ValueType::Flag, Mode::Parsing) => arg
            .action(ArgAction::Append)
            .value_parser(value_parser!(bool))
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true"),
        (ValueType::String, _) => arg.action(ArgAction::Append),
        (ValueType::Integer, _) => arg.action(ArgAction::Append).value_parser(value_parser!(i64)),
        (ValueType::Float, _) => arg.action(ArgAction::Append).value_parser(value_parser!(f64)),
        (ValueType::List, _) => arg.action(ArgAction::Append).value_delimiter(','),
    }
}

/// Values per occurrence, with the number of clap values each one spans.
fn occurrences(matches: &ArgMatches, id: &str, value_type: ValueType) -> Vec<(usize, OptionValue)> {
    match value_type {
        ValueType::Flag => grouped::<bool>(matches, id)
            .into_iter()
            .map(|group| (group.len(), OptionValue::Bool(group.first().copied().unwrap_or(true))))
            .collect(),
        ValueType::String => single(grouped::<String>(matches, id), OptionValue::Str),
        ValueType::Integer => single(grouped::<i64>(matches, id), OptionValue::Int),
        ValueType::Float => single(grouped::<f64>(matches, id), OptionValue::Float),
        ValueType::List => grouped::<String>(matches, id)
            .into_iter()
            .map(|group| (group.len(), OptionValue::List(group)))
            .collect(),
    }
}

fn grouped<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Vec<Vec<T>> {
    matches
        .get_occurrences::<T>(id)
        .map(|occurrences| {
            occurrences
                .map(|values| values.cloned().collect())
                .collect()
        })
        .unwrap_or_default()
}

fn single<T>(groups: Vec<Vec<T>>, wrap: fn(T) -> OptionValue) -> Vec<(usize, OptionValue)> {
    groups
        .into_iter()
        .filter_map(|group| {
            let count = group.len();
            group.into_iter().next().map(|value| (count, wrap(value)))
        })
        .collect()
}

/// First line of clap's message, without its `error:` prefix.
fn describe_error(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.trim_start_matches("error:").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn spec(short: &str, long: &str, desc: Option<&str>, value_type: ValueType) -> FlagSpec {
        FlagSpec {
            short: short.into(),
            long: long.into(),
            description: desc.map(String::from),
            value_type,
        }
    }

    fn parser() -> FlagParser {
        let mut parser = FlagParser::new("default");
        parser.banner("The default command.");
        parser.separator("\nUsage:\n  shebang [OPTIONS]");
        parser.separator("\nOptions:\n");
        parser.on(spec("-h", "--help", Some("Shows this help message"), ValueType::Flag));
        parser.on(spec("-n", "--name VALUE", Some("A name"), ValueType::String));
        parser.on(spec("-c", "--count VALUE", None, ValueType::Integer));
        parser.on(spec("-t", "--tags TAGS", None, ValueType::List));
        parser
    }

    #[test]
    fn given_flags_and_positionals_when_parsing_then_separates_them() {
        let output = parser()
            .parse(&args(&["one", "--name", "Yorick", "two", "-h"]))
            .unwrap();

        assert_eq!(output.positional, args(&["one", "two"]));
        assert_eq!(
            output.seen,
            vec![
                SeenFlag {
                    long: "name".into(),
                    value: OptionValue::Str("Yorick".into())
                },
                SeenFlag {
                    long: "help".into(),
                    value: OptionValue::Bool(true)
                },
            ]
        );
    }

    #[test]
    fn given_typed_values_when_parsing_then_converts_them() {
        let output = parser()
            .parse(&args(&["-c", "42", "--tags", "a,b"]))
            .unwrap();

        assert_eq!(output.seen[0].value, OptionValue::Int(42));
        assert_eq!(
            output.seen[1].value,
            OptionValue::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn given_unknown_flag_when_parsing_then_fails() {
        let err = parser().parse(&args(&["--bogus"])).unwrap_err();
        assert!(err.message.contains("--bogus"), "unexpected message: {}", err.message);
        assert!(err.recognized.is_empty());
    }

    #[test]
    fn given_bad_flag_after_good_ones_when_parsing_then_reports_flags_before_it() {
        let err = parser()
            .parse(&args(&["-n", "Yorick", "-h", "--bogus", "-c", "1"]))
            .unwrap_err();

        let longs: Vec<&str> = err.recognized.iter().map(|f| f.long.as_str()).collect();
        assert_eq!(longs, vec!["name", "help"]);
    }

    #[test]
    fn given_repeated_flags_when_parsing_then_reports_every_occurrence_in_order() {
        let output = parser()
            .parse(&args(&["-h", "--name", "a", "--help", "-n", "b"]))
            .unwrap();

        assert_eq!(
            output.seen,
            vec![
                SeenFlag {
                    long: "help".into(),
                    value: OptionValue::Bool(true)
                },
                SeenFlag {
                    long: "name".into(),
                    value: OptionValue::Str("a".into())
                },
                SeenFlag {
                    long: "help".into(),
                    value: OptionValue::Bool(true)
                },
                SeenFlag {
                    long: "name".into(),
                    value: OptionValue::Str("b".into())
                },
            ]
        );
    }

    #[test]
    fn given_repeated_list_flag_when_parsing_then_keeps_occurrences_apart() {
        let output = parser()
            .parse(&args(&["--tags", "a,b", "-h", "-t", "c"]))
            .unwrap();

        let values: Vec<&OptionValue> = output.seen.iter().map(|f| &f.value).collect();
        assert_eq!(
            values,
            vec![
                &OptionValue::List(vec!["a".into(), "b".into()]),
                &OptionValue::Bool(true),
                &OptionValue::List(vec!["c".into()]),
            ]
        );
    }

    #[test]
    fn given_switch_followed_by_word_when_parsing_then_word_is_positional() {
        let output = parser().parse(&args(&["-h", "word"])).unwrap();

        assert_eq!(output.positional, args(&["word"]));
        assert_eq!(output.seen.len(), 1);
    }

    #[test]
    fn given_invalid_integer_when_parsing_then_fails() {
        assert!(parser().parse(&args(&["--count", "many"])).is_err());
    }

    #[test]
    fn given_no_args_when_parsing_then_returns_nothing() {
        assert_eq!(parser().parse(&[]).unwrap(), ParseOutput::default());
    }

    #[test]
    fn given_configured_parser_when_rendering_help_then_lists_sections_in_order() {
        let help = parser().help();

        let banner = help.find("The default command.").unwrap();
        let usage = help.find("Usage:").unwrap();
        let options = help.find("Options:").unwrap();
        let flag = help.find("--help").unwrap();
        assert!(banner < usage && usage < options && options < flag);
        assert!(help.contains("Shows this help message"));
        assert!(help.contains("--name <VALUE>") || help.contains("--name VALUE"));
        assert!(!help.contains(POSITIONAL_ID));
        assert!(!help.contains("--help["));
    }
}
