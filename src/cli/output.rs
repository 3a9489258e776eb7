//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::fmt::Display;

use colored::Colorize;

/// Error message with a red bold `Error:` marker.
pub fn error_line(msg: &(impl Display + ?Sized)) -> String {
    format!("{} {}", "Error:".red().bold(), msg)
}

/// Print error (red bold "Error:" prefix) to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}", error_line(msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_message_when_formatted_then_marked_as_error() {
        colored::control::set_override(false);
        assert_eq!(error_line("test"), "Error: test");
    }
}
