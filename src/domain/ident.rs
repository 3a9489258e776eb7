//! Identifiers for commands, actions and flags

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a command, an action or a flag.
///
/// Equality is case-sensitive. Tokens coming from the command line are
/// turned into identifiers with [`Ident::parse_token`], which refuses anything
/// that looks like a flag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ident(String);

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Parse a raw argument into an identifier.
    ///
    /// Returns `None` for empty tokens and tokens starting with `-`.
    pub fn parse_token(raw: &str) -> Option<Self> {
        if raw.is_empty() || is_flag_like(raw) {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The single character of a short flag name, if this is one.
    pub fn as_short(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

/// True if the token would be taken as a flag by the tokenizer.
pub fn is_flag_like(raw: &str) -> bool {
    raw.starts_with('-')
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<char> for Ident {
    fn from(c: char) -> Self {
        Self(c.to_string())
    }
}

impl From<&Ident> for Ident {
    fn from(ident: &Ident) -> Self {
        ident.clone()
    }
}

impl Borrow<str> for Ident {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_plain_word_when_parsing_token_then_returns_ident() {
        assert_eq!(Ident::parse_token("default"), Some(Ident::from("default")));
    }

    #[test]
    fn given_flag_like_token_when_parsing_then_returns_none() {
        assert_eq!(Ident::parse_token("--help"), None);
        assert_eq!(Ident::parse_token("-h"), None);
        assert_eq!(Ident::parse_token("-"), None);
        assert_eq!(Ident::parse_token(""), None);
    }

    #[test]
    fn given_idents_with_different_case_when_comparing_then_not_equal() {
        assert_ne!(Ident::from("Index"), Ident::from("index"));
    }

    #[test]
    fn test_as_short() {
        assert_eq!(Ident::from('h').as_short(), Some('h'));
        assert_eq!(Ident::from("help").as_short(), None);
        assert_eq!(Ident::from("").as_short(), None);
    }
}
