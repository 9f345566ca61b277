//! Dash-delimited state paths.
//!
//! A path is a main state token followed by zero or more sub-state tokens,
//! written `main-sub-subsub`. Every token is a non-empty run of `a-z`.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between path tokens.
pub const SEPARATOR: &str = "-";

/// Errors produced when parsing state path text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("State path is empty")]
    Empty,

    #[error("State path has an empty token at position {position}")]
    EmptyToken { position: usize },

    #[error("State path token '{token}' at position {position} contains '{character}', only a-z is allowed")]
    InvalidCharacter {
        token: String,
        character: char,
        position: usize,
    },
}

impl From<Infallible> for FormatError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Validated identifier of one state slot.
///
/// Paths compare, hash, and order by their token sequence. The text form
/// produced by `Display` is the exact inverse of parsing.
///
/// # Example
///
/// ```rust
/// use stateflow::core::StatePath;
///
/// let path: StatePath = "door-lock-status".parse().unwrap();
/// assert_eq!(path.main(), "door");
/// assert_eq!(path.sub_states(), &["lock".to_string(), "status".to_string()]);
/// assert_eq!(path.to_string(), "door-lock-status");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatePath {
    tokens: Vec<String>,
}

impl StatePath {
    /// Parse path text, validating every token.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        if text.is_empty() {
            return Err(FormatError::Empty);
        }

        let tokens = text
            .split(SEPARATOR)
            .enumerate()
            .map(|(position, token)| validate_token(token, position).map(|_| token.to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tokens })
    }

    /// The main state token.
    pub fn main(&self) -> &str {
        &self.tokens[0]
    }

    /// Tokens following the main state.
    pub fn sub_states(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// All tokens, main state first.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens in the path.
    pub fn depth(&self) -> usize {
        self.tokens.len()
    }

    /// The enclosing path, or `None` for a main-only path.
    pub fn parent(&self) -> Option<StatePath> {
        if self.tokens.len() < 2 {
            return None;
        }
        Some(Self {
            tokens: self.tokens[..self.tokens.len() - 1].to_vec(),
        })
    }

    /// Check whether this path equals `ancestor` or lies beneath it.
    pub fn is_within(&self, ancestor: &StatePath) -> bool {
        self.tokens.starts_with(&ancestor.tokens)
    }
}

fn validate_token(token: &str, position: usize) -> Result<(), FormatError> {
    if token.is_empty() {
        return Err(FormatError::EmptyToken { position });
    }
    match token.chars().find(|c| !c.is_ascii_lowercase()) {
        Some(character) => Err(FormatError::InvalidCharacter {
            token: token.to_string(),
            character,
            position,
        }),
        None => Ok(()),
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(SEPARATOR))
    }
}

impl FromStr for StatePath {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for StatePath {
    type Error = FormatError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for StatePath {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&String> for StatePath {
    type Error = FormatError;

    fn try_from(value: &String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<&StatePath> for StatePath {
    fn from(path: &StatePath) -> Self {
        path.clone()
    }
}

impl From<StatePath> for String {
    fn from(path: StatePath) -> Self {
        path.to_string()
    }
}
