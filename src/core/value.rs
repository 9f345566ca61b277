//! Primitive state values.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use thiserror::Error;

/// A value offered to a state that is not one of the four primitive kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid state value: {kind} is not a number, boolean, string or null")]
pub struct InvalidValueError {
    /// Description of the rejected value's kind
    pub kind: String,
}

impl InvalidValueError {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl From<Infallible> for InvalidValueError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// The value carried by a state.
///
/// Numbers are always finite. Serializes to the plain JSON scalar.
///
/// # Example
///
/// ```rust
/// use stateflow::core::Primitive;
///
/// assert_eq!(Primitive::from(true).as_bool(), Some(true));
/// assert_eq!(Primitive::from(3).as_number(), Some(3.0));
/// assert!(Primitive::try_from(f64::NAN).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Primitive {
    /// Name of this value's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check that a number payload is finite.
    ///
    /// `Number` is a public variant, so values built directly bypass the
    /// `TryFrom<f64>` check. Containers run this on everything they commit.
    pub fn validate(&self) -> Result<(), InvalidValueError> {
        match self {
            Self::Number(n) if !n.is_finite() => {
                Err(InvalidValueError::new(format!("non-finite number {n}")))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Primitive {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl TryFrom<f64> for Primitive {
    type Error = InvalidValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let primitive = Self::Number(value);
        primitive.validate()?;
        Ok(primitive)
    }
}

impl TryFrom<serde_json::Value> for Primitive {
    type Error = InvalidValueError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| InvalidValueError::new(format!("unrepresentable number {n}")))
                .and_then(Self::try_from),
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(_) => Err(InvalidValueError::new("array")),
            Value::Object(_) => Err(InvalidValueError::new("object")),
        }
    }
}

impl From<Primitive> for serde_json::Value {
    fn from(value: Primitive) -> Self {
        match value {
            Primitive::Null => Self::Null,
            Primitive::Bool(b) => Self::Bool(b),
            Primitive::Number(n) => serde_json::Number::from_f64(n)
                .map(Self::Number)
                .unwrap_or(Self::Null),
            Primitive::String(s) => Self::String(s),
        }
    }
}
