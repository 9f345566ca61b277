//! Core value types of the state model.
//!
//! This module contains the pure building blocks every container is made of:
//! - State paths and their text format
//! - Primitive state values
//! - Flag derivation over the current states
//! - Immutable change history
//!
//! Nothing in this module holds mutable shared state.

mod flags;
mod history;
mod path;
mod value;

pub use flags::derive_flags;
pub use history::{StateHistory, StateTransition, TransitionKind};
pub use path::{FormatError, StatePath, SEPARATOR};
pub use value::{InvalidValueError, Primitive};
