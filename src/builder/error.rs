//! Build errors for blueprints.

use thiserror::Error;

/// Errors that can occur when building a blueprint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Blueprint name is empty. Pass a name to Blueprint::builder(name)")]
    EmptyName,

    #[error("Member name is empty. Every blueprint member needs a name")]
    EmptyMemberName,

    #[error("Member '{name}' is reserved for the core operation of the same name")]
    ReservedMember { name: String },
}
