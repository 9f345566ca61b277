//! Container error types.

use crate::builder::BuildError;
use crate::controller::RejectReason;
use crate::core::{FormatError, InvalidValueError, StatePath};
use crate::lineage::LineageId;
use thiserror::Error;
use uuid::Uuid;

/// A mutating call reached a container already consumed by a merge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Container {lineage} is inert, its states were merged into {merged_into}")]
pub struct InertContainerError {
    pub lineage: LineageId,
    pub merged_into: LineageId,
}

/// Errors that can occur during `set`, `deactivate` and `on`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    InvalidValue(#[from] InvalidValueError),

    #[error("Transition of '{path}' rejected: {reason}")]
    Rejected { path: StatePath, reason: RejectReason },

    #[error("State '{path}' was never set")]
    UnknownState { path: StatePath },

    #[error(transparent)]
    Inert(#[from] InertContainerError),
}

/// Errors that can occur while constructing a container.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Lineage {lineage} was not forked from blueprint {blueprint}")]
    ForeignLineage { blueprint: Uuid, lineage: LineageId },

    #[error("Invalid initial state: {0}")]
    Format(#[from] FormatError),

    #[error("Invalid initial value: {0}")]
    InvalidValue(#[from] InvalidValueError),

    #[error("Initial states must be a JSON object, got {kind}")]
    SeedNotObject { kind: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Errors that can occur when merging two containers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error(transparent)]
    Inert(#[from] InertContainerError),

    #[error("Container {lineage} cannot merge with itself")]
    SelfMerge { lineage: LineageId },
}
