//! State change history tracking.
//!
//! Every committed change to a container is recorded as an immutable
//! transition. Rejected or failed operations never reach the history.

use super::path::StatePath;
use super::value::Primitive;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What kind of change a transition records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// A value was committed through `set`
    Set,
    /// A path left the current states
    Deactivate,
    /// A path was taken over from a merge donor
    Adopted,
}

/// Record of a single state change.
///
/// # Example
///
/// ```rust
/// use stateflow::core::{Primitive, StatePath, StateTransition, TransitionKind};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     path: "door-open".parse::<StatePath>().unwrap(),
///     from: None,
///     to: Some(Primitive::Bool(true)),
///     kind: TransitionKind::Set,
///     timestamp: Utc::now(),
/// };
/// assert!(transition.activates());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The path that changed
    pub path: StatePath,
    /// Active value before the change, `None` if the path was inactive
    pub from: Option<Primitive>,
    /// Active value after the change, `None` if the path became inactive
    pub to: Option<Primitive>,
    /// How the change came about
    pub kind: TransitionKind,
    /// When the change was committed
    pub timestamp: DateTime<Utc>,
}

impl StateTransition {
    /// Check whether the path went from inactive to active.
    pub fn activates(&self) -> bool {
        self.from.is_none() && self.to.is_some()
    }
}

/// Ordered history of state changes.
///
/// Append-only and owned by one container. Entries are never evicted, so
/// the history grows with every committed change for the container's
/// whole life.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, transition: StateTransition) {
        self.transitions.push(transition);
    }

    /// Transitions that touched `path`, oldest first.
    pub fn for_path<'a>(&'a self, path: &'a StatePath) -> impl Iterator<Item = &'a StateTransition> {
        self.transitions.iter().filter(move |t| &t.path == path)
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions in commit order.
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
