//! Blueprint lineage.
//!
//! A blueprint holds the operation set shared by a family of containers.
//! Every container is built from a fresh fork of its blueprint: the fork
//! carries a lineage identity no other fork shares, while the operation set
//! itself is shared, never copied.
//!
//! # Example
//!
//! ```rust
//! use stateflow::lineage::Blueprint;
//!
//! let blueprint = Blueprint::builder("door").build().unwrap();
//!
//! let a = blueprint.fork();
//! let b = blueprint.fork();
//!
//! assert_ne!(a.lineage(), b.lineage());
//! assert!(std::sync::Arc::ptr_eq(a.operations(), b.operations()));
//! ```

mod capability;

pub use capability::{CapabilityProvider, Member, Operation, OperationSet};

use crate::builder::BlueprintBuilder;
use crate::controller::ControllerPolicy;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Identity of one forked container.
///
/// Ordered by creation time first, which gives every pair of containers a
/// fixed locking order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineageId {
    created_at: DateTime<Utc>,
    blueprint: Uuid,
    sequence: u64,
}

impl LineageId {
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Identity of the blueprint this lineage was forked from.
    pub fn blueprint(&self) -> Uuid {
        self.blueprint
    }

    /// Position of this fork among its blueprint's forks, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.blueprint.simple(), self.sequence)
    }
}

/// A fresh descendant of a blueprint, ready to back one container.
#[derive(Debug)]
pub struct Fork {
    lineage: LineageId,
    operations: Arc<OperationSet>,
    non_meta_state: bool,
    policy: ControllerPolicy,
}

impl Fork {
    pub fn lineage(&self) -> &LineageId {
        &self.lineage
    }

    pub fn operations(&self) -> &Arc<OperationSet> {
        &self.operations
    }

    /// `true` when no base capability provider backed the blueprint.
    pub fn non_meta_state(&self) -> bool {
        self.non_meta_state
    }

    pub fn policy(&self) -> ControllerPolicy {
        self.policy
    }

    pub(crate) fn into_parts(self) -> (LineageId, Arc<OperationSet>, bool, ControllerPolicy) {
        (self.lineage, self.operations, self.non_meta_state, self.policy)
    }
}

#[derive(Debug)]
struct Clock {
    last: DateTime<Utc>,
    sequence: u64,
}

/// Shared definition containers are forked from.
///
/// Blueprints are `Sync`; share one behind an `Arc` to fork from several
/// threads.
#[derive(Debug)]
pub struct Blueprint {
    id: Uuid,
    name: String,
    operations: Arc<OperationSet>,
    non_meta_state: bool,
    policy: ControllerPolicy,
    clock: Mutex<Clock>,
}

impl Blueprint {
    /// Start configuring a blueprint.
    pub fn builder(name: impl Into<String>) -> BlueprintBuilder {
        BlueprintBuilder::new(name)
    }

    pub(crate) fn from_parts(
        name: String,
        operations: OperationSet,
        non_meta_state: bool,
        policy: ControllerPolicy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            operations: Arc::new(operations),
            non_meta_state,
            policy,
            clock: Mutex::new(Clock {
                last: DateTime::<Utc>::MIN_UTC,
                sequence: 0,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operations(&self) -> &Arc<OperationSet> {
        &self.operations
    }

    /// `true` when the blueprint was built without a base capability provider.
    pub fn non_meta_state(&self) -> bool {
        self.non_meta_state
    }

    pub fn policy(&self) -> ControllerPolicy {
        self.policy
    }

    /// Number of forks minted so far.
    pub fn forks(&self) -> u64 {
        self.clock.lock().sequence
    }

    /// Mint a new descendant.
    ///
    /// Creation timestamps never go backwards within one blueprint, and the
    /// sequence number keeps two forks in the same instant apart.
    pub fn fork(&self) -> Fork {
        let lineage = {
            let mut clock = self.clock.lock();
            let now = Utc::now().max(clock.last);
            clock.last = now;
            clock.sequence += 1;
            LineageId {
                created_at: now,
                blueprint: self.id,
                sequence: clock.sequence,
            }
        };

        debug!(blueprint = %self.name, lineage = %lineage, "Forked blueprint");

        Fork {
            lineage,
            operations: Arc::clone(&self.operations),
            non_meta_state: self.non_meta_state,
            policy: self.policy,
        }
    }

    /// Check whether `fork` descends from this blueprint.
    pub fn owns(&self, fork: &Fork) -> bool {
        fork.lineage.blueprint == self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn forks_have_distinct_identities() {
        let blueprint = Blueprint::builder("entity").build().unwrap();

        let lineages: HashSet<_> = (0..100).map(|_| blueprint.fork().lineage).collect();

        assert_eq!(lineages.len(), 100);
        assert_eq!(blueprint.forks(), 100);
    }

    #[test]
    fn fork_timestamps_are_monotonic() {
        let blueprint = Blueprint::builder("entity").build().unwrap();

        let lineages: Vec<_> = (0..50).map(|_| blueprint.fork().lineage).collect();

        for pair in lineages.windows(2) {
            assert!(pair[0].created_at() <= pair[1].created_at());
            assert!(pair[0].sequence() < pair[1].sequence());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn forks_share_operations() {
        let blueprint = Blueprint::builder("entity").build().unwrap();
        let a = blueprint.fork();
        let b = blueprint.fork();

        assert!(Arc::ptr_eq(a.operations(), b.operations()));
        assert!(Arc::ptr_eq(a.operations(), blueprint.operations()));
    }

    #[test]
    fn owns_detects_foreign_forks() {
        let doors = Blueprint::builder("door").build().unwrap();
        let lights = Blueprint::builder("light").build().unwrap();

        assert!(doors.owns(&doors.fork()));
        assert!(!doors.owns(&lights.fork()));
    }

    #[test]
    fn lineage_displays_blueprint_and_sequence() {
        let blueprint = Blueprint::builder("entity").build().unwrap();
        let fork = blueprint.fork();

        assert_eq!(
            fork.lineage().to_string(),
            format!("{}#1", blueprint.id().simple())
        );
    }
}
