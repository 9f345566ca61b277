//! Operation sets shared by every container forked from a blueprint.

use crate::core::Primitive;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The core operations every container supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Operation {
    Set,
    Deactivate,
    Merge,
    On,
}

impl Operation {
    pub const ALL: [Operation; 4] = [Self::Set, Self::Deactivate, Self::Merge, Self::On];

    /// Member name the operation is published under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Deactivate => "deactivate",
            Self::Merge => "merge",
            Self::On => "on",
        }
    }

    /// Look up a core operation by member name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One named member of an operation set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Member {
    /// A callable operation
    Operation(Operation),
    /// A plain default value
    Attribute(Primitive),
}

/// Named members available to a container.
///
/// Built once per blueprint and shared by all of its forks.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OperationSet {
    members: BTreeMap<String, Member>,
}

impl OperationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding only the core operations.
    pub fn core() -> Self {
        let members = Operation::ALL
            .into_iter()
            .map(|op| (op.name().to_string(), Member::Operation(op)))
            .collect();
        Self { members }
    }

    /// Insert a member, replacing any member of the same name.
    pub fn insert(&mut self, name: impl Into<String>, member: Member) -> Option<Member> {
        self.members.insert(name.into(), member)
    }

    /// Overlay `other` onto this set; members of `other` win on collision.
    pub fn overlay(&mut self, other: OperationSet) {
        self.members.extend(other.members);
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Check whether `operation` is published under its own name.
    pub fn supports(&self, operation: Operation) -> bool {
        matches!(self.members.get(operation.name()), Some(Member::Operation(op)) if *op == operation)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Primitive)> {
        self.members.iter().filter_map(|(name, member)| match member {
            Member::Attribute(value) => Some((name.as_str(), value)),
            Member::Operation(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Environment-supplied base capability set.
///
/// Blueprints extend a provider's members when one is injected and
/// available; a missing provider is never an error.
pub trait CapabilityProvider: Send + Sync {
    /// Probe whether the provider can be used right now.
    fn is_available(&self) -> bool {
        true
    }

    /// The provider's default members.
    fn members(&self) -> Vec<(String, Member)>;
}
