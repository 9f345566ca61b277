//! State containers.
//!
//! A container holds every state of one entity: the ordered entries ever
//! set, the currently active values, the general state summary derived from
//! them, and the order each path was first introduced in. Containers are
//! built from blueprint forks and are never cloned; an identity belongs to
//! exactly one container.
//!
//! Every operation is all-or-nothing: validation and controller calls run
//! before anything is touched, so a failed call leaves the container as it
//! was.

mod error;
mod merge;
mod shared;

pub use error::{ConstructionError, InertContainerError, MergeError, TransitionError};
pub use merge::MergeReport;
pub use shared::SharedContainer;

use crate::controller::{Controller, ControllerRegistry};
use crate::core::{
    derive_flags, FormatError, InvalidValueError, Primitive, StateHistory, StatePath,
    StateTransition, TransitionKind,
};
use crate::lineage::{Blueprint, Fork, LineageId, OperationSet};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, trace};

/// One path ever set in a container.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateEntry {
    pub path: StatePath,
    /// Last committed value; kept after deactivation
    pub value: Primitive,
    /// Position in the container's chronological order
    pub order: u64,
}

/// Read-only summary of a container's active states.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GeneralState {
    /// Every active state and its value
    pub states: BTreeMap<StatePath, Primitive>,
    /// The boolean-valued subset of `states`
    pub flags: BTreeMap<StatePath, bool>,
    /// Set when the container's blueprint had no base capability provider
    pub non_meta_state: bool,
}

/// The states owned by one entity.
///
/// # Example
///
/// ```rust
/// use stateflow::controller::Controller;
/// use stateflow::lineage::Blueprint;
/// use stateflow::states;
///
/// let blueprint = Blueprint::builder("door").build().unwrap();
/// let mut door = blueprint.construct(states! { "door-open" => false }).unwrap();
///
/// // Doors only open when unlocked
/// door.set("door-locked", true).unwrap();
/// door.on("door-open", Controller::guard(|_, proposed| proposed.as_bool() == Some(false)))
///     .unwrap();
///
/// assert!(door.set("door-open", true).is_err());
/// assert_eq!(door.general_state().flags.len(), 2);
/// ```
#[derive(Debug)]
pub struct StateContainer {
    lineage: LineageId,
    operations: Arc<OperationSet>,
    non_meta_state: bool,
    states: Vec<StateEntry>,
    slots: HashMap<StatePath, usize>,
    current: BTreeMap<StatePath, Primitive>,
    general: GeneralState,
    order: BTreeMap<StatePath, u64>,
    next_order: u64,
    controllers: ControllerRegistry,
    history: StateHistory,
    merged_into: Option<LineageId>,
}

impl Blueprint {
    /// Fork this blueprint and construct a container seeded with `initial`.
    ///
    /// Seeds are applied in iteration order; a repeated path keeps its first
    /// order and its last value.
    pub fn construct<I, P, V>(&self, initial: I) -> Result<StateContainer, ConstructionError>
    where
        I: IntoIterator<Item = (P, V)>,
        P: TryInto<StatePath>,
        FormatError: From<P::Error>,
        V: TryInto<Primitive>,
        InvalidValueError: From<V::Error>,
    {
        self.construct_with(self.fork(), initial)
    }

    /// Construct a container from a fork minted earlier.
    ///
    /// Fails if the fork descends from a different blueprint.
    pub fn construct_with<I, P, V>(
        &self,
        fork: Fork,
        initial: I,
    ) -> Result<StateContainer, ConstructionError>
    where
        I: IntoIterator<Item = (P, V)>,
        P: TryInto<StatePath>,
        FormatError: From<P::Error>,
        V: TryInto<Primitive>,
        InvalidValueError: From<V::Error>,
    {
        if !self.owns(&fork) {
            return Err(ConstructionError::ForeignLineage {
                blueprint: self.id(),
                lineage: fork.lineage().clone(),
            });
        }
        StateContainer::seeded(fork, initial)
    }

    /// Fork this blueprint and construct a container with no states.
    pub fn construct_empty(&self) -> StateContainer {
        StateContainer::empty(self.fork())
    }
}

impl StateContainer {
    fn empty(fork: Fork) -> Self {
        let (lineage, operations, non_meta_state, policy) = fork.into_parts();
        Self {
            lineage,
            operations,
            non_meta_state,
            states: Vec::new(),
            slots: HashMap::new(),
            current: BTreeMap::new(),
            general: GeneralState {
                non_meta_state,
                ..GeneralState::default()
            },
            order: BTreeMap::new(),
            next_order: 0,
            controllers: ControllerRegistry::new(policy),
            history: StateHistory::new(),
            merged_into: None,
        }
    }

    fn seeded<I, P, V>(fork: Fork, initial: I) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = (P, V)>,
        P: TryInto<StatePath>,
        FormatError: From<P::Error>,
        V: TryInto<Primitive>,
        InvalidValueError: From<V::Error>,
    {
        let seeds = initial
            .into_iter()
            .map(|(path, value)| -> Result<_, ConstructionError> {
                let path: StatePath = path.try_into().map_err(FormatError::from)?;
                let value: Primitive = value.try_into().map_err(InvalidValueError::from)?;
                value.validate()?;
                Ok((path, value))
            })
            .collect::<Result<Vec<_>, ConstructionError>>()?;

        let mut container = Self::empty(fork);
        for (path, value) in seeds {
            container.commit(path, value, TransitionKind::Set);
        }

        debug!(
            lineage = %container.lineage,
            states = container.states.len(),
            "Constructed container"
        );
        Ok(container)
    }

    /// Construct a container seeded from a JSON object of `path: value`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stateflow::container::StateContainer;
    /// use stateflow::lineage::Blueprint;
    /// use serde_json::json;
    ///
    /// let blueprint = Blueprint::builder("lamp").build().unwrap();
    /// let lamp = StateContainer::from_json(&blueprint, &json!({"lamp-on": true})).unwrap();
    /// assert!(lamp.is_active(&"lamp-on".parse().unwrap()));
    ///
    /// assert!(StateContainer::from_json(&blueprint, &json!([1])).is_err());
    /// ```
    pub fn from_json(
        blueprint: &Blueprint,
        seed: &serde_json::Value,
    ) -> Result<Self, ConstructionError> {
        let object = seed
            .as_object()
            .ok_or_else(|| ConstructionError::SeedNotObject {
                kind: json_kind(seed).to_string(),
            })?;
        blueprint.construct(object.iter().map(|(path, value)| (path, value.clone())))
    }

    /// Commit `value` to `path`, consulting the path's controller first.
    ///
    /// The controller may rewrite the value; a rejection leaves the
    /// container untouched.
    pub fn set<P, V>(&mut self, path: P, value: V) -> Result<(), TransitionError>
    where
        P: TryInto<StatePath>,
        FormatError: From<P::Error>,
        V: TryInto<Primitive>,
        InvalidValueError: From<V::Error>,
    {
        self.ensure_active()?;
        let path: StatePath = path.try_into().map_err(FormatError::from)?;
        let proposed: Primitive = value.try_into().map_err(InvalidValueError::from)?;
        proposed.validate()?;

        let value = self
            .controllers
            .evaluate(&path, self.current.get(&path), proposed)
            .map_err(|reason| {
                debug!(lineage = %self.lineage, path = %path, %reason, "Transition rejected");
                TransitionError::Rejected {
                    path: path.clone(),
                    reason,
                }
            })?;
        // Controllers may rewrite the value
        value.validate()?;

        debug!(lineage = %self.lineage, path = %path, value = %value, "Set state");
        self.commit(path, value, TransitionKind::Set);
        Ok(())
    }

    /// Remove `path` from the current states.
    ///
    /// The entry and its order survive. Deactivating an inactive path is a
    /// no-op; a path that was never set is an error.
    pub fn deactivate<P>(&mut self, path: P) -> Result<(), TransitionError>
    where
        P: TryInto<StatePath>,
        FormatError: From<P::Error>,
    {
        self.ensure_active()?;
        let path: StatePath = path.try_into().map_err(FormatError::from)?;

        if !self.slots.contains_key(&path) {
            return Err(TransitionError::UnknownState { path });
        }

        let Some(previous) = self.current.remove(&path) else {
            return Ok(());
        };

        debug!(lineage = %self.lineage, path = %path, "Deactivated state");
        self.history.push(StateTransition {
            path,
            from: Some(previous),
            to: None,
            kind: TransitionKind::Deactivate,
            timestamp: Utc::now(),
        });
        self.refresh();
        Ok(())
    }

    /// Register the controller for `path`, replacing any previous one.
    ///
    /// Already committed values are not re-checked.
    pub fn on<P>(&mut self, path: P, controller: Controller) -> Result<(), TransitionError>
    where
        P: TryInto<StatePath>,
        FormatError: From<P::Error>,
    {
        self.ensure_active()?;
        let path: StatePath = path.try_into().map_err(FormatError::from)?;

        trace!(lineage = %self.lineage, path = %path, "Registered controller");
        self.controllers.register(path, controller);
        Ok(())
    }

    pub fn lineage(&self) -> &LineageId {
        &self.lineage
    }

    /// Check whether this container was consumed by a merge.
    pub fn is_inert(&self) -> bool {
        self.merged_into.is_some()
    }

    /// Lineage of the container this one was merged into.
    pub fn merged_into(&self) -> Option<&LineageId> {
        self.merged_into.as_ref()
    }

    /// Operations shared with every fork of the same blueprint.
    pub fn operations(&self) -> &OperationSet {
        &self.operations
    }

    pub fn non_meta_state(&self) -> bool {
        self.non_meta_state
    }

    /// Entries in order of introduction.
    pub fn states(&self) -> &[StateEntry] {
        &self.states
    }

    pub fn entry(&self, path: &StatePath) -> Option<&StateEntry> {
        self.slots.get(path).map(|&slot| &self.states[slot])
    }

    pub fn current_states(&self) -> &BTreeMap<StatePath, Primitive> {
        &self.current
    }

    pub fn general_state(&self) -> &GeneralState {
        &self.general
    }

    pub fn flags(&self) -> &BTreeMap<StatePath, bool> {
        &self.general.flags
    }

    pub fn state_order(&self) -> &BTreeMap<StatePath, u64> {
        &self.order
    }

    /// The active value of `path`.
    pub fn value(&self, path: &StatePath) -> Option<&Primitive> {
        self.current.get(path)
    }

    pub fn is_active(&self, path: &StatePath) -> bool {
        self.current.contains_key(path)
    }

    pub fn controller(&self, path: &StatePath) -> Option<&Controller> {
        self.controllers.get(path)
    }

    /// Every committed change, oldest first. Never truncated.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Active states strictly beneath `path`.
    pub fn sub_states<'a>(
        &'a self,
        path: &'a StatePath,
    ) -> impl Iterator<Item = (&'a StatePath, &'a Primitive)> {
        self.current
            .iter()
            .filter(move |(candidate, _)| *candidate != path && candidate.is_within(path))
    }

    fn ensure_active(&self) -> Result<(), InertContainerError> {
        match &self.merged_into {
            Some(merged_into) => Err(InertContainerError {
                lineage: self.lineage.clone(),
                merged_into: merged_into.clone(),
            }),
            None => Ok(()),
        }
    }

    fn allocate_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    /// Add an entry for a path this container has never seen.
    fn introduce(&mut self, path: StatePath, value: Primitive) {
        let order = self.allocate_order();
        self.slots.insert(path.clone(), self.states.len());
        self.order.insert(path.clone(), order);
        self.states.push(StateEntry { path, value, order });
    }

    /// Make `value` the active value of `path`. Infallible.
    fn commit(&mut self, path: StatePath, value: Primitive, kind: TransitionKind) {
        match self.slots.get(&path) {
            Some(&slot) => self.states[slot].value = value.clone(),
            None => self.introduce(path.clone(), value.clone()),
        }
        let from = self.current.insert(path.clone(), value.clone());

        self.history.push(StateTransition {
            path,
            from,
            to: Some(value),
            kind,
            timestamp: Utc::now(),
        });
        self.refresh();
    }

    /// Recompute the general state from the current states.
    fn refresh(&mut self) {
        self.general = GeneralState {
            states: self.current.clone(),
            flags: derive_flags(&self.current),
            non_meta_state: self.non_meta_state,
        };
        trace!(
            lineage = %self.lineage,
            states = self.general.states.len(),
            flags = self.general.flags.len(),
            "Refreshed general state"
        );
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
