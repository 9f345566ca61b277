//! Containers shared across threads.
//!
//! Each shared container sits behind its own lock. A merge holds both
//! locks for its whole duration and always takes them in lineage order,
//! so two merges running in opposite directions cannot deadlock.

use super::{MergeError, MergeReport, StateContainer, TransitionError};
use crate::controller::Controller;
use crate::core::{FormatError, InvalidValueError, Primitive, StatePath};
use crate::lineage::LineageId;
use parking_lot::Mutex;
use std::sync::Arc;

/// Handle to a container behind a per-container lock.
///
/// Clones are handles to the same container.
///
/// # Example
///
/// ```rust
/// use stateflow::container::SharedContainer;
/// use stateflow::lineage::Blueprint;
///
/// let blueprint = Blueprint::builder("entity").build().unwrap();
/// let a = SharedContainer::new(blueprint.construct_empty());
/// let b = SharedContainer::new(blueprint.construct_empty());
///
/// b.set("main-count", 5).unwrap();
/// a.merge(&b).unwrap();
///
/// assert_eq!(a.read(|c| c.current_states().len()), 1);
/// assert!(b.set("main-count", 6).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct SharedContainer {
    lineage: LineageId,
    inner: Arc<Mutex<StateContainer>>,
}

impl SharedContainer {
    pub fn new(container: StateContainer) -> Self {
        Self {
            lineage: container.lineage().clone(),
            inner: Arc::new(Mutex::new(container)),
        }
    }

    /// Lineage of the wrapped container. Never changes, so no lock is taken.
    pub fn lineage(&self) -> &LineageId {
        &self.lineage
    }

    pub fn set<P, V>(&self, path: P, value: V) -> Result<(), TransitionError>
    where
        P: TryInto<StatePath>,
        FormatError: From<P::Error>,
        V: TryInto<Primitive>,
        InvalidValueError: From<V::Error>,
    {
        self.inner.lock().set(path, value)
    }

    pub fn deactivate<P>(&self, path: P) -> Result<(), TransitionError>
    where
        P: TryInto<StatePath>,
        FormatError: From<P::Error>,
    {
        self.inner.lock().deactivate(path)
    }

    pub fn on<P>(&self, path: P, controller: Controller) -> Result<(), TransitionError>
    where
        P: TryInto<StatePath>,
        FormatError: From<P::Error>,
    {
        self.inner.lock().on(path, controller)
    }

    /// Fold `donor` into this container, holding both locks throughout.
    pub fn merge(&self, donor: &SharedContainer) -> Result<MergeReport, MergeError> {
        if self.lineage == donor.lineage {
            return Err(MergeError::SelfMerge {
                lineage: self.lineage.clone(),
            });
        }

        let (mut destination, mut donor) = if self.lineage < donor.lineage {
            let destination = self.inner.lock();
            (destination, donor.inner.lock())
        } else {
            let donor = donor.inner.lock();
            (self.inner.lock(), donor)
        };
        destination.merge(&mut donor)
    }

    /// Run `f` against the container while holding its lock.
    pub fn read<R>(&self, f: impl FnOnce(&StateContainer) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Take the container back once this is the last handle.
    pub fn try_unwrap(self) -> Result<StateContainer, Self> {
        let lineage = self.lineage;
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { lineage, inner })
    }
}

impl From<StateContainer> for SharedContainer {
    fn from(container: StateContainer) -> Self {
        Self::new(container)
    }
}
