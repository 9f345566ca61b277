//! Per-path controllers that gate state transitions.
//!
//! A controller sees the path, the currently active value (if any) and the
//! proposed value, and either accepts (possibly rewriting the value) or
//! rejects. Controllers are pure decision functions: the container calls
//! each one at most once per `set`, before anything is mutated.

mod policy;

pub use policy::ControllerPolicy;

use crate::core::{Primitive, StatePath};
use policy::Invocation;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

/// Outcome of a controller call.
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerDecision {
    /// Commit this value (the proposed one, or a transformed one)
    Accept(Primitive),
    /// Veto the transition
    Reject,
}

/// Why a proposed value did not get committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The controller returned `Reject`
    Vetoed,
    /// The controller answered after the policy timeout
    TimedOut { timeout: Duration, elapsed: Duration },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vetoed => f.write_str("vetoed by controller"),
            Self::TimedOut { timeout, elapsed } => {
                write!(f, "controller exceeded {timeout:?} (took {elapsed:?})")
            }
        }
    }
}

type Decide = dyn Fn(&StatePath, Option<&Primitive>, &Primitive) -> ControllerDecision + Send + Sync;

/// Gatekeeper for one state path.
///
/// Cheap to clone; clones share the same decision function.
///
/// # Example
///
/// ```rust
/// use stateflow::controller::{Controller, ControllerDecision};
/// use stateflow::core::Primitive;
///
/// // Clamp counters at zero
/// let clamp = Controller::new(|_path, _current, proposed| match proposed.as_number() {
///     Some(n) if n < 0.0 => ControllerDecision::Accept(Primitive::Number(0.0)),
///     Some(_) => ControllerDecision::Accept(proposed.clone()),
///     None => ControllerDecision::Reject,
/// });
///
/// let path = "count".parse().unwrap();
/// assert_eq!(
///     clamp.decide(&path, None, &Primitive::from(-4)),
///     ControllerDecision::Accept(Primitive::Number(0.0))
/// );
/// assert_eq!(clamp.decide(&path, None, &Primitive::Null), ControllerDecision::Reject);
/// ```
#[derive(Clone)]
pub struct Controller {
    decide: Arc<Decide>,
}

impl Controller {
    /// Create a controller from a decision function.
    pub fn new<F>(decide: F) -> Self
    where
        F: Fn(&StatePath, Option<&Primitive>, &Primitive) -> ControllerDecision
            + Send
            + Sync
            + 'static,
    {
        Self {
            decide: Arc::new(decide),
        }
    }

    /// Accept every proposed value unchanged when `predicate` holds,
    /// reject otherwise.
    pub fn guard<F>(predicate: F) -> Self
    where
        F: Fn(Option<&Primitive>, &Primitive) -> bool + Send + Sync + 'static,
    {
        Self::new(move |_, current, proposed| {
            if predicate(current, proposed) {
                ControllerDecision::Accept(proposed.clone())
            } else {
                ControllerDecision::Reject
            }
        })
    }

    pub fn accept_all() -> Self {
        Self::new(|_, _, proposed| ControllerDecision::Accept(proposed.clone()))
    }

    pub fn reject_all() -> Self {
        Self::new(|_, _, _| ControllerDecision::Reject)
    }

    /// Evaluate the decision function.
    pub fn decide(
        &self,
        path: &StatePath,
        current: Option<&Primitive>,
        proposed: &Primitive,
    ) -> ControllerDecision {
        (self.decide)(path, current, proposed)
    }

    /// Check whether two handles share one decision function.
    pub fn ptr_eq(&self, other: &Controller) -> bool {
        Arc::ptr_eq(&self.decide, &other.decide)
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller").finish_non_exhaustive()
    }
}

/// At most one controller per path, plus the policy applied to their calls.
#[derive(Clone, Debug, Default)]
pub struct ControllerRegistry {
    controllers: BTreeMap<StatePath, Controller>,
    policy: ControllerPolicy,
}

impl ControllerRegistry {
    pub fn new(policy: ControllerPolicy) -> Self {
        Self {
            controllers: BTreeMap::new(),
            policy,
        }
    }

    /// Register a controller, returning the one it replaced.
    pub fn register(&mut self, path: StatePath, controller: Controller) -> Option<Controller> {
        self.controllers.insert(path, controller)
    }

    pub fn get(&self, path: &StatePath) -> Option<&Controller> {
        self.controllers.get(path)
    }

    pub fn contains(&self, path: &StatePath) -> bool {
        self.controllers.contains_key(path)
    }

    /// Remove every controller, leaving the policy in place.
    pub(crate) fn take_all(&mut self) -> BTreeMap<StatePath, Controller> {
        std::mem::take(&mut self.controllers)
    }

    /// Run the controller registered for `path`, if any.
    ///
    /// Returns the value to commit. Without a controller the proposed value
    /// passes through untouched.
    pub fn evaluate(
        &self,
        path: &StatePath,
        current: Option<&Primitive>,
        proposed: Primitive,
    ) -> Result<Primitive, RejectReason> {
        let Some(controller) = self.controllers.get(path) else {
            return Ok(proposed);
        };

        let invocation = Invocation::start();
        let decision = controller.decide(path, current, &proposed);

        if let Some(elapsed) = self.policy.exceeded(&invocation) {
            let timeout = self.policy.timeout.unwrap_or_default();
            warn!(path = %path, ?timeout, ?elapsed, "Controller exceeded timeout, treating as reject");
            return Err(RejectReason::TimedOut { timeout, elapsed });
        }

        trace!(path = %path, ?decision, "Controller decided");
        match decision {
            ControllerDecision::Accept(value) => Ok(value),
            ControllerDecision::Reject => Err(RejectReason::Vetoed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> StatePath {
        text.parse().unwrap()
    }

    #[test]
    fn missing_controller_passes_value_through() {
        let registry = ControllerRegistry::default();
        let result = registry.evaluate(&path("a"), None, Primitive::from(1));
        assert_eq!(result, Ok(Primitive::from(1)));
    }

    #[test]
    fn reject_all_vetoes() {
        let mut registry = ControllerRegistry::default();
        registry.register(path("a"), Controller::reject_all());

        let result = registry.evaluate(&path("a"), None, Primitive::from(1));
        assert_eq!(result, Err(RejectReason::Vetoed));
    }

    #[test]
    fn controller_can_rewrite_value() {
        let mut registry = ControllerRegistry::default();
        registry.register(
            path("name"),
            Controller::new(|_, _, proposed| {
                let upper = proposed.as_str().unwrap_or_default().to_uppercase();
                ControllerDecision::Accept(Primitive::String(upper))
            }),
        );

        let result = registry.evaluate(&path("name"), None, Primitive::from("ada"));
        assert_eq!(result, Ok(Primitive::from("ADA")));
    }

    #[test]
    fn controller_sees_current_value() {
        let mut registry = ControllerRegistry::default();
        // Only allow increments
        registry.register(
            path("count"),
            Controller::guard(|current, proposed| {
                let current = current.and_then(Primitive::as_number).unwrap_or(0.0);
                proposed.as_number().is_some_and(|n| n > current)
            }),
        );

        let current = Primitive::from(3);
        assert!(registry
            .evaluate(&path("count"), Some(&current), Primitive::from(4))
            .is_ok());
        assert_eq!(
            registry.evaluate(&path("count"), Some(&current), Primitive::from(2)),
            Err(RejectReason::Vetoed)
        );
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = ControllerRegistry::default();
        let first = Controller::reject_all();
        assert!(registry.register(path("a"), first.clone()).is_none());

        let replaced = registry.register(path("a"), Controller::accept_all()).unwrap();
        assert!(replaced.ptr_eq(&first));
        assert!(registry.get(&path("a")).is_some_and(|c| !c.ptr_eq(&first)));
        assert!(registry.evaluate(&path("a"), None, Primitive::Null).is_ok());
    }

    #[test]
    fn slow_controller_times_out() {
        let mut registry = ControllerRegistry::new(ControllerPolicy::with_timeout(
            Duration::from_millis(1),
        ));
        registry.register(
            path("slow"),
            Controller::new(|_, _, proposed| {
                std::thread::sleep(Duration::from_millis(20));
                ControllerDecision::Accept(proposed.clone())
            }),
        );

        let result = registry.evaluate(&path("slow"), None, Primitive::from(true));
        assert!(matches!(result, Err(RejectReason::TimedOut { .. })));
    }

    #[test]
    fn fast_controller_within_timeout_is_accepted() {
        let mut registry =
            ControllerRegistry::new(ControllerPolicy::with_timeout(Duration::from_secs(5)));
        registry.register(path("fast"), Controller::accept_all());

        for _ in 0..100 {
            let result = registry.evaluate(&path("fast"), None, Primitive::from(1));
            assert_eq!(result, Ok(Primitive::from(1)));
        }
    }
}
