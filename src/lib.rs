//! Stateflow: a hierarchical state composition and merge engine
//!
//! Stateflow models an entity's condition as an ordered set of
//! dash-delimited states (`main-sub-subsub`), each holding a primitive
//! value. States are gated by per-path controllers, summarized into a
//! general state with boolean flags, and whole containers merge when one
//! entity flows into another.
//!
//! # Core Concepts
//!
//! - **Blueprint**: shared operation set; every container is a fresh fork
//!   of one and carries its own lineage identity
//! - **Container**: the states of one entity, mutated through `set`,
//!   `deactivate`, `on` and `merge`
//! - **Controller**: a per-path decision function that accepts, rewrites
//!   or rejects proposed values
//! - **Flags**: active boolean states, derived on every change
//!
//! # Example
//!
//! ```rust
//! use stateflow::controller::Controller;
//! use stateflow::lineage::Blueprint;
//! use stateflow::states;
//!
//! let blueprint = Blueprint::builder("order").build().unwrap();
//!
//! let mut cart = blueprint
//!     .construct(states! { "cart-open" => true, "cart-items" => 2 })
//!     .unwrap();
//! cart.on("cart-items", Controller::guard(|_, proposed| {
//!     proposed.as_number().is_some_and(|n| n >= 0.0)
//! }))
//! .unwrap();
//! assert!(cart.set("cart-items", -1).is_err());
//!
//! let mut checkout = blueprint.construct(states! { "cart-open" => false }).unwrap();
//! checkout.merge(&mut cart).unwrap();
//!
//! // The destination keeps its own value on overlap
//! let open: stateflow::StatePath = "cart-open".parse().unwrap();
//! assert_eq!(checkout.flags().get(&open), Some(&false));
//! assert!(cart.is_inert());
//! ```

pub mod builder;
pub mod container;
pub mod controller;
pub mod core;
pub mod lineage;

// Re-export commonly used types
pub use crate::container::{GeneralState, SharedContainer, StateContainer};
pub use crate::controller::{Controller, ControllerDecision};
pub use crate::core::{Primitive, StatePath};
pub use crate::lineage::Blueprint;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::{json, Value};
}
