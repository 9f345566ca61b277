//! Builder API for blueprint configuration and container seeding.
//!
//! Blueprints are configured in code through a fluent builder; there are
//! no configuration files. The `states!` macro builds seed lists for
//! container construction.

pub mod blueprint;
pub mod error;
pub mod macros;

pub use blueprint::BlueprintBuilder;
pub use error::BuildError;

use crate::container::{ConstructionError, StateContainer};
use crate::lineage::Blueprint;
use std::sync::Arc;

/// Build a blueprint with no extra members and construct one empty
/// container from it.
///
/// Returns the blueprint so further containers can share its operations.
///
/// # Example
///
/// ```
/// use stateflow::builder::standalone;
///
/// let (blueprint, mut container) = standalone("counter").unwrap();
/// container.set("count", 1).unwrap();
///
/// let sibling = blueprint.construct_empty();
/// assert_ne!(sibling.lineage(), container.lineage());
/// ```
pub fn standalone(
    name: impl Into<String>,
) -> Result<(Arc<Blueprint>, StateContainer), ConstructionError> {
    let blueprint = Arc::new(BlueprintBuilder::new(name).build()?);
    let container = blueprint.construct_empty();
    Ok((blueprint, container))
}
