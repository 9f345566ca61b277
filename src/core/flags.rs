//! Flag derivation.
//!
//! A flag is an active state whose value is a boolean. Flags are never
//! stored on their own; they are recomputed from the current states.

use super::path::StatePath;
use super::value::Primitive;
use std::collections::BTreeMap;

/// Project the boolean-valued subset of `current`.
///
/// # Example
///
/// ```rust
/// use stateflow::core::{derive_flags, Primitive, StatePath};
/// use std::collections::BTreeMap;
///
/// let mut current = BTreeMap::new();
/// current.insert("active".parse::<StatePath>().unwrap(), Primitive::Bool(true));
/// current.insert("count".parse::<StatePath>().unwrap(), Primitive::Number(3.0));
///
/// let flags = derive_flags(&current);
/// assert_eq!(flags.len(), 1);
/// assert_eq!(flags.get(&"active".parse::<StatePath>().unwrap()), Some(&true));
/// ```
pub fn derive_flags(current: &BTreeMap<StatePath, Primitive>) -> BTreeMap<StatePath, bool> {
    current
        .iter()
        .filter_map(|(path, value)| value.as_bool().map(|flag| (path.clone(), flag)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> StatePath {
        text.parse().unwrap()
    }

    #[test]
    fn empty_states_have_no_flags() {
        assert!(derive_flags(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn only_booleans_become_flags() {
        let current = BTreeMap::from([
            (path("door-open"), Primitive::Bool(false)),
            (path("door-label"), Primitive::from("front")),
            (path("door-count"), Primitive::from(2)),
            (path("door-owner"), Primitive::Null),
            (path("alarm"), Primitive::Bool(true)),
        ]);

        let flags = derive_flags(&current);

        assert_eq!(
            flags,
            BTreeMap::from([(path("alarm"), true), (path("door-open"), false)])
        );
    }
}
