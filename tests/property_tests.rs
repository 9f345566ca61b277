//! Property-based tests for state paths, containers and merges.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use stateflow::container::TransitionError;
use stateflow::controller::{Controller, RejectReason};
use stateflow::core::{derive_flags, FormatError, Primitive, StatePath};
use stateflow::lineage::Blueprint;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

prop_compose! {
    fn arbitrary_path_text()(tokens in prop::collection::vec("[a-z]{1,6}", 1..4)) -> String {
        tokens.join("-")
    }
}

prop_compose! {
    fn arbitrary_primitive()(variant in 0..4u8, b in any::<bool>(), n in -1000i32..1000, s in "[a-z ]{0,8}") -> Primitive {
        match variant {
            0 => Primitive::Null,
            1 => Primitive::Bool(b),
            2 => Primitive::from(n),
            _ => Primitive::String(s),
        }
    }
}

#[derive(Clone, Debug)]
enum Op {
    Set(String, Primitive),
    Deactivate(String),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    // A small path pool so sets and deactivations collide
    let path = prop::sample::select(vec!["a", "a-b", "b", "c-d-e", "flag"]);
    prop_oneof![
        3 => (path.clone(), arbitrary_primitive()).prop_map(|(p, v)| Op::Set(p.to_string(), v)),
        1 => path.prop_map(|p| Op::Deactivate(p.to_string())),
    ]
}

fn blueprint() -> Blueprint {
    Blueprint::builder("entity").build().unwrap()
}

proptest! {
    #[test]
    fn path_text_round_trips(text in arbitrary_path_text()) {
        let path = StatePath::parse(&text).unwrap();
        prop_assert_eq!(path.to_string(), text);
    }

    #[test]
    fn path_with_uppercase_or_digit_is_rejected(
        text in arbitrary_path_text(),
        bad in "[A-Z0-9]",
        at in any::<prop::sample::Index>(),
    ) {
        let mut chars: Vec<char> = text.chars().collect();
        let position = at.index(chars.len() + 1);
        chars.insert(position, bad.chars().next().unwrap());
        let corrupted: String = chars.into_iter().collect();

        prop_assert!(matches!(
            StatePath::parse(&corrupted),
            Err(FormatError::InvalidCharacter { .. })
        ), "expected InvalidCharacter for {:?}", corrupted);
    }

    #[test]
    fn path_with_stray_dashes_is_rejected(text in arbitrary_path_text()) {
        let leading = format!("-{text}");
        let trailing = format!("{text}-");
        let doubled = text.replacen('-', "--", 1);

        prop_assert!(StatePath::parse(&leading).is_err());
        prop_assert!(StatePath::parse(&trailing).is_err());
        if doubled != text {
            let is_empty_token = matches!(
                StatePath::parse(&doubled),
                Err(FormatError::EmptyToken { .. })
            );
            prop_assert!(is_empty_token);
        }
    }

    #[test]
    fn order_is_monotonic_and_never_reused(ops in prop::collection::vec(arbitrary_op(), 1..40)) {
        let mut container = blueprint().construct_empty();
        let mut first_seen: Vec<StatePath> = Vec::new();
        let mut assigned: BTreeMap<StatePath, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Set(path, value) => {
                    container.set(path.as_str(), value).unwrap();
                    let path: StatePath = path.parse().unwrap();
                    if !first_seen.contains(&path) {
                        first_seen.push(path);
                    }
                }
                Op::Deactivate(path) => {
                    let known = first_seen.iter().any(|p| p.to_string() == path);
                    let result = container.deactivate(path.as_str());
                    prop_assert_eq!(result.is_ok(), known);
                }
            }

            // Orders, once assigned, never change
            for (path, order) in container.state_order() {
                if let Some(previous) = assigned.insert(path.clone(), *order) {
                    prop_assert_eq!(previous, *order);
                }
            }
        }

        let orders: Vec<u64> = first_seen
            .iter()
            .map(|p| container.state_order()[p])
            .collect();
        prop_assert!(orders.windows(2).all(|w| w[0] < w[1]));

        let unique: HashSet<_> = orders.iter().collect();
        prop_assert_eq!(unique.len(), orders.len());
    }

    #[test]
    fn current_states_are_a_subset_of_entries(ops in prop::collection::vec(arbitrary_op(), 0..40)) {
        let mut container = blueprint().construct_empty();
        for op in ops {
            match op {
                Op::Set(path, value) => container.set(path.as_str(), value).unwrap(),
                Op::Deactivate(path) => { let _ = container.deactivate(path.as_str()); }
            }
        }

        for path in container.current_states().keys() {
            prop_assert!(container.entry(path).is_some());
        }
    }

    #[test]
    fn flags_are_exactly_the_boolean_states(ops in prop::collection::vec(arbitrary_op(), 0..40)) {
        let mut container = blueprint().construct_empty();
        for op in ops {
            match op {
                Op::Set(path, value) => container.set(path.as_str(), value).unwrap(),
                Op::Deactivate(path) => { let _ = container.deactivate(path.as_str()); }
            }
        }

        let expected: BTreeMap<StatePath, bool> = container
            .current_states()
            .iter()
            .filter_map(|(p, v)| v.as_bool().map(|b| (p.clone(), b)))
            .collect();

        prop_assert_eq!(container.flags(), &expected);
        prop_assert_eq!(&derive_flags(container.current_states()), &expected);
        prop_assert_eq!(&container.general_state().states, container.current_states());
    }

    #[test]
    fn vetoed_set_changes_nothing(
        ops in prop::collection::vec(arbitrary_op(), 0..20),
        value in arbitrary_primitive(),
    ) {
        let mut container = blueprint().construct_empty();
        for op in ops {
            match op {
                Op::Set(path, value) => container.set(path.as_str(), value).unwrap(),
                Op::Deactivate(path) => { let _ = container.deactivate(path.as_str()); }
            }
        }
        container.on("a", Controller::reject_all()).unwrap();

        let current = container.current_states().clone();
        let order = container.state_order().clone();
        let general = container.general_state().clone();

        let result = container.set("a", value);

        let is_vetoed = matches!(
            result,
            Err(TransitionError::Rejected { reason: RejectReason::Vetoed, .. })
        );
        prop_assert!(is_vetoed);
        prop_assert_eq!(container.current_states(), &current);
        prop_assert_eq!(container.state_order(), &order);
        prop_assert_eq!(container.general_state(), &general);
    }

    #[test]
    fn merge_keeps_destination_values_and_adopts_the_rest(
        dest_ops in prop::collection::vec(arbitrary_op(), 0..20),
        donor_ops in prop::collection::vec(arbitrary_op(), 0..20),
    ) {
        let blueprint = blueprint();
        let mut destination = blueprint.construct_empty();
        let mut donor = blueprint.construct_empty();
        for (container, ops) in [(&mut destination, dest_ops), (&mut donor, donor_ops)] {
            for op in ops {
                match op {
                    Op::Set(path, value) => container.set(path.as_str(), value).unwrap(),
                    Op::Deactivate(path) => { let _ = container.deactivate(path.as_str()); }
                }
            }
        }

        let dest_before = destination.current_states().clone();
        let dest_order_before = destination.state_order().clone();
        let donor_before = donor.current_states().clone();

        destination.merge(&mut donor).unwrap();

        let mut expected = donor_before;
        expected.extend(dest_before);
        prop_assert_eq!(destination.current_states(), &expected);

        for (path, order) in dest_order_before {
            prop_assert_eq!(destination.state_order()[&path], order);
        }
        prop_assert!(donor.is_inert());
        prop_assert!(donor.set("a", true).is_err());
    }

    #[test]
    fn sibling_containers_never_share_state(
        ops in prop::collection::vec(arbitrary_op(), 1..20),
    ) {
        let blueprint = blueprint();
        let mut a = blueprint.construct_empty();
        let b = blueprint.construct_empty();

        for op in ops {
            match op {
                Op::Set(path, value) => a.set(path.as_str(), value).unwrap(),
                Op::Deactivate(path) => { let _ = a.deactivate(path.as_str()); }
            }
        }

        prop_assert_ne!(a.lineage(), b.lineage());
        prop_assert!(b.current_states().is_empty());
        prop_assert!(b.state_order().is_empty());
    }
}
