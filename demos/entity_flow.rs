//! Entity Flow
//!
//! This example walks a parcel through a delivery flow: a warehouse
//! container collects states, controllers guard the transitions, and the
//! parcel's states finally merge into the courier's container.
//!
//! Key concepts:
//! - Blueprints with a base capability provider
//! - Controller-gated and controller-rewritten values
//! - Flags derived from boolean states
//! - Merging with destination precedence
//!
//! Run with: cargo run --example entity_flow

use stateflow::controller::{Controller, ControllerDecision};
use stateflow::core::Primitive;
use stateflow::lineage::{Blueprint, CapabilityProvider, Member};
use stateflow::states;
use std::sync::Arc;

struct TrackingProvider;

impl CapabilityProvider for TrackingProvider {
    fn members(&self) -> Vec<(String, Member)> {
        vec![(
            "carrier".to_string(),
            Member::Attribute(Primitive::from("stateflow-express")),
        )]
    }
}

fn main() {
    println!("=== Entity Flow Example ===\n");

    let blueprint = Blueprint::builder("parcel")
        .provider(Arc::new(TrackingProvider))
        .build()
        .unwrap();

    let members: Vec<_> = blueprint.operations().names().collect();
    println!("Blueprint members: {members:?}");
    println!("Non-meta state: {}\n", blueprint.non_meta_state());

    let mut parcel = blueprint
        .construct(states! {
            "parcel-packed" => false,
            "parcel-weight" => 0,
        })
        .unwrap();

    // Weights are stored in whole grams
    parcel
        .on(
            "parcel-weight",
            Controller::new(|_, _, proposed| match proposed.as_number() {
                Some(grams) if grams >= 0.0 => {
                    ControllerDecision::Accept(Primitive::Number(grams.round()))
                }
                _ => ControllerDecision::Reject,
            }),
        )
        .unwrap();

    parcel.set("parcel-weight", 1250.4).unwrap();
    parcel.set("parcel-packed", true).unwrap();

    match parcel.set("parcel-weight", -3) {
        Ok(()) => println!("Unexpected: negative weight accepted"),
        Err(e) => println!("Rejected as expected: {e}"),
    }

    println!("Parcel flags: {:?}", parcel.flags());

    let mut courier = blueprint
        .construct(states! {
            "parcel-packed" => false,
            "route-stop" => 4,
        })
        .unwrap();

    let report = courier.merge(&mut parcel).unwrap();
    println!("\nMerged parcel into courier");
    println!("  adopted:   {:?}", report.adopted);
    println!("  discarded: {:?}", report.discarded);
    println!(
        "Courier general state: {}",
        serde_json::to_string_pretty(courier.general_state()).unwrap()
    );

    if let Err(e) = parcel.set("parcel-packed", false) {
        println!("\nParcel is now inert: {e}");
    }

    println!("\n=== Example Complete ===");
}
