// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(dead_code)] // Each test binary uses a different subset

//! Shared fixtures for the integration tests.

use std::collections::BTreeSet;

use hrti::{
    AttributeDef, Callback, CallbackModel, FederationManagement, Float64Time,
    InteractionClassDef, NullFederateAmbassador, ObjectClassDef, ObjectModel, OrderType, Rti,
    RtiAmbassador, RtiConfig,
};

pub const FEDERATION: &str = "city";

pub type Federate = RtiAmbassador<Float64Time>;

/// Vehicle(Position: timestamp, X; Name) <- Car(Doors), interaction Honk(Volume).
pub fn traffic_model() -> ObjectModel {
    ObjectModel::new("Traffic")
        .with_dimension("X", 100)
        .with_dimension("Y", 100)
        .with_object_class(
            ObjectClassDef::new("Vehicle")
                .with_attribute(
                    AttributeDef::new("Position")
                        .with_order(OrderType::Timestamp)
                        .with_dimension("X"),
                )
                .with_attribute(AttributeDef::new("Name")),
        )
        .with_object_class(
            ObjectClassDef::new("Car")
                .with_parent("Vehicle")
                .with_attribute(AttributeDef::new("Doors")),
        )
        .with_interaction_class(
            InteractionClassDef::new("Honk")
                .with_parameter("Volume")
                .with_dimension("X"),
        )
}

/// RTI with the traffic federation already created.
pub fn rti() -> Rti<Float64Time> {
    let rti = Rti::new(RtiConfig::default()).unwrap();
    rti.create_federation_execution(FEDERATION, &traffic_model())
        .unwrap();
    rti
}

/// Evoked-model session joined to the traffic federation as `name`.
pub fn join(rti: &Rti<Float64Time>, name: &str) -> Federate {
    let federate = rti
        .connect(NullFederateAmbassador, CallbackModel::Evoked)
        .unwrap();
    federate
        .join_federation_execution(Some(name), "test", FEDERATION)
        .unwrap();
    federate
}

/// Every callback currently queued for `federate`.
pub fn drain(federate: &Federate) -> Vec<Callback<Float64Time>> {
    federate.drain_callbacks(usize::MAX)
}

pub fn t(value: f64) -> Float64Time {
    Float64Time::new(value)
}

pub fn set<H: Ord>(items: impl IntoIterator<Item = H>) -> BTreeSet<H> {
    items.into_iter().collect()
}

/// Time of the single grant in `callbacks`, if any.
pub fn granted(callbacks: &[Callback<Float64Time>]) -> Option<Float64Time> {
    callbacks.iter().find_map(|c| match c {
        Callback::TimeAdvanceGrant { time } => Some(*time),
        _ => None,
    })
}
