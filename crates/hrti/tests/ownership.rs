// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Ownership management integration tests
//!
//! Negotiated and unconditional divestiture, acquisition with and without
//! availability, cancellation, and the single-owner invariant under a random
//! mix of operations.

mod common;

use common::{drain, join, rti, set, Federate};
use hrti::{
    AttributeHandle, Callback, DeclarationManagement, ObjectInstanceHandle, ObjectManagement,
    OwnershipManagement, OwnershipState, RtiError, SupportServices,
};

struct Scene {
    a: Federate,
    b: Federate,
    object: ObjectInstanceHandle,
    position: AttributeHandle,
    name: AttributeHandle,
}

/// `a` registers a Vehicle owning Position and Name; `b` publishes Position
/// and has discovered the instance.
fn scene(rti: &hrti::Rti<hrti::Float64Time>) -> Scene {
    let a = join(rti, "a");
    let b = join(rti, "b");
    let vehicle = a.get_object_class_handle("Vehicle").unwrap();
    let position = a.get_attribute_handle(vehicle, "Position").unwrap();
    let name = a.get_attribute_handle(vehicle, "Name").unwrap();
    a.publish_object_class_attributes(vehicle, &set([position, name]))
        .unwrap();
    b.publish_object_class_attributes(vehicle, &set([position]))
        .unwrap();
    b.subscribe_object_class_attributes(vehicle, &set([position, name]))
        .unwrap();
    let object = a.register_object_instance(vehicle, None).unwrap();
    drain(&b);
    Scene {
        a,
        b,
        object,
        position,
        name,
    }
}

#[test]
fn test_registrant_owns_published_attributes() {
    let rti = rti();
    let s = scene(&rti);
    assert!(s.a.is_attribute_owned_by_federate(s.object, s.position).unwrap());
    assert!(s.a.is_attribute_owned_by_federate(s.object, s.name).unwrap());
    let privilege = s.a.get_attribute_handle(
        s.a.get_object_class_handle("Vehicle").unwrap(),
        hrti::PRIVILEGE_TO_DELETE,
    )
    .unwrap();
    assert!(s.a.is_attribute_owned_by_federate(s.object, privilege).unwrap());
    assert!(!s.b.is_attribute_owned_by_federate(s.object, s.position).unwrap());
    assert_eq!(
        s.b.ownership_state(s.object, s.position).unwrap(),
        OwnershipState::Owned
    );
}

#[test]
fn test_negotiated_transfer() {
    let rti = rti();
    let s = scene(&rti);
    let position = set([s.position]);

    s.b.attribute_ownership_acquisition(s.object, &position, b"want")
        .unwrap();
    assert_eq!(
        drain(&s.a),
        vec![Callback::RequestAttributeOwnershipRelease {
            object: s.object,
            attributes: position.clone(),
            tag: b"want".to_vec(),
        }]
    );
    assert!(drain(&s.b).is_empty());
    assert_eq!(
        s.a.ownership_state(s.object, s.position).unwrap(),
        OwnershipState::AcquisitionPending
    );
    assert_eq!(
        s.b.attribute_ownership_acquisition(s.object, &position, &[]),
        Err(RtiError::AttributeAlreadyBeingAcquired(s.position))
    );

    s.a.negotiated_attribute_ownership_divestiture(s.object, &position, b"offer")
        .unwrap();
    assert_eq!(
        drain(&s.a),
        vec![Callback::RequestDivestitureConfirmation {
            object: s.object,
            attributes: position.clone(),
        }]
    );
    assert_eq!(
        s.a.ownership_state(s.object, s.position).unwrap(),
        OwnershipState::DivestitureOffered
    );
    assert_eq!(
        s.a.negotiated_attribute_ownership_divestiture(s.object, &position, &[]),
        Err(RtiError::AttributeAlreadyBeingDivested(s.position))
    );

    // Until it confirms, the owner keeps updating.
    s.a.update_attribute_values(s.object, [(s.position, vec![1])].into_iter().collect(), &[], None)
        .unwrap();
    drain(&s.b);

    s.a.confirm_divestiture(s.object, &position, b"done").unwrap();
    assert_eq!(
        drain(&s.b),
        vec![Callback::AttributeOwnershipAcquisitionNotification {
            object: s.object,
            attributes: position.clone(),
            tag: b"done".to_vec(),
        }]
    );
    assert!(s.b.is_attribute_owned_by_federate(s.object, s.position).unwrap());
    assert!(!s.a.is_attribute_owned_by_federate(s.object, s.position).unwrap());

    assert_eq!(
        s.a.update_attribute_values(s.object, [(s.position, vec![2])].into_iter().collect(), &[], None),
        Err(RtiError::AttributeNotOwned(s.position))
    );
    assert_eq!(
        s.b.attribute_ownership_acquisition(s.object, &position, &[]),
        Err(RtiError::AttributeAlreadyOwned(s.position))
    );
    s.b.update_attribute_values(s.object, [(s.position, vec![3])].into_iter().collect(), &[], None)
        .unwrap();
}

#[test]
fn test_acquisition_if_available() {
    let rti = rti();
    let s = scene(&rti);
    let position = set([s.position]);

    s.b.attribute_ownership_acquisition_if_available(s.object, &position)
        .unwrap();
    assert_eq!(
        drain(&s.b),
        vec![Callback::AttributeOwnershipUnavailable {
            object: s.object,
            attributes: position.clone(),
        }]
    );
    assert!(drain(&s.a).is_empty());

    s.a.negotiated_attribute_ownership_divestiture(s.object, &position, b"take it")
        .unwrap();
    assert_eq!(
        drain(&s.b),
        vec![Callback::RequestAttributeOwnershipAssumption {
            object: s.object,
            attributes: position.clone(),
            tag: b"take it".to_vec(),
        }]
    );

    s.b.attribute_ownership_acquisition_if_available(s.object, &position)
        .unwrap();
    assert_eq!(
        drain(&s.a),
        vec![Callback::RequestDivestitureConfirmation {
            object: s.object,
            attributes: position.clone(),
        }]
    );
    s.a.confirm_divestiture(s.object, &position, &[]).unwrap();
    assert!(matches!(
        drain(&s.b).as_slice(),
        [Callback::AttributeOwnershipAcquisitionNotification { .. }]
    ));
}

#[test]
fn test_unconditional_divestiture_and_query() {
    let rti = rti();
    let s = scene(&rti);
    let position = set([s.position]);

    s.a.unconditional_attribute_ownership_divestiture(s.object, &position)
        .unwrap();
    assert_eq!(
        s.b.ownership_state(s.object, s.position).unwrap(),
        OwnershipState::Unowned
    );
    s.b.query_attribute_ownership(s.object, s.position).unwrap();
    assert_eq!(
        drain(&s.b),
        vec![Callback::AttributeIsNotOwned {
            object: s.object,
            attribute: s.position,
        }]
    );

    // Unowned attributes are acquired immediately.
    s.b.attribute_ownership_acquisition(s.object, &position, b"mine")
        .unwrap();
    assert!(matches!(
        drain(&s.b).as_slice(),
        [Callback::AttributeOwnershipAcquisitionNotification { .. }]
    ));

    let b_handle = s.b.federate_handle().unwrap();
    s.a.query_attribute_ownership(s.object, s.position).unwrap();
    assert_eq!(
        drain(&s.a),
        vec![Callback::InformAttributeOwnership {
            object: s.object,
            attribute: s.position,
            owner: b_handle,
        }]
    );
}

#[test]
fn test_cancellation_and_divestiture_errors() {
    let rti = rti();
    let s = scene(&rti);
    let position = set([s.position]);

    assert_eq!(
        s.a.confirm_divestiture(s.object, &position, &[]),
        Err(RtiError::AttributeDivestitureWasNotRequested(s.position))
    );
    s.a.negotiated_attribute_ownership_divestiture(s.object, &position, &[])
        .unwrap();
    assert_eq!(
        s.a.confirm_divestiture(s.object, &position, &[]),
        Err(RtiError::NoAcquisitionPending(s.position))
    );
    s.a.cancel_negotiated_attribute_ownership_divestiture(s.object, &position)
        .unwrap();
    assert_eq!(
        s.a.ownership_state(s.object, s.position).unwrap(),
        OwnershipState::Owned
    );

    s.b.attribute_ownership_acquisition(s.object, &position, &[])
        .unwrap();
    drain(&s.b);
    s.b.cancel_attribute_ownership_acquisition(s.object, &position)
        .unwrap();
    assert_eq!(
        drain(&s.b),
        vec![Callback::ConfirmAttributeOwnershipAcquisitionCancellation {
            object: s.object,
            attributes: position.clone(),
        }]
    );
    assert_eq!(
        s.b.cancel_attribute_ownership_acquisition(s.object, &position),
        Err(RtiError::AttributeAcquisitionWasNotRequested(s.position))
    );
    assert_eq!(
        s.b.negotiated_attribute_ownership_divestiture(s.object, &position, &[]),
        Err(RtiError::AttributeNotOwned(s.position))
    );
    // b never published Name.
    assert_eq!(
        s.b.attribute_ownership_acquisition(s.object, &set([s.name]), &[]),
        Err(RtiError::AttributeNotPublished(s.name))
    );
}

#[test]
fn test_divestiture_if_wanted() {
    let rti = rti();
    let s = scene(&rti);
    s.b.attribute_ownership_acquisition(s.object, &set([s.position]), &[])
        .unwrap();
    drain(&s.a);

    let divested = s
        .a
        .attribute_ownership_divestiture_if_wanted(s.object, &set([s.position, s.name]))
        .unwrap();
    assert_eq!(divested, set([s.position]));
    assert!(s.a.is_attribute_owned_by_federate(s.object, s.name).unwrap());
    assert!(s.b.is_attribute_owned_by_federate(s.object, s.position).unwrap());
    assert!(matches!(
        drain(&s.b).as_slice(),
        [Callback::AttributeOwnershipAcquisitionNotification { .. }]
    ));
}

#[test]
fn test_acquisition_requires_publication() {
    let rti = rti();
    let s = scene(&rti);
    let c = join(&rti, "c");
    let vehicle = c.get_object_class_handle("Vehicle").unwrap();
    c.subscribe_object_class_attributes(vehicle, &set([s.position]))
        .unwrap();
    assert_eq!(
        c.attribute_ownership_acquisition(s.object, &set([s.position]), &[]),
        Err(RtiError::ObjectClassNotPublished(vehicle))
    );
}

#[test]
fn test_single_owner_under_random_operations() {
    let rti = rti();
    let s = scene(&rti);
    let c = join(&rti, "c");
    let vehicle = c.get_object_class_handle("Vehicle").unwrap();
    c.publish_object_class_attributes(vehicle, &set([s.position]))
        .unwrap();
    c.subscribe_object_class_attributes(vehicle, &set([s.position]))
        .unwrap();
    let federates = [&s.a, &s.b, &c];
    let position = set([s.position]);
    let mut rng = fastrand::Rng::with_seed(42);

    for _ in 0..500 {
        let federate = federates[rng.usize(..federates.len())];
        // Rejected operations are part of the mix; only the invariant matters.
        let _ = match rng.u8(..7) {
            0 => federate.attribute_ownership_acquisition(s.object, &position, &[]),
            1 => federate.attribute_ownership_acquisition_if_available(s.object, &position),
            2 => federate.negotiated_attribute_ownership_divestiture(s.object, &position, &[]),
            3 => federate.confirm_divestiture(s.object, &position, &[]),
            4 => federate.unconditional_attribute_ownership_divestiture(s.object, &position),
            5 => federate.cancel_attribute_ownership_acquisition(s.object, &position),
            _ => federate
                .attribute_ownership_divestiture_if_wanted(s.object, &position)
                .map(|_| ()),
        };
        for f in federates {
            drain(f);
        }

        let owners: Vec<_> = federates
            .iter()
            .filter(|f| f.is_attribute_owned_by_federate(s.object, s.position).unwrap())
            .collect();
        assert!(owners.len() <= 1, "{} owners", owners.len());
        let state = s.a.ownership_state(s.object, s.position).unwrap();
        assert_eq!(state == OwnershipState::Unowned, owners.is_empty());
    }
}
