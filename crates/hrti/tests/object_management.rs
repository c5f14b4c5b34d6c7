// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Object management integration tests
//!
//! Name reservation, registration and discovery through the class
//! hierarchy, attribute filtering, interactions and deletion.

mod common;

use common::{drain, join, rti, set, Federate};
use hrti::{
    AttributeHandle, AttributeValues, Callback, DeclarationManagement, InteractionClassHandle,
    ObjectClassHandle, ObjectManagement, OrderType, ParameterHandle, ParameterValues, RtiError,
    SupportServices, TransportationType,
};

struct Handles {
    vehicle: ObjectClassHandle,
    car: ObjectClassHandle,
    position: AttributeHandle,
    name: AttributeHandle,
    doors: AttributeHandle,
    honk: InteractionClassHandle,
    volume: ParameterHandle,
}

fn handles(federate: &Federate) -> Handles {
    let vehicle = federate.get_object_class_handle("Vehicle").unwrap();
    let car = federate.get_object_class_handle("Car").unwrap();
    let honk = federate.get_interaction_class_handle("Honk").unwrap();
    Handles {
        vehicle,
        car,
        position: federate.get_attribute_handle(vehicle, "Position").unwrap(),
        name: federate.get_attribute_handle(vehicle, "Name").unwrap(),
        doors: federate.get_attribute_handle(car, "Doors").unwrap(),
        honk,
        volume: federate.get_parameter_handle(honk, "Volume").unwrap(),
    }
}

fn values(items: &[(AttributeHandle, &[u8])]) -> AttributeValues {
    items.iter().map(|(a, v)| (*a, v.to_vec())).collect()
}

#[test]
fn test_name_reservation() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    let h = handles(&a);

    a.reserve_object_instance_name("truck").unwrap();
    b.reserve_object_instance_name("truck").unwrap();
    assert_eq!(
        drain(&a),
        vec![Callback::ObjectInstanceNameReservationSucceeded {
            name: "truck".into()
        }]
    );
    assert_eq!(
        drain(&b),
        vec![Callback::ObjectInstanceNameReservationFailed {
            name: "truck".into()
        }]
    );
    for illegal in ["", "HLAtruck"] {
        assert_eq!(
            a.reserve_object_instance_name(illegal),
            Err(RtiError::IllegalName(illegal.into()))
        );
    }
    assert_eq!(
        b.release_object_instance_name("truck"),
        Err(RtiError::ObjectInstanceNameNotReserved("truck".into()))
    );

    a.publish_object_class_attributes(h.vehicle, &set([h.name]))
        .unwrap();
    b.publish_object_class_attributes(h.vehicle, &set([h.name]))
        .unwrap();
    assert_eq!(
        b.register_object_instance(h.vehicle, Some("truck")),
        Err(RtiError::ObjectInstanceNameInUse("truck".into()))
    );
    let truck = a.register_object_instance(h.vehicle, Some("truck")).unwrap();
    assert_eq!(a.get_object_instance_handle("truck").unwrap(), truck);
    assert_eq!(
        b.register_object_instance(h.vehicle, Some("truck")),
        Err(RtiError::ObjectInstanceNameInUse("truck".into()))
    );

    let unnamed = a.register_object_instance(h.vehicle, None).unwrap();
    assert_eq!(
        a.get_object_instance_name(unnamed).unwrap(),
        format!("HLAobject_{}", unnamed.value())
    );
    assert_eq!(
        a.register_object_instance(h.car, None),
        Err(RtiError::ObjectClassNotPublished(h.car))
    );
}

#[test]
fn test_discovery_and_update_filtering() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    let h = handles(&a);
    let a_handle = a.federate_handle().unwrap();

    a.publish_object_class_attributes(h.car, &set([h.position, h.name, h.doors]))
        .unwrap();
    b.subscribe_object_class_attributes(h.vehicle, &set([h.position]))
        .unwrap();
    let object = a.register_object_instance(h.car, Some("c1")).unwrap();

    // Known as the subscribed superclass.
    assert_eq!(
        drain(&b),
        vec![Callback::DiscoverObjectInstance {
            object,
            class: h.vehicle,
            name: "c1".into(),
            producer: a_handle,
        }]
    );
    assert_eq!(b.get_known_object_class_handle(object).unwrap(), h.vehicle);
    assert_eq!(a.get_known_object_class_handle(object).unwrap(), h.car);

    a.update_attribute_values(object, values(&[(h.name, b"x"), (h.doors, b"4")]), &[], None)
        .unwrap();
    assert!(drain(&b).is_empty());

    a.update_attribute_values(
        object,
        values(&[(h.position, b"12"), (h.doors, b"4")]),
        b"tick",
        None,
    )
    .unwrap();
    assert_eq!(
        drain(&b),
        vec![Callback::ReflectAttributeValues {
            object,
            values: values(&[(h.position, b"12")]),
            tag: b"tick".to_vec(),
            sent_order: OrderType::Receive,
            transportation: TransportationType::Reliable,
            time: None,
            received_order: OrderType::Receive,
            retraction: None,
            producer: a_handle,
        }]
    );
    assert!(drain(&a).is_empty());

    assert_eq!(
        b.update_attribute_values(object, values(&[(h.position, b"0")]), &[], None),
        Err(RtiError::AttributeNotOwned(h.position))
    );

    // A later subscriber to the exact class discovers the existing instance.
    let c = join(&rti, "c");
    c.subscribe_object_class_attributes(h.car, &set([h.doors]))
        .unwrap();
    assert_eq!(
        drain(&c),
        vec![Callback::DiscoverObjectInstance {
            object,
            class: h.car,
            name: "c1".into(),
            producer: a_handle,
        }]
    );
    assert_eq!(c.get_known_object_class_handle(object).unwrap(), h.car);
}

#[test]
fn test_interactions() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    let c = join(&rti, "c");
    let h = handles(&a);

    a.publish_interaction_class(h.honk).unwrap();
    b.subscribe_interaction_class(h.honk).unwrap();
    let parameters: ParameterValues = [(h.volume, vec![9])].into_iter().collect();
    a.send_interaction(h.honk, parameters.clone(), b"beep", None)
        .unwrap();

    assert_eq!(
        drain(&b),
        vec![Callback::ReceiveInteraction {
            class: h.honk,
            parameters: parameters.clone(),
            tag: b"beep".to_vec(),
            sent_order: OrderType::Receive,
            transportation: TransportationType::Reliable,
            time: None,
            received_order: OrderType::Receive,
            retraction: None,
            producer: a.federate_handle().unwrap(),
        }]
    );
    assert!(drain(&a).is_empty());
    assert!(drain(&c).is_empty());

    assert_eq!(
        c.send_interaction(h.honk, parameters, &[], None),
        Err(RtiError::InteractionClassNotPublished(h.honk))
    );

    b.unsubscribe_interaction_class(h.honk).unwrap();
    a.send_interaction(h.honk, ParameterValues::new(), &[], None)
        .unwrap();
    assert!(drain(&b).is_empty());
}

#[test]
fn test_attribute_value_update_requests() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    let h = handles(&a);

    a.publish_object_class_attributes(h.vehicle, &set([h.position, h.name]))
        .unwrap();
    b.subscribe_object_class_attributes(h.vehicle, &set([h.position, h.name]))
        .unwrap();
    let object = a.register_object_instance(h.vehicle, None).unwrap();
    drain(&b);

    b.request_attribute_value_update(object, &set([h.position]), b"please")
        .unwrap();
    assert_eq!(
        drain(&a),
        vec![Callback::ProvideAttributeValueUpdate {
            object,
            attributes: set([h.position]),
            tag: b"please".to_vec(),
        }]
    );

    b.request_class_attribute_value_update(h.vehicle, &set([h.position, h.name]), &[])
        .unwrap();
    assert_eq!(
        drain(&a),
        vec![Callback::ProvideAttributeValueUpdate {
            object,
            attributes: set([h.position, h.name]),
            tag: Vec::new(),
        }]
    );

    // The owner asking itself gets nothing.
    a.request_attribute_value_update(object, &set([h.position]), &[])
        .unwrap();
    assert!(drain(&a).is_empty());
}

#[test]
fn test_deletion() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    let h = handles(&a);

    a.publish_object_class_attributes(h.vehicle, &set([h.name]))
        .unwrap();
    b.subscribe_object_class_attributes(h.vehicle, &set([h.name]))
        .unwrap();
    let object = a.register_object_instance(h.vehicle, Some("bus")).unwrap();
    drain(&b);

    assert_eq!(
        b.delete_object_instance(object, &[], None),
        Err(RtiError::DeletePrivilegeNotHeld(object))
    );
    assert_eq!(
        a.local_delete_object_instance(object),
        Err(RtiError::FederateOwnsAttributes(a.federate_handle().unwrap()))
    );

    // A local delete forgets the instance until it is discovered again.
    b.local_delete_object_instance(object).unwrap();
    assert_eq!(
        b.get_known_object_class_handle(object),
        Err(RtiError::ObjectInstanceNotKnown(object))
    );
    b.subscribe_object_class_attributes(h.vehicle, &set([h.position]))
        .unwrap();
    assert_eq!(drain(&b).len(), 1);

    a.delete_object_instance(object, b"bye", None).unwrap();
    assert_eq!(
        drain(&b),
        vec![Callback::RemoveObjectInstance {
            object,
            tag: b"bye".to_vec(),
            sent_order: OrderType::Receive,
            time: None,
            received_order: OrderType::Receive,
            retraction: None,
            producer: a.federate_handle().unwrap(),
        }]
    );
    assert_eq!(
        a.get_object_instance_handle("bus"),
        Err(RtiError::NameNotFound("bus".into()))
    );
    assert_eq!(
        a.update_attribute_values(object, values(&[(h.name, b"x")]), &[], None),
        Err(RtiError::ObjectInstanceNotKnown(object))
    );
}
