// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::float_cmp)] // Grants are compared against the exact requested values
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Time management integration tests
//!
//! Conservative advancement between a regulating and a constrained federate:
//! grant conditions per request kind, timestamp-ordered delivery, zero
//! lookahead and the interaction between regulation and existing grants.

mod common;

use common::{drain, granted, join, rti, set, t, traffic_model, Federate, FEDERATION};
use hrti::{
    Callback, CallbackModel, DeclarationManagement, FederationManagement, Float64Interval,
    Float64Time, Integer64Interval, Integer64Time, NullFederateAmbassador, ObjectInstanceHandle,
    ObjectManagement, OrderType, Rti, RtiConfig, RtiError, SupportServices, TimeAdvanceState,
    TimeManagement,
};

/// `a` regulating with lookahead 1, `b` constrained, both at time 0.
fn regulated_pair(rti: &Rti<Float64Time>) -> (Federate, Federate) {
    let a = join(rti, "a");
    let b = join(rti, "b");
    a.enable_time_regulation(Float64Interval::new(1.0)).unwrap();
    assert_eq!(
        drain(&a),
        vec![Callback::TimeRegulationEnabled { time: t(0.0) }]
    );
    b.enable_time_constrained().unwrap();
    assert_eq!(
        drain(&b),
        vec![Callback::TimeConstrainedEnabled { time: t(0.0) }]
    );
    (a, b)
}

/// `a` publishes Vehicle.Position, `b` subscribes and has discovered one instance.
fn position_link(a: &Federate, b: &Federate) -> (ObjectInstanceHandle, hrti::AttributeHandle) {
    let vehicle = a.get_object_class_handle("Vehicle").unwrap();
    let position = a.get_attribute_handle(vehicle, "Position").unwrap();
    a.publish_object_class_attributes(vehicle, &set([position]))
        .unwrap();
    b.subscribe_object_class_attributes(vehicle, &set([position]))
        .unwrap();
    let object = a.register_object_instance(vehicle, None).unwrap();
    assert!(matches!(
        drain(b).as_slice(),
        [Callback::DiscoverObjectInstance { .. }]
    ));
    (object, position)
}

#[test]
fn test_time_advance_request_waits_for_galt() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    assert_eq!(b.query_galt().unwrap(), Some(t(1.0)));
    assert_eq!(a.query_galt().unwrap(), None);
    assert_eq!(b.federation_galt().unwrap(), Some(t(1.0)));

    b.time_advance_request(t(2.0)).unwrap();
    assert!(drain(&b).is_empty());
    assert!(matches!(
        b.time_advance_state().unwrap(),
        TimeAdvanceState::TimeAdvancing { requested, .. } if requested == t(2.0)
    ));

    // An unconstrained federate is granted at once.
    a.time_advance_request(t(0.5)).unwrap();
    assert_eq!(granted(&drain(&a)), Some(t(0.5)));
    assert!(drain(&b).is_empty());

    // GALT 2.0 is not strictly above the request.
    a.time_advance_request(t(1.0)).unwrap();
    assert_eq!(granted(&drain(&a)), Some(t(1.0)));
    assert!(drain(&b).is_empty());

    a.time_advance_request(t(1.5)).unwrap();
    drain(&a);
    assert_eq!(drain(&b), vec![Callback::TimeAdvanceGrant { time: t(2.0) }]);
    assert_eq!(b.query_logical_time().unwrap(), t(2.0));
    assert_eq!(b.time_advance_state().unwrap(), TimeAdvanceState::Granted);
}

#[test]
fn test_time_advance_request_available_granted_at_galt() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    a.time_advance_request(t(1.0)).unwrap();
    drain(&a);

    b.time_advance_request_available(t(2.0)).unwrap();
    assert_eq!(drain(&b), vec![Callback::TimeAdvanceGrant { time: t(2.0) }]);
}

#[test]
fn test_next_message_request_delivers_earliest_message() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    let (object, position) = position_link(&a, &b);

    a.update_attribute_values(object, [(position, vec![7])].into_iter().collect(), b"p", Some(t(1.5)))
        .unwrap();
    assert!(drain(&b).is_empty());
    assert_eq!(b.query_lits().unwrap(), Some(t(1.0)));

    b.next_message_request(t(5.0)).unwrap();
    assert!(drain(&b).is_empty());

    a.time_advance_request(t(3.0)).unwrap();
    let callbacks = drain(&b);
    assert_eq!(callbacks.len(), 2);
    match &callbacks[0] {
        Callback::ReflectAttributeValues {
            object: reflected,
            values,
            time,
            sent_order,
            received_order,
            ..
        } => {
            assert_eq!(*reflected, object);
            assert_eq!(values.get(&position), Some(&vec![7]));
            assert_eq!(*time, Some(t(1.5)));
            assert_eq!(*sent_order, OrderType::Timestamp);
            assert_eq!(*received_order, OrderType::Timestamp);
        }
        other => panic!("expected a reflection, got {:?}", other),
    }
    assert_eq!(callbacks[1], Callback::TimeAdvanceGrant { time: t(1.5) });

    // a was granted 3.0: its least outgoing timestamp is now 4.0.
    assert!(matches!(
        a.update_attribute_values(object, [(position, vec![8])].into_iter().collect(), &[], Some(t(3.5))),
        Err(RtiError::InvalidLogicalTime(_))
    ));
}

#[test]
fn test_flush_queue_delivers_everything() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    let (object, position) = position_link(&a, &b);
    for stamp in [4.0, 1.5] {
        a.update_attribute_values(object, [(position, vec![1])].into_iter().collect(), &[], Some(t(stamp)))
            .unwrap();
    }

    b.flush_queue_request(t(10.0)).unwrap();
    let callbacks = drain(&b);
    let times: Vec<_> = callbacks
        .iter()
        .filter_map(|c| match c {
            Callback::ReflectAttributeValues { time, .. } => *time,
            _ => None,
        })
        .collect();
    assert_eq!(times, vec![t(1.5), t(4.0)]);
    assert_eq!(granted(&callbacks), Some(t(1.0)));
}

#[test]
fn test_unconstrained_receiver_gets_receive_order() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    a.enable_time_regulation(Float64Interval::new(1.0)).unwrap();
    let (object, position) = position_link(&a, &b);

    a.update_attribute_values(object, [(position, vec![1])].into_iter().collect(), &[], Some(t(5.0)))
        .unwrap();
    assert!(matches!(
        drain(&b).as_slice(),
        [Callback::ReflectAttributeValues {
            sent_order: OrderType::Timestamp,
            received_order: OrderType::Receive,
            ..
        }]
    ));
}

#[test]
fn test_receive_order_held_until_request() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    b.enable_time_constrained().unwrap();
    drain(&b);
    let honk = a.get_interaction_class_handle("Honk").unwrap();
    a.publish_interaction_class(honk).unwrap();
    b.subscribe_interaction_class(honk).unwrap();

    a.send_interaction(honk, Default::default(), b"beep", None)
        .unwrap();
    assert!(drain(&b).is_empty());

    b.time_advance_request(t(1.0)).unwrap();
    let callbacks = drain(&b);
    assert!(matches!(
        callbacks.as_slice(),
        [Callback::ReceiveInteraction { .. }, Callback::TimeAdvanceGrant { .. }]
    ));

    b.enable_asynchronous_delivery().unwrap();
    a.send_interaction(honk, Default::default(), &[], None)
        .unwrap();
    assert_eq!(drain(&b).len(), 1);
    assert_eq!(
        b.enable_asynchronous_delivery(),
        Err(RtiError::AsynchronousDeliveryAlreadyEnabled)
    );
}

#[test]
fn test_disable_constrained_releases_queue() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    let (object, position) = position_link(&a, &b);
    a.update_attribute_values(object, [(position, vec![1])].into_iter().collect(), &[], Some(t(2.0)))
        .unwrap();
    assert!(drain(&b).is_empty());

    b.disable_time_constrained().unwrap();
    assert!(matches!(
        drain(&b).as_slice(),
        [Callback::ReflectAttributeValues {
            received_order: OrderType::Receive,
            ..
        }]
    ));
    assert_eq!(
        b.disable_time_constrained(),
        Err(RtiError::TimeConstrainedIsNotEnabled)
    );
}

#[test]
fn test_regulation_respects_existing_grants() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    b.enable_time_constrained().unwrap();
    b.time_advance_request(t(5.0)).unwrap();
    assert_eq!(granted(&drain(&b)), Some(t(5.0)));

    a.enable_time_regulation(Float64Interval::new(1.0)).unwrap();
    let time = match drain(&a).as_slice() {
        [Callback::TimeRegulationEnabled { time }] => *time,
        other => panic!("expected regulation enabled, got {:?}", other),
    };
    assert!(time > t(4.0));
    assert!(b.query_galt().unwrap().unwrap() > t(5.0));
    assert_eq!(a.query_logical_time().unwrap(), time);
}

#[test]
fn test_time_management_errors() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    assert_eq!(
        a.enable_time_regulation(Float64Interval::new(1.0)),
        Err(RtiError::TimeRegulationAlreadyEnabled)
    );
    assert_eq!(
        b.enable_time_constrained(),
        Err(RtiError::TimeConstrainedAlreadyEnabled)
    );
    assert_eq!(b.query_lookahead(), Err(RtiError::TimeRegulationIsNotEnabled));
    assert!(matches!(
        b.enable_time_regulation(Float64Interval::new(-1.0)),
        Err(RtiError::InvalidLookahead(_))
    ));
    assert!(matches!(
        b.time_advance_request(t(0.0)),
        Err(RtiError::LogicalTimeAlreadyPassed(_))
    ));

    b.time_advance_request(t(3.0)).unwrap();
    assert_eq!(
        b.time_advance_request(t(4.0)),
        Err(RtiError::InTimeAdvancingState)
    );

    a.modify_lookahead(Float64Interval::new(2.5)).unwrap();
    assert_eq!(a.query_lookahead().unwrap(), Float64Interval::new(2.5));
    a.disable_time_regulation().unwrap();
    // Without a regulating federate the pending request completes.
    assert_eq!(drain(&b), vec![Callback::TimeAdvanceGrant { time: t(3.0) }]);
    assert_eq!(b.query_galt().unwrap(), None);
}

#[test]
fn test_zero_lookahead_integer_time() {
    let rti = Rti::<Integer64Time>::new(RtiConfig::default()).unwrap();
    rti.create_federation_execution(FEDERATION, &traffic_model())
        .unwrap();
    let session = |name: &str| {
        let federate = rti
            .connect(NullFederateAmbassador, CallbackModel::Evoked)
            .unwrap();
        federate
            .join_federation_execution(Some(name), "test", FEDERATION)
            .unwrap();
        federate
    };
    let a = session("a");
    let b = session("b");
    a.enable_time_regulation(Integer64Interval::new(0)).unwrap();
    b.enable_time_regulation(Integer64Interval::new(0)).unwrap();
    a.enable_time_constrained().unwrap();
    b.enable_time_constrained().unwrap();
    a.drain_callbacks(usize::MAX);
    b.drain_callbacks(usize::MAX);

    a.time_advance_request(Integer64Time::new(5)).unwrap();
    assert!(a.drain_callbacks(usize::MAX).is_empty());

    b.time_advance_request(Integer64Time::new(5)).unwrap();
    let grant = Callback::TimeAdvanceGrant {
        time: Integer64Time::new(5),
    };
    assert_eq!(a.drain_callbacks(usize::MAX), vec![grant.clone()]);
    assert_eq!(b.drain_callbacks(usize::MAX), vec![grant]);

    // A zero-lookahead grant from a plain request cannot send at 5 any more.
    assert_eq!(a.query_galt().unwrap(), Some(Integer64Time::new(6)));
}

#[test]
fn test_grants_stay_below_galt() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    let mut rng = fastrand::Rng::with_seed(7);
    let mut a_time = 0.0;

    for _ in 0..200 {
        if rng.bool() {
            a_time += 0.1 + rng.f64() * 2.0;
            a.time_advance_request(t(a_time)).unwrap();
            assert_eq!(granted(&drain(&a)), Some(t(a_time)));
        }
        if b.time_advance_state().unwrap() == TimeAdvanceState::Granted {
            let now = b.query_logical_time().unwrap().value();
            let requested = t(now + 0.1 + rng.f64() * 3.0);
            if rng.bool() {
                b.time_advance_request(requested).unwrap();
            } else {
                b.next_message_request(requested).unwrap();
            }
        }
        for callback in drain(&b) {
            if let Callback::TimeAdvanceGrant { time } = callback {
                let galt = b.query_galt().unwrap().unwrap();
                assert!(time < galt, "granted {} with GALT {}", time, galt);
            }
        }
    }
}

#[test]
fn test_retract_queued_update() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    let (object, position) = position_link(&a, &b);

    let untimed = a
        .update_attribute_values(object, [(position, vec![0])].into_iter().collect(), &[], None)
        .unwrap();
    assert_eq!(untimed, None);
    let handle = a
        .update_attribute_values(object, [(position, vec![1])].into_iter().collect(), &[], Some(t(3.0)))
        .unwrap()
        .expect("timestamp-ordered update has a retraction handle");
    a.retract(handle).unwrap();
    assert_eq!(
        a.retract(handle),
        Err(RtiError::MessageCanNoLongerBeRetracted(handle))
    );

    b.time_advance_request(t(3.5)).unwrap();
    a.time_advance_request(t(4.0)).unwrap();
    drain(&a);
    let callbacks = drain(&b);
    // Only the receive-order update held back by the constraint remains.
    assert!(matches!(
        callbacks.as_slice(),
        [
            Callback::ReflectAttributeValues { time: None, retraction: None, .. },
            Callback::TimeAdvanceGrant { .. },
        ]
    ));
    assert_eq!(granted(&callbacks), Some(t(3.5)));
}

#[test]
fn test_retract_delivered_update_notifies_receiver() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    a.enable_time_regulation(Float64Interval::new(1.0)).unwrap();
    let (object, position) = position_link(&a, &b);

    let handle = a
        .update_attribute_values(object, [(position, vec![1])].into_iter().collect(), &[], Some(t(5.0)))
        .unwrap()
        .expect("timestamp-ordered update has a retraction handle");
    assert!(matches!(
        drain(&b).as_slice(),
        [Callback::ReflectAttributeValues { retraction: Some(r), .. }] if *r == handle
    ));
    a.retract(handle).unwrap();
    assert_eq!(
        drain(&b),
        vec![Callback::RequestRetraction { retraction: handle }]
    );
}

#[test]
fn test_retraction_refused() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    let honk = a.get_interaction_class_handle("Honk").unwrap();
    a.publish_interaction_class(honk).unwrap();

    let handle = a
        .send_interaction(honk, Default::default(), &[], Some(t(2.0)))
        .unwrap();
    // Honk is receive ordered.
    assert_eq!(handle, None);

    let (object, position) = position_link(&a, &b);
    let handle = a
        .update_attribute_values(object, [(position, vec![1])].into_iter().collect(), &[], Some(t(2.0)))
        .unwrap()
        .expect("timestamp-ordered update has a retraction handle");
    assert_eq!(b.retract(handle), Err(RtiError::TimeRegulationIsNotEnabled));
    b.enable_time_regulation(Float64Interval::new(1.0)).unwrap();
    assert_eq!(
        b.retract(handle),
        Err(RtiError::InvalidMessageRetractionHandle(handle))
    );

    a.time_advance_request(t(2.0)).unwrap();
    assert_eq!(granted(&drain(&a)), Some(t(2.0)));
    assert_eq!(
        a.retract(handle),
        Err(RtiError::MessageCanNoLongerBeRetracted(handle))
    );
}

#[test]
fn test_retracted_delete_restores_instance() {
    let rti = rti();
    let (a, b) = regulated_pair(&rti);
    let (object, position) = position_link(&a, &b);
    let name = a.get_object_instance_name(object).unwrap();

    let handle = a
        .delete_object_instance(object, b"gone", Some(t(2.0)))
        .unwrap()
        .expect("timestamp-ordered delete has a retraction handle");
    assert!(a.get_object_instance_handle(&name).is_err());

    a.retract(handle).unwrap();
    assert_eq!(a.get_object_instance_handle(&name).unwrap(), object);
    assert_eq!(
        b.get_known_object_class_handle(object).unwrap(),
        a.get_object_class_handle("Vehicle").unwrap()
    );
    a.update_attribute_values(object, [(position, vec![2])].into_iter().collect(), &[], None)
        .unwrap();

    // The queued removal never reaches b.
    b.time_advance_request(t(2.5)).unwrap();
    a.time_advance_request(t(3.0)).unwrap();
    let callbacks = drain(&b);
    assert!(!callbacks
        .iter()
        .any(|c| matches!(c, Callback::RemoveObjectInstance { .. })));
    assert_eq!(granted(&callbacks), Some(t(2.5)));
}
