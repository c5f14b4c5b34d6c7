// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Federation save and restore integration tests

mod common;

use common::{drain, join, rti, set, t, Federate, FEDERATION};
use hrti::{
    Callback, CallbackModel, DeclarationManagement, FederationManagement, NullFederateAmbassador,
    ObjectClassHandle, ObjectManagement, ResignAction, RestoreFailureReason, RtiError,
    SaveFailureReason, SaveRestoreState, SaveStatus, SupportServices, TimeManagement,
};

fn publish_vehicle(federate: &Federate) -> ObjectClassHandle {
    let vehicle = federate.get_object_class_handle("Vehicle").unwrap();
    let name = federate.get_attribute_handle(vehicle, "Name").unwrap();
    federate
        .publish_object_class_attributes(vehicle, &set([name]))
        .unwrap();
    vehicle
}

/// Run a complete untimed save labelled `label`.
fn save(members: &[&Federate], label: &str) {
    members[0].request_federation_save(label, None).unwrap();
    for member in members {
        drain(member);
        member.federate_save_begun().unwrap();
        member.federate_save_complete().unwrap();
    }
    for member in members {
        assert_eq!(drain(member), vec![Callback::FederationSaved]);
    }
}

#[test]
fn test_save_completes_after_every_member() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");

    a.request_federation_save("s1", None).unwrap();
    let initiate = Callback::InitiateFederateSave {
        label: "s1".into(),
        time: None,
    };
    assert_eq!(drain(&a), vec![initiate.clone()]);
    assert_eq!(drain(&b), vec![initiate]);
    assert_eq!(a.save_restore_state().unwrap(), SaveRestoreState::Saving);

    // Instructed federates are blocked until the save is decided.
    assert_eq!(
        a.get_object_class_handle("Vehicle")
            .and_then(|vehicle| a.publish_object_class_attributes(vehicle, &set([]))),
        Err(RtiError::SaveInProgress)
    );
    assert_eq!(a.federate_save_complete(), Err(RtiError::FederateHasNotBegunSave));
    assert_eq!(
        a.request_federation_save("again", None),
        Err(RtiError::SaveInProgress)
    );

    a.federate_save_begun().unwrap();
    a.federate_save_complete().unwrap();
    assert!(drain(&a).is_empty());

    let (a_handle, b_handle) = (a.federate_handle().unwrap(), b.federate_handle().unwrap());
    b.query_federation_save_status().unwrap();
    assert_eq!(
        drain(&b),
        vec![Callback::FederationSaveStatusResponse {
            statuses: vec![
                (a_handle, SaveStatus::FederateWaitingForFederationToSave),
                (b_handle, SaveStatus::FederateInstructedToSave),
            ],
        }]
    );

    b.federate_save_begun().unwrap();
    b.federate_save_complete().unwrap();
    assert_eq!(drain(&a), vec![Callback::FederationSaved]);
    assert_eq!(drain(&b), vec![Callback::FederationSaved]);
    assert_eq!(a.save_restore_state().unwrap(), SaveRestoreState::SaveComplete);
    publish_vehicle(&a);
}

#[test]
fn test_save_failures() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");

    a.request_federation_save("bad", None).unwrap();
    a.federate_save_begun().unwrap();
    a.federate_save_not_complete().unwrap();
    b.federate_save_begun().unwrap();
    b.federate_save_complete().unwrap();
    let failed = Callback::FederationNotSaved {
        reason: SaveFailureReason::FederateReportedFailureDuringSave,
    };
    assert_eq!(drain(&a).last(), Some(&failed));
    assert_eq!(drain(&b).last(), Some(&failed));
    assert_eq!(a.save_restore_state().unwrap(), SaveRestoreState::SaveFailed);

    a.request_federation_save("aborted", None).unwrap();
    let late = rti
        .connect(NullFederateAmbassador, CallbackModel::Evoked)
        .unwrap();
    assert_eq!(
        late.join_federation_execution(Some("late"), "test", FEDERATION),
        Err(RtiError::SaveInProgress)
    );
    b.abort_federation_save().unwrap();
    assert_eq!(
        drain(&a).last(),
        Some(&Callback::FederationNotSaved {
            reason: SaveFailureReason::SaveAborted
        })
    );
    assert_eq!(b.abort_federation_save(), Err(RtiError::SaveNotInProgress));

    a.request_federation_save("resigned", None).unwrap();
    drain(&a);
    b.resign_federation_execution(ResignAction::NoAction).unwrap();
    assert_eq!(
        drain(&a),
        vec![Callback::FederationNotSaved {
            reason: SaveFailureReason::FederateResignedDuringSave
        }]
    );
}

#[test]
fn test_timed_save_instructs_on_arrival() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");

    a.request_federation_save("at-two", Some(t(2.0))).unwrap();
    assert!(drain(&a).is_empty());
    assert_eq!(a.save_restore_state().unwrap(), SaveRestoreState::SaveRequested);

    a.time_advance_request(t(2.0)).unwrap();
    assert_eq!(
        drain(&a),
        vec![
            Callback::TimeAdvanceGrant { time: t(2.0) },
            Callback::InitiateFederateSave {
                label: "at-two".into(),
                time: Some(t(2.0)),
            },
        ]
    );
    assert_eq!(
        a.time_advance_request(t(3.0)),
        Err(RtiError::SaveInProgress)
    );

    // b has not been instructed yet and keeps running.
    b.time_advance_request(t(2.5)).unwrap();
    assert!(matches!(
        drain(&b).as_slice(),
        [Callback::TimeAdvanceGrant { .. }, Callback::InitiateFederateSave { .. }]
    ));
    assert_eq!(a.save_restore_state().unwrap(), SaveRestoreState::Saving);
}

#[test]
fn test_timed_save_that_cannot_be_honoured() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    a.time_advance_request(t(3.0)).unwrap();
    drain(&a);

    assert!(matches!(
        a.request_federation_save("past", Some(t(1.0))),
        Err(RtiError::LogicalTimeAlreadyPassed(_))
    ));

    b.request_federation_save("past", Some(t(2.5))).unwrap();
    let failed = Callback::FederationNotSaved {
        reason: SaveFailureReason::SaveTimeCannotBeHonored,
    };
    assert_eq!(drain(&a), vec![failed.clone()]);
    assert_eq!(drain(&b), vec![failed]);
}

#[test]
fn test_restore_rolls_back_objects() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    let vehicle = publish_vehicle(&a);
    a.register_object_instance(vehicle, Some("car1")).unwrap();
    save(&[&a, &b], "s1");
    a.register_object_instance(vehicle, Some("car2")).unwrap();

    a.request_federation_restore("s1").unwrap();
    let (a_handle, b_handle) = (a.federate_handle().unwrap(), b.federate_handle().unwrap());
    assert_eq!(
        drain(&a),
        vec![
            Callback::RequestFederationRestoreSucceeded { label: "s1".into() },
            Callback::FederationRestoreBegun,
            Callback::InitiateFederateRestore {
                label: "s1".into(),
                federate_name: "a".into(),
                federate: a_handle,
            },
        ]
    );
    assert_eq!(
        drain(&b),
        vec![
            Callback::FederationRestoreBegun,
            Callback::InitiateFederateRestore {
                label: "s1".into(),
                federate_name: "b".into(),
                federate: b_handle,
            },
        ]
    );

    assert_eq!(
        a.register_object_instance(vehicle, None),
        Err(RtiError::RestoreInProgress)
    );
    let late = rti
        .connect(NullFederateAmbassador, CallbackModel::Evoked)
        .unwrap();
    assert_eq!(
        late.join_federation_execution(Some("late"), "test", FEDERATION),
        Err(RtiError::RestoreInProgress)
    );

    a.federate_restore_complete().unwrap();
    b.federate_restore_complete().unwrap();
    assert_eq!(drain(&a), vec![Callback::FederationRestored]);
    assert_eq!(drain(&b), vec![Callback::FederationRestored]);
    assert_eq!(a.save_restore_state().unwrap(), SaveRestoreState::RestoreComplete);

    a.get_object_instance_handle("car1").unwrap();
    assert_eq!(
        a.get_object_instance_handle("car2"),
        Err(RtiError::NameNotFound("car2".into()))
    );
    // Handles are never reused after a restore.
    let car3 = a.register_object_instance(vehicle, Some("car3")).unwrap();
    assert!(car3.value() > 2);
}

#[test]
fn test_restore_failures() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");

    a.request_federation_restore("missing").unwrap();
    assert_eq!(
        drain(&a),
        vec![Callback::RequestFederationRestoreFailed {
            label: "missing".into()
        }]
    );
    assert!(drain(&b).is_empty());
    assert_eq!(a.federate_restore_complete(), Err(RtiError::RestoreNotRequested));

    save(&[&a, &b], "s1");
    a.request_federation_restore("s1").unwrap();
    drain(&a);
    drain(&b);
    a.query_federation_restore_status().unwrap();
    assert!(matches!(
        drain(&a).as_slice(),
        [Callback::FederationRestoreStatusResponse { statuses }] if statuses.len() == 2
    ));
    a.federate_restore_not_complete().unwrap();
    b.federate_restore_complete().unwrap();
    let failed = Callback::FederationNotRestored {
        reason: RestoreFailureReason::FederateReportedFailureDuringRestore,
    };
    assert_eq!(drain(&a), vec![failed.clone()]);
    assert_eq!(drain(&b), vec![failed]);

    a.request_federation_restore("s1").unwrap();
    drain(&b);
    b.abort_federation_restore().unwrap();
    assert_eq!(
        drain(&b),
        vec![Callback::FederationNotRestored {
            reason: RestoreFailureReason::RestoreAborted
        }]
    );
    assert_eq!(b.abort_federation_restore(), Err(RtiError::RestoreNotInProgress));

    // The member set no longer matches the snapshot.
    let _c = join(&rti, "c");
    drain(&a);
    a.request_federation_restore("s1").unwrap();
    assert_eq!(
        drain(&a),
        vec![Callback::RequestFederationRestoreFailed { label: "s1".into() }]
    );
}
