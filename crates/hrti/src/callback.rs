// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Queued callbacks.
//!
//! Federation operations never call a federate ambassador directly. They
//! produce [`Callback`] values which are appended to the target federate's
//! [`CallbackQueue`] once the operation has committed. The federate then
//! drains the queue itself (`evoke_callback`) or a delivery thread does it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use crate::ambassador::{CallbackResult, FederateAmbassador};
use crate::handle::{
    AttributeHandle, AttributeHandleSet, FederateHandle, FederateHandleSet,
    InteractionClassHandle, MessageRetractionHandle, ObjectClassHandle, ObjectInstanceHandle,
};
use crate::time::LogicalTime;
use crate::types::{
    AttributeValues, OrderType, ParameterValues, RestoreFailureReason, RestoreStatus,
    SaveFailureReason, SaveStatus, SynchronizationPointFailureReason, TransportationType, UserTag,
};

/// One pending RTI -> federate callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "callback")]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub enum Callback<T> {
    SynchronizationPointRegistrationSucceeded {
        label: String,
    },
    SynchronizationPointRegistrationFailed {
        label: String,
        reason: SynchronizationPointFailureReason,
    },
    AnnounceSynchronizationPoint {
        label: String,
        tag: UserTag,
    },
    FederationSynchronized {
        label: String,
        failed: FederateHandleSet,
    },
    InitiateFederateSave {
        label: String,
        time: Option<T>,
    },
    FederationSaved,
    FederationNotSaved {
        reason: SaveFailureReason,
    },
    FederationSaveStatusResponse {
        statuses: Vec<(FederateHandle, SaveStatus)>,
    },
    RequestFederationRestoreSucceeded {
        label: String,
    },
    RequestFederationRestoreFailed {
        label: String,
    },
    FederationRestoreBegun,
    InitiateFederateRestore {
        label: String,
        federate_name: String,
        federate: FederateHandle,
    },
    FederationRestored,
    FederationNotRestored {
        reason: RestoreFailureReason,
    },
    FederationRestoreStatusResponse {
        statuses: Vec<(FederateHandle, RestoreStatus)>,
    },
    ObjectInstanceNameReservationSucceeded {
        name: String,
    },
    ObjectInstanceNameReservationFailed {
        name: String,
    },
    DiscoverObjectInstance {
        object: ObjectInstanceHandle,
        class: ObjectClassHandle,
        name: String,
        producer: FederateHandle,
    },
    ReflectAttributeValues {
        object: ObjectInstanceHandle,
        values: AttributeValues,
        tag: UserTag,
        sent_order: OrderType,
        transportation: TransportationType,
        time: Option<T>,
        received_order: OrderType,
        #[serde(default)]
        retraction: Option<MessageRetractionHandle>,
        producer: FederateHandle,
    },
    ReceiveInteraction {
        class: InteractionClassHandle,
        parameters: ParameterValues,
        tag: UserTag,
        sent_order: OrderType,
        transportation: TransportationType,
        time: Option<T>,
        received_order: OrderType,
        #[serde(default)]
        retraction: Option<MessageRetractionHandle>,
        producer: FederateHandle,
    },
    RemoveObjectInstance {
        object: ObjectInstanceHandle,
        tag: UserTag,
        sent_order: OrderType,
        time: Option<T>,
        received_order: OrderType,
        #[serde(default)]
        retraction: Option<MessageRetractionHandle>,
        producer: FederateHandle,
    },
    ProvideAttributeValueUpdate {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
        tag: UserTag,
    },
    RequestAttributeOwnershipAssumption {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
        tag: UserTag,
    },
    RequestDivestitureConfirmation {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
    },
    AttributeOwnershipAcquisitionNotification {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
        tag: UserTag,
    },
    AttributeOwnershipUnavailable {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
    },
    RequestAttributeOwnershipRelease {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
        tag: UserTag,
    },
    ConfirmAttributeOwnershipAcquisitionCancellation {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
    },
    InformAttributeOwnership {
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
        owner: FederateHandle,
    },
    AttributeIsNotOwned {
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    },
    TimeRegulationEnabled {
        time: T,
    },
    TimeConstrainedEnabled {
        time: T,
    },
    TimeAdvanceGrant {
        time: T,
    },
    RequestRetraction {
        retraction: MessageRetractionHandle,
    },
}

impl<T> Callback<T> {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SynchronizationPointRegistrationSucceeded { .. } => {
                "synchronization_point_registration_succeeded"
            }
            Self::SynchronizationPointRegistrationFailed { .. } => {
                "synchronization_point_registration_failed"
            }
            Self::AnnounceSynchronizationPoint { .. } => "announce_synchronization_point",
            Self::FederationSynchronized { .. } => "federation_synchronized",
            Self::InitiateFederateSave { .. } => "initiate_federate_save",
            Self::FederationSaved => "federation_saved",
            Self::FederationNotSaved { .. } => "federation_not_saved",
            Self::FederationSaveStatusResponse { .. } => "federation_save_status_response",
            Self::RequestFederationRestoreSucceeded { .. } => {
                "request_federation_restore_succeeded"
            }
            Self::RequestFederationRestoreFailed { .. } => "request_federation_restore_failed",
            Self::FederationRestoreBegun => "federation_restore_begun",
            Self::InitiateFederateRestore { .. } => "initiate_federate_restore",
            Self::FederationRestored => "federation_restored",
            Self::FederationNotRestored { .. } => "federation_not_restored",
            Self::FederationRestoreStatusResponse { .. } => "federation_restore_status_response",
            Self::ObjectInstanceNameReservationSucceeded { .. } => {
                "object_instance_name_reservation_succeeded"
            }
            Self::ObjectInstanceNameReservationFailed { .. } => {
                "object_instance_name_reservation_failed"
            }
            Self::DiscoverObjectInstance { .. } => "discover_object_instance",
            Self::ReflectAttributeValues { .. } => "reflect_attribute_values",
            Self::ReceiveInteraction { .. } => "receive_interaction",
            Self::RemoveObjectInstance { .. } => "remove_object_instance",
            Self::ProvideAttributeValueUpdate { .. } => "provide_attribute_value_update",
            Self::RequestAttributeOwnershipAssumption { .. } => {
                "request_attribute_ownership_assumption"
            }
            Self::RequestDivestitureConfirmation { .. } => "request_divestiture_confirmation",
            Self::AttributeOwnershipAcquisitionNotification { .. } => {
                "attribute_ownership_acquisition_notification"
            }
            Self::AttributeOwnershipUnavailable { .. } => "attribute_ownership_unavailable",
            Self::RequestAttributeOwnershipRelease { .. } => "request_attribute_ownership_release",
            Self::ConfirmAttributeOwnershipAcquisitionCancellation { .. } => {
                "confirm_attribute_ownership_acquisition_cancellation"
            }
            Self::InformAttributeOwnership { .. } => "inform_attribute_ownership",
            Self::AttributeIsNotOwned { .. } => "attribute_is_not_owned",
            Self::TimeRegulationEnabled { .. } => "time_regulation_enabled",
            Self::TimeConstrainedEnabled { .. } => "time_constrained_enabled",
            Self::TimeAdvanceGrant { .. } => "time_advance_grant",
            Self::RequestRetraction { .. } => "request_retraction",
        }
    }

    /// Rewrite the received order of a message callback; others are returned as is.
    pub(crate) fn with_received_order(mut self, order: OrderType) -> Self {
        match &mut self {
            Self::ReflectAttributeValues { received_order, .. }
            | Self::ReceiveInteraction { received_order, .. }
            | Self::RemoveObjectInstance { received_order, .. } => *received_order = order,
            _ => {}
        }
        self
    }

    /// Retraction handle carried by a timestamp-ordered message callback.
    pub(crate) fn retraction(&self) -> Option<MessageRetractionHandle> {
        match self {
            Self::ReflectAttributeValues { retraction, .. }
            | Self::ReceiveInteraction { retraction, .. }
            | Self::RemoveObjectInstance { retraction, .. } => *retraction,
            _ => None,
        }
    }
}

impl<T: LogicalTime> Callback<T> {
    /// Invoke the matching ambassador method.
    pub fn dispatch(self, ambassador: &mut dyn FederateAmbassador<T>) -> CallbackResult {
        match self {
            Self::SynchronizationPointRegistrationSucceeded { label } => {
                ambassador.synchronization_point_registration_succeeded(&label)
            }
            Self::SynchronizationPointRegistrationFailed { label, reason } => {
                ambassador.synchronization_point_registration_failed(&label, reason)
            }
            Self::AnnounceSynchronizationPoint { label, tag } => {
                ambassador.announce_synchronization_point(&label, &tag)
            }
            Self::FederationSynchronized { label, failed } => {
                ambassador.federation_synchronized(&label, &failed)
            }
            Self::InitiateFederateSave { label, time } => {
                ambassador.initiate_federate_save(&label, time)
            }
            Self::FederationSaved => ambassador.federation_saved(),
            Self::FederationNotSaved { reason } => ambassador.federation_not_saved(reason),
            Self::FederationSaveStatusResponse { statuses } => {
                ambassador.federation_save_status_response(&statuses)
            }
            Self::RequestFederationRestoreSucceeded { label } => {
                ambassador.request_federation_restore_succeeded(&label)
            }
            Self::RequestFederationRestoreFailed { label } => {
                ambassador.request_federation_restore_failed(&label)
            }
            Self::FederationRestoreBegun => ambassador.federation_restore_begun(),
            Self::InitiateFederateRestore {
                label,
                federate_name,
                federate,
            } => ambassador.initiate_federate_restore(&label, &federate_name, federate),
            Self::FederationRestored => ambassador.federation_restored(),
            Self::FederationNotRestored { reason } => ambassador.federation_not_restored(reason),
            Self::FederationRestoreStatusResponse { statuses } => {
                ambassador.federation_restore_status_response(&statuses)
            }
            Self::ObjectInstanceNameReservationSucceeded { name } => {
                ambassador.object_instance_name_reservation_succeeded(&name)
            }
            Self::ObjectInstanceNameReservationFailed { name } => {
                ambassador.object_instance_name_reservation_failed(&name)
            }
            Self::DiscoverObjectInstance {
                object,
                class,
                name,
                producer,
            } => ambassador.discover_object_instance(object, class, &name, producer),
            Self::ReflectAttributeValues {
                object,
                values,
                tag,
                sent_order,
                transportation,
                time,
                received_order,
                retraction,
                producer,
            } => ambassador.reflect_attribute_values(
                object,
                &values,
                &tag,
                sent_order,
                transportation,
                time,
                received_order,
                retraction,
                producer,
            ),
            Self::ReceiveInteraction {
                class,
                parameters,
                tag,
                sent_order,
                transportation,
                time,
                received_order,
                retraction,
                producer,
            } => ambassador.receive_interaction(
                class,
                &parameters,
                &tag,
                sent_order,
                transportation,
                time,
                received_order,
                retraction,
                producer,
            ),
            Self::RemoveObjectInstance {
                object,
                tag,
                sent_order,
                time,
                received_order,
                retraction,
                producer,
            } => ambassador.remove_object_instance(
                object,
                &tag,
                sent_order,
                time,
                received_order,
                retraction,
                producer,
            ),
            Self::ProvideAttributeValueUpdate {
                object,
                attributes,
                tag,
            } => ambassador.provide_attribute_value_update(object, &attributes, &tag),
            Self::RequestAttributeOwnershipAssumption {
                object,
                attributes,
                tag,
            } => ambassador.request_attribute_ownership_assumption(object, &attributes, &tag),
            Self::RequestDivestitureConfirmation { object, attributes } => {
                ambassador.request_divestiture_confirmation(object, &attributes)
            }
            Self::AttributeOwnershipAcquisitionNotification {
                object,
                attributes,
                tag,
            } => ambassador.attribute_ownership_acquisition_notification(object, &attributes, &tag),
            Self::AttributeOwnershipUnavailable { object, attributes } => {
                ambassador.attribute_ownership_unavailable(object, &attributes)
            }
            Self::RequestAttributeOwnershipRelease {
                object,
                attributes,
                tag,
            } => ambassador.request_attribute_ownership_release(object, &attributes, &tag),
            Self::ConfirmAttributeOwnershipAcquisitionCancellation { object, attributes } => {
                ambassador.confirm_attribute_ownership_acquisition_cancellation(object, &attributes)
            }
            Self::InformAttributeOwnership {
                object,
                attribute,
                owner,
            } => ambassador.inform_attribute_ownership(object, attribute, owner),
            Self::AttributeIsNotOwned { object, attribute } => {
                ambassador.attribute_is_not_owned(object, attribute)
            }
            Self::TimeRegulationEnabled { time } => ambassador.time_regulation_enabled(time),
            Self::TimeConstrainedEnabled { time } => ambassador.time_constrained_enabled(time),
            Self::TimeAdvanceGrant { time } => ambassador.time_advance_grant(time),
            Self::RequestRetraction { retraction } => ambassador.request_retraction(retraction),
        }
    }
}

/// Hook invoked after every push, e.g. to wake an async task.
pub type QueueWaker = Arc<dyn Fn() + Send + Sync>;

struct QueueInner<T> {
    items: VecDeque<Callback<T>>,
    enabled: bool,
    closed: bool,
    waker: Option<QueueWaker>,
}

/// Per-federate FIFO of pending callbacks.
///
/// Pushes never block on the consumer. Pops honour the enable flag set by
/// `enable_callbacks` / `disable_callbacks` and wait at most the supplied
/// timeout.
pub struct CallbackQueue<T> {
    inner: Mutex<QueueInner<T>>,
    ready: Condvar,
}

impl<T> Default for CallbackQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CallbackQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::new(),
                enabled: true,
                closed: false,
                waker: None,
            }),
            ready: Condvar::new(),
        }
    }

    /// Append a callback. Ignored once the queue is closed.
    pub fn push(&self, callback: Callback<T>) {
        let waker = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return;
            }
            inner.items.push_back(callback);
            inner.waker.clone()
        };
        self.ready.notify_one();
        if let Some(wake) = waker {
            wake();
        }
    }

    /// Take the next callback, waiting up to `timeout` for one to arrive
    /// while the queue is enabled.
    pub fn pop_wait(&self, timeout: Duration) -> Option<Callback<T>> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        loop {
            if inner.enabled {
                if let Some(callback) = inner.items.pop_front() {
                    return Some(callback);
                }
            }
            if inner.closed {
                return None;
            }
            if self.ready.wait_until(&mut inner, deadline).timed_out() {
                if inner.enabled {
                    return inner.items.pop_front();
                }
                return None;
            }
        }
    }

    /// Take up to `max` callbacks without waiting. Respects the enable flag.
    pub fn drain(&self, max: usize) -> Vec<Callback<T>> {
        let mut inner = self.inner.lock();
        if !inner.enabled {
            return Vec::new();
        }
        let n = max.min(inner.items.len());
        inner.items.drain(..n).collect()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.lock().enabled = enabled;
        self.ready.notify_all();
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    pub fn set_waker(&self, waker: Option<QueueWaker>) {
        self.inner.lock().waker = waker;
    }

    /// Wake every waiter and refuse further pushes.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
