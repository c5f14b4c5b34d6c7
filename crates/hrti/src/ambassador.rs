// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTI -> federate callback surface.
//!
//! A federate implements [`FederateAmbassador`] and hands it to
//! [`crate::Rti::connect`]. Every method has a no-op default, so an
//! implementation only overrides what it cares about.
//!
//! ```
//! use hrti::{FederateAmbassador, FederateInternalError, Float64Time};
//!
//! struct Clock {
//!     now: f64,
//! }
//!
//! impl FederateAmbassador<Float64Time> for Clock {
//!     fn time_advance_grant(&mut self, time: Float64Time) -> Result<(), FederateInternalError> {
//!         self.now = time.value();
//!         Ok(())
//!     }
//! }
//! ```
//!
//! # Threading
//!
//! With [`crate::CallbackModel::Evoked`] callbacks run on the thread calling
//! `evoke_callback`. With [`crate::CallbackModel::Immediate`] they run on the
//! session's delivery thread, hence the `Send` bound. The federation lock is
//! never held while a callback runs, so callbacks may call back into the RTI.

use crate::error::FederateInternalError;
use crate::handle::{
    AttributeHandle, AttributeHandleSet, FederateHandle, FederateHandleSet,
    InteractionClassHandle, MessageRetractionHandle, ObjectClassHandle, ObjectInstanceHandle,
};
use crate::time::LogicalTime;
use crate::types::{
    AttributeValues, OrderType, ParameterValues, RestoreFailureReason, RestoreStatus,
    SaveFailureReason, SaveStatus, SynchronizationPointFailureReason, TransportationType,
};

/// Result type of every callback.
pub type CallbackResult = Result<(), FederateInternalError>;

/// Callbacks the RTI delivers to a federate.
#[allow(unused_variables)]
pub trait FederateAmbassador<T: LogicalTime>: Send {
    // ========================================================================
    // Federation Management
    // ========================================================================

    fn synchronization_point_registration_succeeded(&mut self, label: &str) -> CallbackResult {
        Ok(())
    }

    fn synchronization_point_registration_failed(
        &mut self,
        label: &str,
        reason: SynchronizationPointFailureReason,
    ) -> CallbackResult {
        Ok(())
    }

    fn announce_synchronization_point(&mut self, label: &str, tag: &[u8]) -> CallbackResult {
        Ok(())
    }

    fn federation_synchronized(
        &mut self,
        label: &str,
        failed: &FederateHandleSet,
    ) -> CallbackResult {
        Ok(())
    }

    fn initiate_federate_save(&mut self, label: &str, time: Option<T>) -> CallbackResult {
        Ok(())
    }

    fn federation_saved(&mut self) -> CallbackResult {
        Ok(())
    }

    fn federation_not_saved(&mut self, reason: SaveFailureReason) -> CallbackResult {
        Ok(())
    }

    fn federation_save_status_response(
        &mut self,
        statuses: &[(FederateHandle, SaveStatus)],
    ) -> CallbackResult {
        Ok(())
    }

    fn request_federation_restore_succeeded(&mut self, label: &str) -> CallbackResult {
        Ok(())
    }

    fn request_federation_restore_failed(&mut self, label: &str) -> CallbackResult {
        Ok(())
    }

    fn federation_restore_begun(&mut self) -> CallbackResult {
        Ok(())
    }

    fn initiate_federate_restore(
        &mut self,
        label: &str,
        federate_name: &str,
        federate: FederateHandle,
    ) -> CallbackResult {
        Ok(())
    }

    fn federation_restored(&mut self) -> CallbackResult {
        Ok(())
    }

    fn federation_not_restored(&mut self, reason: RestoreFailureReason) -> CallbackResult {
        Ok(())
    }

    fn federation_restore_status_response(
        &mut self,
        statuses: &[(FederateHandle, RestoreStatus)],
    ) -> CallbackResult {
        Ok(())
    }

    // ========================================================================
    // Object Management
    // ========================================================================

    fn object_instance_name_reservation_succeeded(&mut self, name: &str) -> CallbackResult {
        Ok(())
    }

    fn object_instance_name_reservation_failed(&mut self, name: &str) -> CallbackResult {
        Ok(())
    }

    fn discover_object_instance(
        &mut self,
        object: ObjectInstanceHandle,
        class: ObjectClassHandle,
        name: &str,
        producer: FederateHandle,
    ) -> CallbackResult {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn reflect_attribute_values(
        &mut self,
        object: ObjectInstanceHandle,
        values: &AttributeValues,
        tag: &[u8],
        sent_order: OrderType,
        transportation: TransportationType,
        time: Option<T>,
        received_order: OrderType,
        retraction: Option<MessageRetractionHandle>,
        producer: FederateHandle,
    ) -> CallbackResult {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn receive_interaction(
        &mut self,
        class: InteractionClassHandle,
        parameters: &ParameterValues,
        tag: &[u8],
        sent_order: OrderType,
        transportation: TransportationType,
        time: Option<T>,
        received_order: OrderType,
        retraction: Option<MessageRetractionHandle>,
        producer: FederateHandle,
    ) -> CallbackResult {
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn remove_object_instance(
        &mut self,
        object: ObjectInstanceHandle,
        tag: &[u8],
        sent_order: OrderType,
        time: Option<T>,
        received_order: OrderType,
        retraction: Option<MessageRetractionHandle>,
        producer: FederateHandle,
    ) -> CallbackResult {
        Ok(())
    }

    fn provide_attribute_value_update(
        &mut self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> CallbackResult {
        Ok(())
    }

    // ========================================================================
    // Ownership Management
    // ========================================================================

    fn request_attribute_ownership_assumption(
        &mut self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> CallbackResult {
        Ok(())
    }

    fn request_divestiture_confirmation(
        &mut self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> CallbackResult {
        Ok(())
    }

    fn attribute_ownership_acquisition_notification(
        &mut self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> CallbackResult {
        Ok(())
    }

    fn attribute_ownership_unavailable(
        &mut self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> CallbackResult {
        Ok(())
    }

    fn request_attribute_ownership_release(
        &mut self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> CallbackResult {
        Ok(())
    }

    fn confirm_attribute_ownership_acquisition_cancellation(
        &mut self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> CallbackResult {
        Ok(())
    }

    fn inform_attribute_ownership(
        &mut self,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
        owner: FederateHandle,
    ) -> CallbackResult {
        Ok(())
    }

    fn attribute_is_not_owned(
        &mut self,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    ) -> CallbackResult {
        Ok(())
    }

    // ========================================================================
    // Time Management
    // ========================================================================

    fn time_regulation_enabled(&mut self, time: T) -> CallbackResult {
        Ok(())
    }

    fn time_constrained_enabled(&mut self, time: T) -> CallbackResult {
        Ok(())
    }

    fn time_advance_grant(&mut self, time: T) -> CallbackResult {
        Ok(())
    }

    /// A timestamp-ordered message delivered earlier was withdrawn by its sender.
    fn request_retraction(&mut self, retraction: MessageRetractionHandle) -> CallbackResult {
        Ok(())
    }
}

/// Ambassador that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFederateAmbassador;

impl<T: LogicalTime> FederateAmbassador<T> for NullFederateAmbassador {}
