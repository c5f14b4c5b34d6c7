// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One remote federate's session: requests in, replies out.

use hrti::{
    Callback, CallbackModel, DataDistributionManagement, DeclarationManagement, FederationManagement,
    Float64Time, NullFederateAmbassador, ObjectManagement, OwnershipManagement, QueueWaker,
    ResignAction, Rti, RtiAmbassador, RtiError, SupportServices, TimeManagement,
};
use tracing::{debug, info, warn};

use super::protocol::{Reply, Request};

/// Federate session owned by a connection.
///
/// Callbacks are never dispatched locally; the connection drains them and
/// forwards them to the client.
pub(crate) struct Session {
    ambassador: RtiAmbassador<Float64Time>,
    disconnect_action: ResignAction,
}

impl Session {
    pub(crate) fn open(
        rti: &Rti<Float64Time>,
        disconnect_action: ResignAction,
        waker: QueueWaker,
    ) -> Result<Self, RtiError> {
        let ambassador = rti.connect(NullFederateAmbassador, CallbackModel::Evoked)?;
        ambassador.set_callback_waker(Some(waker));
        Ok(Self {
            ambassador,
            disconnect_action,
        })
    }

    /// Take up to `max` queued callbacks.
    pub(crate) fn drain(&self, max: usize) -> Vec<Callback<Float64Time>> {
        self.ambassador.drain_callbacks(max)
    }

    pub(crate) fn pending(&self) -> usize {
        self.ambassador.pending_callbacks()
    }

    /// Resign a still joined federate, falling back to the most thorough
    /// action when the configured one is refused.
    pub(crate) fn close(self) {
        self.ambassador.set_callback_waker(None);
        let Ok(federate) = self.ambassador.federate_handle() else {
            return;
        };
        match self
            .ambassador
            .resign_federation_execution(self.disconnect_action)
        {
            Ok(()) => info!("Federate {} resigned on disconnect", federate),
            Err(e) => {
                warn!(
                    "Resign of federate {} with {:?} failed: {}",
                    federate, self.disconnect_action, e
                );
                match self
                    .ambassador
                    .resign_federation_execution(ResignAction::CancelThenDeleteThenDivest)
                {
                    Ok(()) => info!("Federate {} resigned on disconnect", federate),
                    Err(e) => warn!("Federate {} left joined: {}", federate, e),
                }
            }
        }
    }

    /// Run one request against the federate's ambassador.
    pub(crate) fn execute(&self, request: Request) -> Result<Reply, RtiError> {
        let amb = &self.ambassador;
        debug!("Request: {:?}", request);
        let reply = match request {
            // Federation management
            Request::CreateFederationExecution { name, model } => {
                amb.create_federation_execution(&name, &model)?;
                Reply::Done
            }
            Request::DestroyFederationExecution { name } => {
                amb.destroy_federation_execution(&name)?;
                Reply::Done
            }
            Request::ListFederationExecutions => {
                Reply::Federations(amb.list_federation_executions())
            }
            Request::JoinFederationExecution {
                federate_name,
                federate_type,
                federation,
            } => Reply::Federate(amb.join_federation_execution(
                federate_name.as_deref(),
                &federate_type,
                &federation,
            )?),
            Request::ResignFederationExecution { action } => {
                amb.resign_federation_execution(action)?;
                Reply::Done
            }
            Request::RegisterFederationSynchronizationPoint {
                label,
                tag,
                synchronization_set,
            } => {
                amb.register_federation_synchronization_point(
                    &label,
                    &tag,
                    synchronization_set.as_ref(),
                )?;
                Reply::Done
            }
            Request::SynchronizationPointAchieved { label, success } => {
                amb.synchronization_point_achieved(&label, success)?;
                Reply::Done
            }
            Request::RequestFederationSave { label, time } => {
                amb.request_federation_save(&label, time)?;
                Reply::Done
            }
            Request::FederateSaveBegun => done(amb.federate_save_begun())?,
            Request::FederateSaveComplete => done(amb.federate_save_complete())?,
            Request::FederateSaveNotComplete => done(amb.federate_save_not_complete())?,
            Request::AbortFederationSave => done(amb.abort_federation_save())?,
            Request::QueryFederationSaveStatus => done(amb.query_federation_save_status())?,
            Request::RequestFederationRestore { label } => {
                done(amb.request_federation_restore(&label))?
            }
            Request::FederateRestoreComplete => done(amb.federate_restore_complete())?,
            Request::FederateRestoreNotComplete => done(amb.federate_restore_not_complete())?,
            Request::AbortFederationRestore => done(amb.abort_federation_restore())?,
            Request::QueryFederationRestoreStatus => {
                done(amb.query_federation_restore_status())?
            }
            Request::QuerySaveRestoreState => Reply::SaveRestore(amb.save_restore_state()?),

            // Declaration management
            Request::PublishObjectClassAttributes { class, attributes } => {
                done(amb.publish_object_class_attributes(class, &attributes))?
            }
            Request::UnpublishObjectClass { class } => done(amb.unpublish_object_class(class))?,
            Request::UnpublishObjectClassAttributes { class, attributes } => {
                done(amb.unpublish_object_class_attributes(class, &attributes))?
            }
            Request::PublishInteractionClass { class } => {
                done(amb.publish_interaction_class(class))?
            }
            Request::UnpublishInteractionClass { class } => {
                done(amb.unpublish_interaction_class(class))?
            }
            Request::SubscribeObjectClassAttributes { class, attributes } => {
                done(amb.subscribe_object_class_attributes(class, &attributes))?
            }
            Request::UnsubscribeObjectClass { class } => {
                done(amb.unsubscribe_object_class(class))?
            }
            Request::UnsubscribeObjectClassAttributes { class, attributes } => {
                done(amb.unsubscribe_object_class_attributes(class, &attributes))?
            }
            Request::SubscribeInteractionClass { class } => {
                done(amb.subscribe_interaction_class(class))?
            }
            Request::UnsubscribeInteractionClass { class } => {
                done(amb.unsubscribe_interaction_class(class))?
            }

            // Object management
            Request::ReserveObjectInstanceName { name } => {
                done(amb.reserve_object_instance_name(&name))?
            }
            Request::ReleaseObjectInstanceName { name } => {
                done(amb.release_object_instance_name(&name))?
            }
            Request::RegisterObjectInstance { class, name } => {
                Reply::Object(amb.register_object_instance(class, name.as_deref())?)
            }
            Request::UpdateAttributeValues {
                object,
                values,
                tag,
                time,
            } => Reply::Retraction(amb.update_attribute_values(object, values, &tag, time)?),
            Request::SendInteraction {
                class,
                parameters,
                tag,
                time,
            } => Reply::Retraction(amb.send_interaction(class, parameters, &tag, time)?),
            Request::DeleteObjectInstance { object, tag, time } => {
                Reply::Retraction(amb.delete_object_instance(object, &tag, time)?)
            }
            Request::LocalDeleteObjectInstance { object } => {
                done(amb.local_delete_object_instance(object))?
            }
            Request::RequestAttributeValueUpdate {
                object,
                attributes,
                tag,
            } => done(amb.request_attribute_value_update(object, &attributes, &tag))?,
            Request::RequestClassAttributeValueUpdate {
                class,
                attributes,
                tag,
            } => done(amb.request_class_attribute_value_update(class, &attributes, &tag))?,

            // Ownership management
            Request::UnconditionalAttributeOwnershipDivestiture { object, attributes } => {
                done(amb.unconditional_attribute_ownership_divestiture(object, &attributes))?
            }
            Request::NegotiatedAttributeOwnershipDivestiture {
                object,
                attributes,
                tag,
            } => done(amb.negotiated_attribute_ownership_divestiture(object, &attributes, &tag))?,
            Request::ConfirmDivestiture {
                object,
                attributes,
                tag,
            } => done(amb.confirm_divestiture(object, &attributes, &tag))?,
            Request::CancelNegotiatedAttributeOwnershipDivestiture { object, attributes } => {
                done(amb.cancel_negotiated_attribute_ownership_divestiture(object, &attributes))?
            }
            Request::AttributeOwnershipAcquisition {
                object,
                attributes,
                tag,
            } => done(amb.attribute_ownership_acquisition(object, &attributes, &tag))?,
            Request::AttributeOwnershipAcquisitionIfAvailable { object, attributes } => {
                done(amb.attribute_ownership_acquisition_if_available(object, &attributes))?
            }
            Request::AttributeOwnershipDivestitureIfWanted { object, attributes } => {
                Reply::Attributes(amb.attribute_ownership_divestiture_if_wanted(object, &attributes)?)
            }
            Request::CancelAttributeOwnershipAcquisition { object, attributes } => {
                done(amb.cancel_attribute_ownership_acquisition(object, &attributes))?
            }
            Request::QueryAttributeOwnership { object, attribute } => {
                done(amb.query_attribute_ownership(object, attribute))?
            }
            Request::IsAttributeOwnedByFederate { object, attribute } => {
                Reply::Flag(amb.is_attribute_owned_by_federate(object, attribute)?)
            }
            Request::GetOwnershipState { object, attribute } => {
                Reply::Ownership(amb.ownership_state(object, attribute)?)
            }

            // Time management
            Request::EnableTimeRegulation { lookahead } => {
                done(amb.enable_time_regulation(lookahead))?
            }
            Request::DisableTimeRegulation => done(amb.disable_time_regulation())?,
            Request::EnableTimeConstrained => done(amb.enable_time_constrained())?,
            Request::DisableTimeConstrained => done(amb.disable_time_constrained())?,
            Request::TimeAdvanceRequest { time } => done(amb.time_advance_request(time))?,
            Request::TimeAdvanceRequestAvailable { time } => {
                done(amb.time_advance_request_available(time))?
            }
            Request::NextMessageRequest { time } => done(amb.next_message_request(time))?,
            Request::NextMessageRequestAvailable { time } => {
                done(amb.next_message_request_available(time))?
            }
            Request::FlushQueueRequest { time } => done(amb.flush_queue_request(time))?,
            Request::EnableAsynchronousDelivery => done(amb.enable_asynchronous_delivery())?,
            Request::DisableAsynchronousDelivery => done(amb.disable_asynchronous_delivery())?,
            Request::QueryGalt => Reply::Time(amb.query_galt()?),
            Request::QueryLogicalTime => Reply::LogicalTime(amb.query_logical_time()?),
            Request::QueryLits => Reply::Time(amb.query_lits()?),
            Request::ModifyLookahead { lookahead } => done(amb.modify_lookahead(lookahead))?,
            Request::QueryLookahead => Reply::Lookahead(amb.query_lookahead()?),
            Request::Retract { retraction } => done(amb.retract(retraction))?,

            // Data distribution management
            Request::CreateRegion { dimensions } => Reply::Region(amb.create_region(&dimensions)?),
            Request::CommitRegionModifications { regions } => {
                done(amb.commit_region_modifications(&regions))?
            }
            Request::DeleteRegion { region } => done(amb.delete_region(region))?,
            Request::SetRangeBounds {
                region,
                dimension,
                bounds,
            } => done(amb.set_range_bounds(region, dimension, bounds))?,
            Request::GetRangeBounds { region, dimension } => {
                Reply::Bounds(amb.get_range_bounds(region, dimension)?)
            }
            Request::GetDimensionHandleSet { region } => {
                Reply::Dimensions(amb.get_dimension_handle_set(region)?)
            }
            Request::RegisterObjectInstanceWithRegions { class, pairs, name } => Reply::Object(
                amb.register_object_instance_with_regions(class, &pairs, name.as_deref())?,
            ),
            Request::AssociateRegionsForUpdates { object, pairs } => {
                done(amb.associate_regions_for_updates(object, &pairs))?
            }
            Request::UnassociateRegionsForUpdates { object, pairs } => {
                done(amb.unassociate_regions_for_updates(object, &pairs))?
            }
            Request::SubscribeObjectClassAttributesWithRegions { class, pairs } => {
                done(amb.subscribe_object_class_attributes_with_regions(class, &pairs))?
            }
            Request::UnsubscribeObjectClassAttributesWithRegions { class, pairs } => {
                done(amb.unsubscribe_object_class_attributes_with_regions(class, &pairs))?
            }
            Request::SubscribeInteractionClassWithRegions { class, regions } => {
                done(amb.subscribe_interaction_class_with_regions(class, &regions))?
            }
            Request::UnsubscribeInteractionClassWithRegions { class, regions } => {
                done(amb.unsubscribe_interaction_class_with_regions(class, &regions))?
            }
            Request::SendInteractionWithRegions {
                class,
                parameters,
                regions,
                tag,
                time,
            } => Reply::Retraction(
                amb.send_interaction_with_regions(class, parameters, &regions, &tag, time)?,
            ),

            // Support services
            Request::GetObjectClassHandle { name } => {
                Reply::ObjectClass(amb.get_object_class_handle(&name)?)
            }
            Request::GetObjectClassName { class } => Reply::Name(amb.get_object_class_name(class)?),
            Request::GetAttributeHandle { class, name } => {
                Reply::Attribute(amb.get_attribute_handle(class, &name)?)
            }
            Request::GetAttributeName { class, attribute } => {
                Reply::Name(amb.get_attribute_name(class, attribute)?)
            }
            Request::GetInteractionClassHandle { name } => {
                Reply::InteractionClass(amb.get_interaction_class_handle(&name)?)
            }
            Request::GetInteractionClassName { class } => {
                Reply::Name(amb.get_interaction_class_name(class)?)
            }
            Request::GetParameterHandle { class, name } => {
                Reply::Parameter(amb.get_parameter_handle(class, &name)?)
            }
            Request::GetParameterName { class, parameter } => {
                Reply::Name(amb.get_parameter_name(class, parameter)?)
            }
            Request::GetFederateHandle { name } => Reply::Federate(amb.get_federate_handle(&name)?),
            Request::GetFederateName { federate } => Reply::Name(amb.get_federate_name(federate)?),
            Request::GetObjectInstanceHandle { name } => {
                Reply::Object(amb.get_object_instance_handle(&name)?)
            }
            Request::GetObjectInstanceName { object } => {
                Reply::Name(amb.get_object_instance_name(object)?)
            }
            Request::GetKnownObjectClassHandle { object } => {
                Reply::ObjectClass(amb.get_known_object_class_handle(object)?)
            }
            Request::GetDimensionHandle { name } => {
                Reply::Dimension(amb.get_dimension_handle(&name)?)
            }
            Request::GetDimensionName { dimension } => {
                Reply::Name(amb.get_dimension_name(dimension)?)
            }
            Request::GetDimensionUpperBound { dimension } => {
                Reply::UpperBound(amb.get_dimension_upper_bound(dimension)?)
            }
            Request::GetAvailableDimensionsForClassAttribute { class, attribute } => {
                Reply::Dimensions(amb.get_available_dimensions_for_class_attribute(class, attribute)?)
            }
            Request::GetAvailableDimensionsForInteractionClass { class } => {
                Reply::Dimensions(amb.get_available_dimensions_for_interaction_class(class)?)
            }
            Request::GetOrderType { name } => Reply::Order(amb.get_order_type(&name)?),
            Request::GetTransportationType { name } => {
                Reply::Transportation(amb.get_transportation_type(&name)?)
            }
            Request::EnableCallbacks => {
                amb.enable_callbacks();
                Reply::Done
            }
            Request::DisableCallbacks => {
                amb.disable_callbacks();
                Reply::Done
            }
        };
        Ok(reply)
    }
}

fn done(result: Result<(), RtiError>) -> Result<Reply, RtiError> {
    result.map(|()| Reply::Done)
}
