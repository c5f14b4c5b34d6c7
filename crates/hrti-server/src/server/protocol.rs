// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire protocol between remote federates and the RTI server.
//!
//! Every frame is a JSON document preceded by a 4-byte big-endian length.
//! Handles travel as plain integers, user tags and values as byte arrays.

use hrti::{
    AttributeHandle, AttributeHandleSet, AttributeSetRegionSetPairList, AttributeValues, Callback,
    DimensionHandle, DimensionHandleSet, FederateHandle, FederateHandleSet,
    FederationExecutionInfo, Float64Interval, Float64Time, InteractionClassHandle,
    MessageRetractionHandle, ObjectClassHandle, ObjectInstanceHandle, ObjectModel, OrderType,
    OwnershipState, ParameterHandle, ParameterValues, RangeBounds, RegionHandle, RegionHandleSet,
    ResignAction, RtiError, SaveRestoreState, TransportationType, UserTag,
};
use serde::{Deserialize, Serialize};

/// A request sent by a client, answered by a frame carrying the same `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    pub id: u64,
    pub request: Request,
}

/// One RTI service invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    // ========================================================================
    // Federation Management
    // ========================================================================
    CreateFederationExecution {
        name: String,
        model: ObjectModel,
    },
    DestroyFederationExecution {
        name: String,
    },
    ListFederationExecutions,
    JoinFederationExecution {
        #[serde(default)]
        federate_name: Option<String>,
        federate_type: String,
        federation: String,
    },
    ResignFederationExecution {
        #[serde(default)]
        action: ResignAction,
    },
    RegisterFederationSynchronizationPoint {
        label: String,
        #[serde(default)]
        tag: UserTag,
        #[serde(default)]
        synchronization_set: Option<FederateHandleSet>,
    },
    SynchronizationPointAchieved {
        label: String,
        #[serde(default = "default_true")]
        success: bool,
    },
    RequestFederationSave {
        label: String,
        #[serde(default)]
        time: Option<Float64Time>,
    },
    FederateSaveBegun,
    FederateSaveComplete,
    FederateSaveNotComplete,
    AbortFederationSave,
    QueryFederationSaveStatus,
    RequestFederationRestore {
        label: String,
    },
    FederateRestoreComplete,
    FederateRestoreNotComplete,
    AbortFederationRestore,
    QueryFederationRestoreStatus,
    QuerySaveRestoreState,

    // ========================================================================
    // Declaration Management
    // ========================================================================
    PublishObjectClassAttributes {
        class: ObjectClassHandle,
        attributes: AttributeHandleSet,
    },
    UnpublishObjectClass {
        class: ObjectClassHandle,
    },
    UnpublishObjectClassAttributes {
        class: ObjectClassHandle,
        attributes: AttributeHandleSet,
    },
    PublishInteractionClass {
        class: InteractionClassHandle,
    },
    UnpublishInteractionClass {
        class: InteractionClassHandle,
    },
    SubscribeObjectClassAttributes {
        class: ObjectClassHandle,
        attributes: AttributeHandleSet,
    },
    UnsubscribeObjectClass {
        class: ObjectClassHandle,
    },
    UnsubscribeObjectClassAttributes {
        class: ObjectClassHandle,
        attributes: AttributeHandleSet,
    },
    SubscribeInteractionClass {
        class: InteractionClassHandle,
    },
    UnsubscribeInteractionClass {
        class: InteractionClassHandle,
    },

    // ========================================================================
    // Object Management
    // ========================================================================
    ReserveObjectInstanceName {
        name: String,
    },
    ReleaseObjectInstanceName {
        name: String,
    },
    RegisterObjectInstance {
        class: ObjectClassHandle,
        #[serde(default)]
        name: Option<String>,
    },
    UpdateAttributeValues {
        object: ObjectInstanceHandle,
        values: AttributeValues,
        #[serde(default)]
        tag: UserTag,
        #[serde(default)]
        time: Option<Float64Time>,
    },
    SendInteraction {
        class: InteractionClassHandle,
        #[serde(default)]
        parameters: ParameterValues,
        #[serde(default)]
        tag: UserTag,
        #[serde(default)]
        time: Option<Float64Time>,
    },
    DeleteObjectInstance {
        object: ObjectInstanceHandle,
        #[serde(default)]
        tag: UserTag,
        #[serde(default)]
        time: Option<Float64Time>,
    },
    LocalDeleteObjectInstance {
        object: ObjectInstanceHandle,
    },
    RequestAttributeValueUpdate {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
        #[serde(default)]
        tag: UserTag,
    },
    RequestClassAttributeValueUpdate {
        class: ObjectClassHandle,
        attributes: AttributeHandleSet,
        #[serde(default)]
        tag: UserTag,
    },

    // ========================================================================
    // Ownership Management
    // ========================================================================
    UnconditionalAttributeOwnershipDivestiture {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
    },
    NegotiatedAttributeOwnershipDivestiture {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
        #[serde(default)]
        tag: UserTag,
    },
    ConfirmDivestiture {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
        #[serde(default)]
        tag: UserTag,
    },
    CancelNegotiatedAttributeOwnershipDivestiture {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
    },
    AttributeOwnershipAcquisition {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
        #[serde(default)]
        tag: UserTag,
    },
    AttributeOwnershipAcquisitionIfAvailable {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
    },
    AttributeOwnershipDivestitureIfWanted {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
    },
    CancelAttributeOwnershipAcquisition {
        object: ObjectInstanceHandle,
        attributes: AttributeHandleSet,
    },
    QueryAttributeOwnership {
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    },
    IsAttributeOwnedByFederate {
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    },
    GetOwnershipState {
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    },

    // ========================================================================
    // Time Management
    // ========================================================================
    EnableTimeRegulation {
        lookahead: Float64Interval,
    },
    DisableTimeRegulation,
    EnableTimeConstrained,
    DisableTimeConstrained,
    TimeAdvanceRequest {
        time: Float64Time,
    },
    TimeAdvanceRequestAvailable {
        time: Float64Time,
    },
    NextMessageRequest {
        time: Float64Time,
    },
    NextMessageRequestAvailable {
        time: Float64Time,
    },
    FlushQueueRequest {
        time: Float64Time,
    },
    EnableAsynchronousDelivery,
    DisableAsynchronousDelivery,
    QueryGalt,
    QueryLogicalTime,
    QueryLits,
    ModifyLookahead {
        lookahead: Float64Interval,
    },
    QueryLookahead,
    Retract {
        retraction: MessageRetractionHandle,
    },

    // ========================================================================
    // Data Distribution Management
    // ========================================================================
    CreateRegion {
        dimensions: DimensionHandleSet,
    },
    CommitRegionModifications {
        regions: RegionHandleSet,
    },
    DeleteRegion {
        region: RegionHandle,
    },
    SetRangeBounds {
        region: RegionHandle,
        dimension: DimensionHandle,
        bounds: RangeBounds,
    },
    GetRangeBounds {
        region: RegionHandle,
        dimension: DimensionHandle,
    },
    GetDimensionHandleSet {
        region: RegionHandle,
    },
    RegisterObjectInstanceWithRegions {
        class: ObjectClassHandle,
        pairs: AttributeSetRegionSetPairList,
        #[serde(default)]
        name: Option<String>,
    },
    AssociateRegionsForUpdates {
        object: ObjectInstanceHandle,
        pairs: AttributeSetRegionSetPairList,
    },
    UnassociateRegionsForUpdates {
        object: ObjectInstanceHandle,
        pairs: AttributeSetRegionSetPairList,
    },
    SubscribeObjectClassAttributesWithRegions {
        class: ObjectClassHandle,
        pairs: AttributeSetRegionSetPairList,
    },
    UnsubscribeObjectClassAttributesWithRegions {
        class: ObjectClassHandle,
        pairs: AttributeSetRegionSetPairList,
    },
    SubscribeInteractionClassWithRegions {
        class: InteractionClassHandle,
        regions: RegionHandleSet,
    },
    UnsubscribeInteractionClassWithRegions {
        class: InteractionClassHandle,
        regions: RegionHandleSet,
    },
    SendInteractionWithRegions {
        class: InteractionClassHandle,
        #[serde(default)]
        parameters: ParameterValues,
        regions: RegionHandleSet,
        #[serde(default)]
        tag: UserTag,
        #[serde(default)]
        time: Option<Float64Time>,
    },

    // ========================================================================
    // Support Services
    // ========================================================================
    GetObjectClassHandle {
        name: String,
    },
    GetObjectClassName {
        class: ObjectClassHandle,
    },
    GetAttributeHandle {
        class: ObjectClassHandle,
        name: String,
    },
    GetAttributeName {
        class: ObjectClassHandle,
        attribute: AttributeHandle,
    },
    GetInteractionClassHandle {
        name: String,
    },
    GetInteractionClassName {
        class: InteractionClassHandle,
    },
    GetParameterHandle {
        class: InteractionClassHandle,
        name: String,
    },
    GetParameterName {
        class: InteractionClassHandle,
        parameter: ParameterHandle,
    },
    GetFederateHandle {
        name: String,
    },
    GetFederateName {
        federate: FederateHandle,
    },
    GetObjectInstanceHandle {
        name: String,
    },
    GetObjectInstanceName {
        object: ObjectInstanceHandle,
    },
    GetKnownObjectClassHandle {
        object: ObjectInstanceHandle,
    },
    GetDimensionHandle {
        name: String,
    },
    GetDimensionName {
        dimension: DimensionHandle,
    },
    GetDimensionUpperBound {
        dimension: DimensionHandle,
    },
    GetAvailableDimensionsForClassAttribute {
        class: ObjectClassHandle,
        attribute: AttributeHandle,
    },
    GetAvailableDimensionsForInteractionClass {
        class: InteractionClassHandle,
    },
    GetOrderType {
        name: String,
    },
    GetTransportationType {
        name: String,
    },
    EnableCallbacks,
    DisableCallbacks,
}

fn default_true() -> bool {
    true
}

/// Successful result of a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reply {
    Done,
    Federations(Vec<FederationExecutionInfo>),
    Federate(FederateHandle),
    ObjectClass(ObjectClassHandle),
    Attribute(AttributeHandle),
    InteractionClass(InteractionClassHandle),
    Parameter(ParameterHandle),
    Object(ObjectInstanceHandle),
    Dimension(DimensionHandle),
    Region(RegionHandle),
    Attributes(AttributeHandleSet),
    Dimensions(DimensionHandleSet),
    Bounds(RangeBounds),
    Name(String),
    UpperBound(u64),
    Flag(bool),
    /// GALT or LITS; absent when unconstrained by others.
    Time(Option<Float64Time>),
    LogicalTime(Float64Time),
    Lookahead(Float64Interval),
    Order(OrderType),
    Transportation(TransportationType),
    Ownership(OwnershipState),
    SaveRestore(SaveRestoreState),
    /// Handle of a timestamp-ordered send; absent for receive order.
    Retraction(Option<MessageRetractionHandle>),
}

/// Frame sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// The request with this id succeeded.
    Response { id: u64, reply: Reply },
    /// The request with this id raised an RTI exception.
    Error { id: u64, error: RtiError },
    /// A callback queued for the connected federate.
    Callback { callback: Callback<Float64Time> },
    /// A frame the server could not act on.
    Rejected { message: String },
}

impl ServerFrame {
    /// Answer to request `id`.
    pub fn answer(id: u64, result: Result<Reply, RtiError>) -> Self {
        match result {
            Ok(reply) => Self::Response { id, reply },
            Err(error) => Self::Error { id, error },
        }
    }
}
