// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types returned by RTI operations.
//!
//! Every variant is a precondition failure detected synchronously while the
//! federation lock is held; the federation state is left untouched when an
//! operation fails. The runtime never retries on the caller's behalf.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handle::{
    AttributeHandle, DimensionHandle, FederateHandle, InteractionClassHandle,
    MessageRetractionHandle, ObjectClassHandle, ObjectInstanceHandle, ParameterHandle,
    RegionHandle,
};

/// Result alias for RTI operations.
pub type Result<T> = std::result::Result<T, RtiError>;

/// Errors raised by the RTI, named after the IEEE 1516 exceptions.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum RtiError {
    // ========================================================================
    // Federation Management
    // ========================================================================
    #[error("federation execution already exists: {0}")]
    FederationExecutionAlreadyExists(String),

    #[error("federation execution does not exist: {0}")]
    FederationExecutionDoesNotExist(String),

    #[error("federates currently joined to {0}")]
    FederatesCurrentlyJoined(String),

    #[error("error reading object model: {0}")]
    ErrorReadingFdd(String),

    #[error("federate already joined a federation execution")]
    FederateAlreadyExecutionMember,

    #[error("federate is not joined to a federation execution")]
    FederateNotExecutionMember,

    #[error("federate name already in use: {0}")]
    FederateNameAlreadyInUse(String),

    #[error("federate {0} still owns attributes")]
    FederateOwnsAttributes(FederateHandle),

    #[error("ownership acquisition pending")]
    OwnershipAcquisitionPending,

    #[error("federate handle not known: {0:?}")]
    FederateHandleNotKnown(FederateHandle),

    #[error("synchronization point label not announced: {0}")]
    SynchronizationPointLabelNotAnnounced(String),

    // ========================================================================
    // Save / Restore
    // ========================================================================
    #[error("save in progress")]
    SaveInProgress,

    #[error("restore in progress")]
    RestoreInProgress,

    #[error("federation save not initiated")]
    SaveNotInitiated,

    #[error("federation save not in progress")]
    SaveNotInProgress,

    #[error("federate has not begun save")]
    FederateHasNotBegunSave,

    #[error("restore not requested")]
    RestoreNotRequested,

    #[error("restore not in progress")]
    RestoreNotInProgress,

    // ========================================================================
    // Declaration Management
    // ========================================================================
    #[error("object class not defined: {0:?}")]
    ObjectClassNotDefined(ObjectClassHandle),

    #[error("attribute not defined: {0:?}")]
    AttributeNotDefined(AttributeHandle),

    #[error("interaction class not defined: {0:?}")]
    InteractionClassNotDefined(InteractionClassHandle),

    #[error("interaction parameter not defined: {0:?}")]
    InteractionParameterNotDefined(ParameterHandle),

    #[error("object class not published: {0:?}")]
    ObjectClassNotPublished(ObjectClassHandle),

    #[error("interaction class not published: {0:?}")]
    InteractionClassNotPublished(InteractionClassHandle),

    #[error("attribute not published: {0:?}")]
    AttributeNotPublished(AttributeHandle),

    #[error("name not found: {0}")]
    NameNotFound(String),

    // ========================================================================
    // Object Management
    // ========================================================================
    #[error("object instance not known: {0:?}")]
    ObjectInstanceNotKnown(ObjectInstanceHandle),

    #[error("object instance name in use: {0}")]
    ObjectInstanceNameInUse(String),

    #[error("object instance name not reserved: {0}")]
    ObjectInstanceNameNotReserved(String),

    #[error("illegal name: {0}")]
    IllegalName(String),

    #[error("delete privilege not held for {0:?}")]
    DeletePrivilegeNotHeld(ObjectInstanceHandle),

    // ========================================================================
    // Ownership Management
    // ========================================================================
    #[error("attribute not owned: {0:?}")]
    AttributeNotOwned(AttributeHandle),

    #[error("attribute already owned: {0:?}")]
    AttributeAlreadyOwned(AttributeHandle),

    #[error("attribute already being divested: {0:?}")]
    AttributeAlreadyBeingDivested(AttributeHandle),

    #[error("attribute already being acquired: {0:?}")]
    AttributeAlreadyBeingAcquired(AttributeHandle),

    #[error("attribute divestiture was not requested: {0:?}")]
    AttributeDivestitureWasNotRequested(AttributeHandle),

    #[error("attribute acquisition was not requested: {0:?}")]
    AttributeAcquisitionWasNotRequested(AttributeHandle),

    #[error("no acquisition pending for {0:?}")]
    NoAcquisitionPending(AttributeHandle),

    // ========================================================================
    // Time Management
    // ========================================================================
    #[error("time regulation already enabled")]
    TimeRegulationAlreadyEnabled,

    #[error("time regulation is not enabled")]
    TimeRegulationIsNotEnabled,

    #[error("time constrained already enabled")]
    TimeConstrainedAlreadyEnabled,

    #[error("time constrained is not enabled")]
    TimeConstrainedIsNotEnabled,

    #[error("request for time constrained pending")]
    RequestForTimeConstrainedPending,

    #[error("federate is in time advancing state")]
    InTimeAdvancingState,

    #[error("logical time already passed: {0}")]
    LogicalTimeAlreadyPassed(String),

    #[error("invalid logical time: {0}")]
    InvalidLogicalTime(String),

    #[error("invalid lookahead: {0}")]
    InvalidLookahead(String),

    #[error("illegal time arithmetic: {0}")]
    IllegalTimeArithmetic(String),

    #[error("asynchronous delivery already enabled")]
    AsynchronousDeliveryAlreadyEnabled,

    #[error("asynchronous delivery already disabled")]
    AsynchronousDeliveryAlreadyDisabled,

    #[error("invalid message retraction handle: {0:?}")]
    InvalidMessageRetractionHandle(MessageRetractionHandle),

    #[error("message can no longer be retracted: {0:?}")]
    MessageCanNoLongerBeRetracted(MessageRetractionHandle),

    // ========================================================================
    // Data Distribution Management
    // ========================================================================
    #[error("invalid region: {0:?}")]
    InvalidRegion(RegionHandle),

    #[error("region {0:?} not created by this federate")]
    RegionNotCreatedByThisFederate(RegionHandle),

    #[error("region {0:?} in use for update or subscription")]
    RegionInUseForUpdateOrSubscription(RegionHandle),

    #[error("region {0:?} does not contain dimension {1:?}")]
    RegionDoesNotContainSpecifiedDimension(RegionHandle, DimensionHandle),

    #[error("invalid dimension handle: {0:?}")]
    InvalidDimensionHandle(DimensionHandle),

    #[error("invalid range bound: {0}")]
    InvalidRangeBound(String),

    #[error("region {0:?} not known for this attribute")]
    InvalidRegionContext(RegionHandle),

    // ========================================================================
    // Support Services
    // ========================================================================
    #[error("could not decode: {0}")]
    CouldNotDecode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("RTI internal error: {0}")]
    RtiInternalError(String),
}

/// Error a federate's callback returns to the RTI.
///
/// The RTI logs it and moves on to the next callback; the federation is not
/// affected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("federate internal error: {0}")]
pub struct FederateInternalError(pub String);

impl FederateInternalError {
    /// Build from anything printable.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
