// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HRTI - HLA Run-Time Infrastructure
//!
//! An in-process implementation of the IEEE 1516 (HLA Evolved) RTI services:
//! federation management, declaration and object management, ownership
//! transfer, conservative time management, data distribution management and
//! federation save/restore.
//!
//! ## Quick Start
//!
//! ```rust
//! use hrti::{
//!     AttributeDef, CallbackModel, DeclarationManagement, FederationManagement, Float64Time,
//!     NullFederateAmbassador, ObjectClassDef, ObjectManagement, ObjectModel, Rti, RtiConfig,
//!     SupportServices,
//! };
//!
//! fn main() -> hrti::Result<()> {
//!     let rti: Rti<Float64Time> = Rti::new(RtiConfig::default())?;
//!     let model = ObjectModel::new("Traffic")
//!         .with_object_class(ObjectClassDef::new("Car").with_attribute(AttributeDef::new("Speed")));
//!
//!     let federate = rti.connect(NullFederateAmbassador, CallbackModel::Evoked)?;
//!     federate.create_federation_execution("city", &model)?;
//!     federate.join_federation_execution(Some("driver"), "sim", "city")?;
//!
//!     let car = federate.get_object_class_handle("Car")?;
//!     let speed = federate.get_attribute_handle(car, "Speed")?;
//!     federate.publish_object_class_attributes(car, &[speed].into_iter().collect())?;
//!     let instance = federate.register_object_instance(car, None)?;
//!     federate.update_attribute_values(
//!         instance,
//!         [(speed, 42u32.to_be_bytes().to_vec())].into_iter().collect(),
//!         b"",
//!         None,
//!     )?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |   RtiAmbassador (one per federate)      FederateAmbassador (user)   |
//! |   service traits, evoke/immediate        <- Callback queue          |
//! +---------------------------------------------------------------------+
//! |   Rti: named federation executions (DashMap)                        |
//! +---------------------------------------------------------------------+
//! |   Federation: one lock around FederationState                       |
//! |   registry | objects | ownership | time | ddm | sync | save         |
//! +---------------------------------------------------------------------+
//! ```
//!
//! Every service call runs as one transaction on the federation state.
//! Callbacks produced by a call are queued only if the call succeeds, so a
//! failed call has no visible effect.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Rti`] | Hosts federation executions, hands out sessions |
//! | [`RtiAmbassador`] | A federate's session; implements the service traits |
//! | [`FederateAmbassador`] | Callbacks the RTI makes into the federate |
//! | [`ObjectModel`] | Object model declaration, resolved into handles at creation |
//! | [`LogicalTime`] | Pluggable time axis ([`Float64Time`], [`Integer64Time`]) |

/// Federate callback interface.
pub mod ambassador;
/// Queued callbacks and their delivery queue.
pub mod callback;
/// Runtime configuration.
pub mod config;
/// Error types.
pub mod error;
/// Object model declaration and resolved catalog.
pub mod fom;
/// Typed handles and handle sets.
pub mod handle;
/// The federation execution registry.
pub mod rti;
/// Federate-facing service traits.
pub mod rtiamb;
/// Logical time representations.
pub mod time;
/// Shared enumerations and value containers.
pub mod types;

mod federation;

pub use ambassador::{CallbackResult, FederateAmbassador, NullFederateAmbassador};
pub use callback::{Callback, CallbackQueue, QueueWaker};
pub use config::RtiConfig;
pub use error::{FederateInternalError, Result, RtiError};
pub use federation::{AdvanceKind, OwnershipState, SaveRestoreState, TimeAdvanceState};
pub use fom::{
    AttributeDef, Catalog, InteractionClassDef, ObjectClassDef, ObjectModel, INTERACTION_ROOT,
    OBJECT_ROOT, PRIVILEGE_TO_DELETE,
};
pub use handle::{
    AttributeHandle, AttributeHandleSet, DimensionHandle, DimensionHandleSet, FederateHandle,
    FederateHandleSet, Handle, HandleKind, InteractionClassHandle, MessageRetractionHandle,
    ObjectClassHandle, ObjectInstanceHandle, ParameterHandle, RegionHandle, RegionHandleSet,
};
pub use rti::{FederationExecutionInfo, Rti};
pub use rtiamb::{
    DataDistributionManagement, DeclarationManagement, FederationManagement, ObjectManagement,
    OwnershipManagement, RtiAmbassador, SupportServices, TimeManagement,
};
pub use time::{
    Float64Interval, Float64Time, Integer64Interval, Integer64Time, LogicalTime,
    LogicalTimeInterval,
};
pub use types::{
    AttributeSetRegionSetPairList, AttributeValues, CallbackModel, OrderType, ParameterValues,
    RangeBounds, ResignAction, RestoreFailureReason, RestoreStatus, SaveFailureReason, SaveStatus,
    SynchronizationPointFailureReason, TransportationType, UserTag,
};

/// HRTI version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
