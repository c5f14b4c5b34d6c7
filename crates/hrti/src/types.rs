// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enumerations and value containers shared by the ambassador surfaces.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RtiError;
use crate::handle::{AttributeHandle, AttributeHandleSet, ParameterHandle, RegionHandleSet};

/// Attribute values carried by an update or reflection.
pub type AttributeValues = BTreeMap<AttributeHandle, Vec<u8>>;

/// Parameter values carried by an interaction.
pub type ParameterValues = BTreeMap<ParameterHandle, Vec<u8>>;

/// Opaque user-supplied tag passed through the RTI untouched.
pub type UserTag = Vec<u8>;

/// Attribute sets paired with the regions they are associated with.
pub type AttributeSetRegionSetPairList = Vec<(AttributeHandleSet, RegionHandleSet)>;

/// Delivery ordering of a message.
///
/// | Kind | Wire name |
/// |------|-----------|
/// | `Receive` | `HLAreceive` |
/// | `Timestamp` | `HLAtimestamp` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderType {
    /// Delivered as soon as it arrives.
    #[default]
    Receive,
    /// Delivered in timestamp order, subject to time advancement.
    Timestamp,
}

impl OrderType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Receive => "HLAreceive",
            Self::Timestamp => "HLAtimestamp",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OrderType {
    type Err = RtiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HLAreceive" | "Receive" | "RO" => Ok(Self::Receive),
            "HLAtimestamp" | "TimeStamp" | "Timestamp" | "TSO" => Ok(Self::Timestamp),
            other => Err(RtiError::NameNotFound(other.to_string())),
        }
    }
}

/// Transportation requested for an attribute or interaction class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransportationType {
    #[default]
    Reliable,
    BestEffort,
}

impl TransportationType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reliable => "HLAreliable",
            Self::BestEffort => "HLAbestEffort",
        }
    }
}

impl fmt::Display for TransportationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransportationType {
    type Err = RtiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HLAreliable" | "Reliable" => Ok(Self::Reliable),
            "HLAbestEffort" | "BestEffort" => Ok(Self::BestEffort),
            other => Err(RtiError::NameNotFound(other.to_string())),
        }
    }
}

/// What the RTI does with a federate's objects and ownership at resign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResignAction {
    /// Release every owned attribute.
    UnconditionallyDivestAttributes,
    /// Delete every object the federate holds the delete privilege for.
    DeleteObjects,
    /// Withdraw every pending acquisition.
    CancelPendingOwnershipAcquisitions,
    /// Delete objects, then release whatever is still owned.
    DeleteObjectsThenDivest,
    /// Withdraw acquisitions, delete objects, release the rest.
    #[default]
    CancelThenDeleteThenDivest,
    /// Leave everything in place; fails if anything is still held.
    NoAction,
}

impl ResignAction {
    pub fn cancels_acquisitions(&self) -> bool {
        matches!(
            self,
            Self::CancelPendingOwnershipAcquisitions | Self::CancelThenDeleteThenDivest
        )
    }

    pub fn deletes_objects(&self) -> bool {
        matches!(
            self,
            Self::DeleteObjects | Self::DeleteObjectsThenDivest | Self::CancelThenDeleteThenDivest
        )
    }

    pub fn divests(&self) -> bool {
        matches!(
            self,
            Self::UnconditionallyDivestAttributes
                | Self::DeleteObjectsThenDivest
                | Self::CancelThenDeleteThenDivest
        )
    }
}

impl FromStr for ResignAction {
    type Err = RtiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "unconditionallydivestattributes" => Ok(Self::UnconditionallyDivestAttributes),
            "deleteobjects" => Ok(Self::DeleteObjects),
            "cancelpendingownershipacquisitions" => Ok(Self::CancelPendingOwnershipAcquisitions),
            "deleteobjectsthendivest" => Ok(Self::DeleteObjectsThenDivest),
            "cancelthendeletethendivest" => Ok(Self::CancelThenDeleteThenDivest),
            "noaction" => Ok(Self::NoAction),
            _ => Err(RtiError::NameNotFound(s.to_string())),
        }
    }
}

/// How queued callbacks reach the federate ambassador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CallbackModel {
    /// The federate drains its queue with `evoke_callback`.
    #[default]
    Evoked,
    /// A delivery thread pushes callbacks as they are queued.
    Immediate,
}

/// Per-federate progress through a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveStatus {
    NoSaveInProgress,
    FederateInstructedToSave,
    FederateSaving,
    FederateWaitingForFederationToSave,
}

/// Per-federate progress through a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestoreStatus {
    NoRestoreInProgress,
    FederateRestoreRequestPending,
    FederateWaitingForRestoreToBegin,
    FederatePreparedToRestore,
    FederateRestoring,
    FederateWaitingForFederationToRestore,
}

/// Reason carried by `federation_not_saved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveFailureReason {
    RtiUnableToSave,
    FederateReportedFailureDuringSave,
    FederateResignedDuringSave,
    RtiDetectedFailureDuringSave,
    SaveTimeCannotBeHonored,
    SaveAborted,
}

/// Reason carried by `federation_not_restored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestoreFailureReason {
    RtiUnableToRestore,
    FederateReportedFailureDuringRestore,
    FederateResignedDuringRestore,
    RtiDetectedFailureDuringRestore,
    RestoreAborted,
}

/// Reason carried by `synchronization_point_registration_failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynchronizationPointFailureReason {
    SynchronizationPointLabelNotUnique,
    SynchronizationSetMemberNotJoined,
}

/// Half-open range `[lower, upper)` on one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub lower: u64,
    pub upper: u64,
}

impl RangeBounds {
    pub const fn new(lower: u64, upper: u64) -> Self {
        Self { lower, upper }
    }

    /// Two half-open ranges overlap when each starts before the other ends.
    pub fn overlaps(&self, other: &RangeBounds) -> bool {
        self.lower < other.upper && other.lower < self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_names() {
        assert_eq!(OrderType::Timestamp.to_string(), "HLAtimestamp");
        assert_eq!("HLAreceive".parse::<OrderType>().unwrap(), OrderType::Receive);
        assert!("Sometimes".parse::<OrderType>().is_err());
        assert_eq!(
            "HLAbestEffort".parse::<TransportationType>().unwrap(),
            TransportationType::BestEffort
        );
    }

    #[test]
    fn test_resign_action_parse() {
        assert_eq!(
            "delete-objects-then-divest".parse::<ResignAction>().unwrap(),
            ResignAction::DeleteObjectsThenDivest
        );
        assert_eq!("NO_ACTION".parse::<ResignAction>().unwrap(), ResignAction::NoAction);
        assert!(ResignAction::CancelThenDeleteThenDivest.cancels_acquisitions());
        assert!(!ResignAction::NoAction.divests());
    }

    #[test]
    fn test_half_open_ranges() {
        let a = RangeBounds::new(0, 10);
        assert!(a.overlaps(&RangeBounds::new(9, 20)));
        assert!(!a.overlaps(&RangeBounds::new(10, 20)));
        assert!(RangeBounds::new(5, 6).overlaps(&a));
    }
}
