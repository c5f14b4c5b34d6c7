// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::RtiAmbassador;
use crate::error::Result;
use crate::handle::{AttributeHandle, AttributeHandleSet, ObjectInstanceHandle};
use crate::time::LogicalTime;

/// Ownership management services.
pub trait OwnershipManagement {
    /// Give the attributes up now. Queued acquirers take them over;
    /// otherwise they become unowned.
    fn unconditional_attribute_ownership_divestiture(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()>;

    /// Offer the attributes; the owner keeps them until it confirms a
    /// divestiture to a queued acquirer.
    fn negotiated_attribute_ownership_divestiture(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()>;

    fn confirm_divestiture(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()>;

    fn cancel_negotiated_attribute_ownership_divestiture(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()>;

    fn attribute_ownership_acquisition(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()>;

    fn attribute_ownership_acquisition_if_available(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()>;

    /// Hand over those attributes that have a queued acquirer; returns them.
    fn attribute_ownership_divestiture_if_wanted(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<AttributeHandleSet>;

    fn cancel_attribute_ownership_acquisition(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()>;

    /// Answered by `inform_attribute_ownership` or `attribute_is_not_owned`.
    fn query_attribute_ownership(
        &self,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    ) -> Result<()>;

    fn is_attribute_owned_by_federate(
        &self,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    ) -> Result<bool>;
}

impl<T: LogicalTime> OwnershipManagement for RtiAmbassador<T> {
    fn unconditional_attribute_ownership_divestiture(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, out| {
            s.unconditional_attribute_ownership_divestiture(me, object, attributes, out)
        })
    }

    fn negotiated_attribute_ownership_divestiture(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()> {
        self.transact(|s, me, out| {
            s.negotiated_attribute_ownership_divestiture(me, object, attributes, tag, out)
        })
    }

    fn confirm_divestiture(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()> {
        self.transact(|s, me, out| s.confirm_divestiture(me, object, attributes, tag, out))
    }

    fn cancel_negotiated_attribute_ownership_divestiture(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, out| {
            s.cancel_negotiated_attribute_ownership_divestiture(me, object, attributes, out)
        })
    }

    fn attribute_ownership_acquisition(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()> {
        self.transact(|s, me, out| s.attribute_ownership_acquisition(me, object, attributes, tag, out))
    }

    fn attribute_ownership_acquisition_if_available(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, out| {
            s.attribute_ownership_acquisition_if_available(me, object, attributes, out)
        })
    }

    fn attribute_ownership_divestiture_if_wanted(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<AttributeHandleSet> {
        self.transact(|s, me, out| {
            s.attribute_ownership_divestiture_if_wanted(me, object, attributes, out)
        })
    }

    fn cancel_attribute_ownership_acquisition(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, out| {
            s.cancel_attribute_ownership_acquisition(me, object, attributes, out)
        })
    }

    fn query_attribute_ownership(
        &self,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    ) -> Result<()> {
        self.transact(|s, me, out| s.query_attribute_ownership(me, object, attribute, out))
    }

    fn is_attribute_owned_by_federate(
        &self,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    ) -> Result<bool> {
        self.read(|s, me| s.is_attribute_owned_by_federate(me, object, attribute))
    }
}
