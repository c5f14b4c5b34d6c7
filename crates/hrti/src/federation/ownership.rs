// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Attribute ownership transfer.
//!
//! Each (object instance, attribute) pair carries one
//! [`AttributeOwnershipRecord`]: the current owner, whether the owner has
//! offered the attribute by negotiated divestiture, and the acquirers queued
//! in request order. The owner stays authoritative for updates until a
//! transfer completes, and a transfer hands the attribute to the head of the
//! queue in one step, so there is never more than one owner.
//!
//! ```text
//!                acquire (unowned)
//!   Unowned ─────────────────────────────> Owned
//!      ^                                   │  │
//!      │ divest, nobody queued             │  │ acquire (owned)
//!      └───────────────────────────────────┘  v
//!                                    AcquisitionPending
//!   Owned ── negotiated divest ──> DivestitureOffered
//!         <── cancel ─────────────
//!   DivestitureOffered ── confirm (acquirer queued) ──> Owned by acquirer
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::object::ObjectInstance;
use super::{FederationState, Outbox};
use crate::callback::Callback;
use crate::error::{Result, RtiError};
use crate::handle::{
    AttributeHandle, AttributeHandleSet, FederateHandle, ObjectClassHandle, ObjectInstanceHandle,
};
use crate::time::LogicalTime;

/// Observable ownership state of one attribute of one object instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnershipState {
    Unowned,
    Owned,
    /// The owner offered the attribute; it remains the owner meanwhile.
    DivestitureOffered,
    /// Acquirers are queued while the owner has not offered the attribute.
    AcquisitionPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AcquisitionKind {
    Acquisition,
    IfAvailable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AttributeOwnershipRecord {
    owner: Option<FederateHandle>,
    divesting: bool,
    candidates: Vec<(FederateHandle, AcquisitionKind)>,
}

/// Outcome of handing an attribute to the next queued acquirer.
#[derive(Debug, Default)]
pub(crate) struct Handover {
    new_owner: Option<FederateHandle>,
    unavailable: Vec<FederateHandle>,
    release_requested_from: Option<FederateHandle>,
}

impl AttributeOwnershipRecord {
    pub(crate) fn owned_by(owner: Option<FederateHandle>) -> Self {
        Self {
            owner,
            ..Default::default()
        }
    }

    pub(crate) fn owner(&self) -> Option<FederateHandle> {
        self.owner
    }

    /// Plain ownership for an instance brought back by a retraction.
    pub(crate) fn revived(&self, member: impl Fn(FederateHandle) -> bool) -> Self {
        Self::owned_by(self.owner.filter(|o| member(*o)))
    }

    pub(crate) fn is_divesting(&self) -> bool {
        self.divesting
    }

    pub(crate) fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub(crate) fn is_candidate(&self, federate: FederateHandle) -> bool {
        self.candidates.iter().any(|(c, _)| *c == federate)
    }

    fn is_candidate_of_kind(&self, federate: FederateHandle, kind: AcquisitionKind) -> bool {
        self.candidates.contains(&(federate, kind))
    }

    pub(crate) fn state(&self) -> OwnershipState {
        match self.owner {
            None => OwnershipState::Unowned,
            Some(_) if self.divesting => OwnershipState::DivestitureOffered,
            Some(_) if !self.candidates.is_empty() => OwnershipState::AcquisitionPending,
            Some(_) => OwnershipState::Owned,
        }
    }

    fn remove_candidate(&mut self, federate: FederateHandle) -> bool {
        let before = self.candidates.len();
        self.candidates.retain(|(c, _)| *c != federate);
        before != self.candidates.len()
    }

    fn drain_if_available(&mut self) -> Vec<FederateHandle> {
        let mut dropped = Vec::new();
        self.candidates.retain(|(c, kind)| {
            if *kind == AcquisitionKind::IfAvailable {
                dropped.push(*c);
                false
            } else {
                true
            }
        });
        dropped
    }

    /// Give the attribute to the head of the queue, or leave it unowned.
    fn hand_over(&mut self) -> Handover {
        self.divesting = false;
        if self.candidates.is_empty() {
            self.owner = None;
            return Handover::default();
        }
        let (next, _) = self.candidates.remove(0);
        self.owner = Some(next);
        let unavailable = self.drain_if_available();
        Handover {
            new_owner: Some(next),
            unavailable,
            release_requested_from: (!self.candidates.is_empty()).then_some(next),
        }
    }
}

/// Per-federate attribute sets collected during one operation, emitted as one
/// callback per federate and kind.
#[derive(Debug, Default)]
struct Notices {
    acquired: BTreeMap<FederateHandle, AttributeHandleSet>,
    unavailable: BTreeMap<FederateHandle, AttributeHandleSet>,
    release: BTreeMap<FederateHandle, AttributeHandleSet>,
    confirm: BTreeMap<FederateHandle, AttributeHandleSet>,
    assumption: BTreeMap<FederateHandle, AttributeHandleSet>,
    cancelled: BTreeMap<FederateHandle, AttributeHandleSet>,
}

fn note(map: &mut BTreeMap<FederateHandle, AttributeHandleSet>, f: FederateHandle, a: AttributeHandle) {
    map.entry(f).or_default().insert(a);
}

impl Notices {
    fn absorb(&mut self, attribute: AttributeHandle, handover: Handover) {
        if let Some(owner) = handover.new_owner {
            note(&mut self.acquired, owner, attribute);
        }
        for f in handover.unavailable {
            note(&mut self.unavailable, f, attribute);
        }
        if let Some(owner) = handover.release_requested_from {
            note(&mut self.release, owner, attribute);
        }
    }

    fn emit<T>(self, object: ObjectInstanceHandle, tag: &[u8], out: &mut Outbox<T>) {
        for (f, attributes) in self.acquired {
            out.push(
                f,
                Callback::AttributeOwnershipAcquisitionNotification {
                    object,
                    attributes,
                    tag: tag.to_vec(),
                },
            );
        }
        for (f, attributes) in self.unavailable {
            out.push(f, Callback::AttributeOwnershipUnavailable { object, attributes });
        }
        for (f, attributes) in self.confirm {
            out.push(f, Callback::RequestDivestitureConfirmation { object, attributes });
        }
        for (f, attributes) in self.release {
            out.push(
                f,
                Callback::RequestAttributeOwnershipRelease {
                    object,
                    attributes,
                    tag: tag.to_vec(),
                },
            );
        }
        for (f, attributes) in self.assumption {
            out.push(
                f,
                Callback::RequestAttributeOwnershipAssumption {
                    object,
                    attributes,
                    tag: tag.to_vec(),
                },
            );
        }
        for (f, attributes) in self.cancelled {
            out.push(
                f,
                Callback::ConfirmAttributeOwnershipAcquisitionCancellation { object, attributes },
            );
        }
    }
}

impl<T: LogicalTime> FederationState<T> {
    fn check_owned_by(
        &self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<&ObjectInstance> {
        let instance = self.objects.known(federate, object)?;
        self.catalog.check_attributes(instance.class, attributes)?;
        for attribute in attributes {
            if instance.owner(*attribute) != Some(federate) {
                return Err(RtiError::AttributeNotOwned(*attribute));
            }
        }
        Ok(instance)
    }

    fn check_acquirable(
        &self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<ObjectClassHandle> {
        let instance = self.objects.known(federate, object)?;
        self.catalog.check_attributes(instance.class, attributes)?;
        let declarations = self.registry.declarations(federate)?;
        if !declarations.publishes_class(instance.class) {
            return Err(RtiError::ObjectClassNotPublished(instance.class));
        }
        for attribute in attributes {
            if !declarations.publishes_attribute(instance.class, *attribute) {
                return Err(RtiError::AttributeNotPublished(*attribute));
            }
            let record = instance.record(*attribute)?;
            if record.owner() == Some(federate) {
                return Err(RtiError::AttributeAlreadyOwned(*attribute));
            }
            if record.is_candidate(federate) {
                return Err(RtiError::AttributeAlreadyBeingAcquired(*attribute));
            }
        }
        Ok(instance.class)
    }

    pub(crate) fn unconditional_attribute_ownership_divestiture(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.check_owned_by(federate, object, attributes)?;

        let instance = self.objects.get_mut(object)?;
        let mut notices = Notices::default();
        for attribute in attributes {
            if let Some(record) = instance.attributes.get_mut(attribute) {
                notices.absorb(*attribute, record.hand_over());
            }
        }
        notices.emit(object, &[], out);
        log::debug!(
            "[ownership] {:?} divested {:?} of {:?} unconditionally",
            federate,
            attributes,
            object
        );
        Ok(())
    }

    pub(crate) fn negotiated_attribute_ownership_divestiture(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        let instance = self.check_owned_by(federate, object, attributes)?;
        for attribute in attributes {
            if instance.record(*attribute)?.is_divesting() {
                return Err(RtiError::AttributeAlreadyBeingDivested(*attribute));
            }
        }
        let class = instance.class;

        let mut notices = Notices::default();
        let publishers: Vec<_> = self
            .registry
            .records()
            .filter(|r| r.handle != federate)
            .map(|r| (r.handle, r.declarations.published_attributes.get(&class).cloned()))
            .collect();

        let instance = self.objects.get_mut(object)?;
        for attribute in attributes {
            let Some(record) = instance.attributes.get_mut(attribute) else {
                continue;
            };
            record.divesting = true;
            if record.has_candidates() {
                note(&mut notices.confirm, federate, *attribute);
            } else {
                for (other, published) in &publishers {
                    if published.as_ref().is_some_and(|p| p.contains(attribute)) {
                        note(&mut notices.assumption, *other, *attribute);
                    }
                }
            }
        }
        notices.emit(object, tag, out);
        log::debug!(
            "[ownership] {:?} offered {:?} of {:?}",
            federate,
            attributes,
            object
        );
        Ok(())
    }

    pub(crate) fn confirm_divestiture(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        let instance = self.check_owned_by(federate, object, attributes)?;
        for attribute in attributes {
            let record = instance.record(*attribute)?;
            if !record.is_divesting() {
                return Err(RtiError::AttributeDivestitureWasNotRequested(*attribute));
            }
            if !record.has_candidates() {
                return Err(RtiError::NoAcquisitionPending(*attribute));
            }
        }

        let instance = self.objects.get_mut(object)?;
        let mut notices = Notices::default();
        for attribute in attributes {
            if let Some(record) = instance.attributes.get_mut(attribute) {
                notices.absorb(*attribute, record.hand_over());
            }
        }
        notices.emit(object, tag, out);
        log::debug!(
            "[ownership] {:?} confirmed divestiture of {:?} of {:?}",
            federate,
            attributes,
            object
        );
        Ok(())
    }

    pub(crate) fn cancel_negotiated_attribute_ownership_divestiture(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        let instance = self.check_owned_by(federate, object, attributes)?;
        for attribute in attributes {
            if !instance.record(*attribute)?.is_divesting() {
                return Err(RtiError::AttributeDivestitureWasNotRequested(*attribute));
            }
        }

        let instance = self.objects.get_mut(object)?;
        let mut notices = Notices::default();
        for attribute in attributes {
            if let Some(record) = instance.attributes.get_mut(attribute) {
                record.divesting = false;
                for f in record.drain_if_available() {
                    note(&mut notices.unavailable, f, *attribute);
                }
            }
        }
        notices.emit(object, &[], out);
        Ok(())
    }

    pub(crate) fn attribute_ownership_acquisition(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.check_acquirable(federate, object, attributes)?;

        let instance = self.objects.get_mut(object)?;
        let mut notices = Notices::default();
        for attribute in attributes {
            let Some(record) = instance.attributes.get_mut(attribute) else {
                continue;
            };
            match record.owner {
                None => {
                    record.owner = Some(federate);
                    note(&mut notices.acquired, federate, *attribute);
                }
                Some(owner) => {
                    record
                        .candidates
                        .push((federate, AcquisitionKind::Acquisition));
                    if record.divesting {
                        note(&mut notices.confirm, owner, *attribute);
                    } else {
                        note(&mut notices.release, owner, *attribute);
                    }
                }
            }
        }
        notices.emit(object, tag, out);
        log::debug!(
            "[ownership] {:?} requested {:?} of {:?}",
            federate,
            attributes,
            object
        );
        Ok(())
    }

    pub(crate) fn attribute_ownership_acquisition_if_available(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.check_acquirable(federate, object, attributes)?;

        let instance = self.objects.get_mut(object)?;
        let mut notices = Notices::default();
        for attribute in attributes {
            let Some(record) = instance.attributes.get_mut(attribute) else {
                continue;
            };
            match record.owner {
                None => {
                    record.owner = Some(federate);
                    note(&mut notices.acquired, federate, *attribute);
                }
                Some(owner) if record.divesting => {
                    record
                        .candidates
                        .push((federate, AcquisitionKind::IfAvailable));
                    note(&mut notices.confirm, owner, *attribute);
                }
                Some(_) => note(&mut notices.unavailable, federate, *attribute),
            }
        }
        notices.emit(object, &[], out);
        Ok(())
    }

    /// Hand over the requested attributes that have a queued acquirer.
    /// Returns the attributes actually divested.
    pub(crate) fn attribute_ownership_divestiture_if_wanted(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        out: &mut Outbox<T>,
    ) -> Result<AttributeHandleSet> {
        self.check_active(federate)?;
        self.check_owned_by(federate, object, attributes)?;

        let instance = self.objects.get_mut(object)?;
        let mut notices = Notices::default();
        let mut divested = AttributeHandleSet::new();
        for attribute in attributes {
            if let Some(record) = instance.attributes.get_mut(attribute) {
                if record.has_candidates() {
                    notices.absorb(*attribute, record.hand_over());
                    divested.insert(*attribute);
                }
            }
        }
        notices.emit(object, &[], out);
        Ok(divested)
    }

    pub(crate) fn cancel_attribute_ownership_acquisition(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        let instance = self.objects.known(federate, object)?;
        self.catalog.check_attributes(instance.class, attributes)?;
        for attribute in attributes {
            let record = instance.record(*attribute)?;
            if record.owner() == Some(federate) {
                return Err(RtiError::AttributeAlreadyOwned(*attribute));
            }
            if !record.is_candidate_of_kind(federate, AcquisitionKind::Acquisition) {
                return Err(RtiError::AttributeAcquisitionWasNotRequested(*attribute));
            }
        }

        let instance = self.objects.get_mut(object)?;
        let mut notices = Notices::default();
        for attribute in attributes {
            if let Some(record) = instance.attributes.get_mut(attribute) {
                record.remove_candidate(federate);
                note(&mut notices.cancelled, federate, *attribute);
            }
        }
        notices.emit(object, &[], out);
        Ok(())
    }

    pub(crate) fn query_attribute_ownership(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        let instance = self.objects.known(federate, object)?;
        let record = instance.record(attribute)?;
        let callback = match record.owner() {
            Some(owner) => Callback::InformAttributeOwnership {
                object,
                attribute,
                owner,
            },
            None => Callback::AttributeIsNotOwned { object, attribute },
        };
        out.push(federate, callback);
        Ok(())
    }

    pub(crate) fn is_attribute_owned_by_federate(
        &self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    ) -> Result<bool> {
        self.check_active(federate)?;
        let instance = self.objects.known(federate, object)?;
        Ok(instance.record(attribute)?.owner() == Some(federate))
    }

    pub(crate) fn ownership_state(
        &self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    ) -> Result<OwnershipState> {
        self.check_member(federate)?;
        let instance = self.objects.known(federate, object)?;
        Ok(instance.record(attribute)?.state())
    }

    // ========================================================================
    // Bulk helpers used by resign and unpublish
    // ========================================================================

    pub(crate) fn has_pending_acquisitions(&self, federate: FederateHandle) -> bool {
        self.objects
            .instances()
            .any(|i| i.attributes.values().any(|r| r.is_candidate(federate)))
    }

    /// Release every attribute owned by `federate` that matches `filter`.
    pub(crate) fn release_attributes_where(
        &mut self,
        federate: FederateHandle,
        filter: impl Fn(&ObjectInstance, AttributeHandle) -> bool,
        out: &mut Outbox<T>,
    ) {
        let targets: Vec<(ObjectInstanceHandle, Vec<AttributeHandle>)> = self
            .objects
            .instances()
            .map(|i| {
                let owned = i
                    .attributes
                    .iter()
                    .filter(|(a, r)| r.owner() == Some(federate) && filter(i, **a))
                    .map(|(a, _)| *a)
                    .collect::<Vec<_>>();
                (i.handle, owned)
            })
            .filter(|(_, owned)| !owned.is_empty())
            .collect();

        for (object, owned) in targets {
            let Ok(instance) = self.objects.get_mut(object) else {
                continue;
            };
            let mut notices = Notices::default();
            for attribute in owned {
                if let Some(record) = instance.attributes.get_mut(&attribute) {
                    notices.absorb(attribute, record.hand_over());
                }
            }
            notices.emit(object, &[], out);
        }
    }

    /// Withdraw `federate` from every acquisition queue matching `filter`.
    pub(crate) fn cancel_acquisitions_where(
        &mut self,
        federate: FederateHandle,
        filter: impl Fn(&ObjectInstance, AttributeHandle) -> bool,
        notify: bool,
        out: &mut Outbox<T>,
    ) {
        let targets: Vec<(ObjectInstanceHandle, Vec<AttributeHandle>)> = self
            .objects
            .instances()
            .map(|i| {
                let pending = i
                    .attributes
                    .iter()
                    .filter(|(a, r)| r.is_candidate(federate) && filter(i, **a))
                    .map(|(a, _)| *a)
                    .collect::<Vec<_>>();
                (i.handle, pending)
            })
            .filter(|(_, pending)| !pending.is_empty())
            .collect();

        for (object, pending) in targets {
            let Ok(instance) = self.objects.get_mut(object) else {
                continue;
            };
            let mut cancelled = AttributeHandleSet::new();
            for attribute in pending {
                if let Some(record) = instance.attributes.get_mut(&attribute) {
                    if record.remove_candidate(federate) {
                        cancelled.insert(attribute);
                    }
                }
            }
            if notify && !cancelled.is_empty() {
                out.push(
                    federate,
                    Callback::ConfirmAttributeOwnershipAcquisitionCancellation {
                        object,
                        attributes: cancelled,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fed(v: u64) -> FederateHandle {
        FederateHandle::new(v)
    }

    #[test]
    fn test_state_derivation() {
        let mut record = AttributeOwnershipRecord::owned_by(Some(fed(1)));
        assert_eq!(record.state(), OwnershipState::Owned);
        record.candidates.push((fed(2), AcquisitionKind::Acquisition));
        assert_eq!(record.state(), OwnershipState::AcquisitionPending);
        record.divesting = true;
        assert_eq!(record.state(), OwnershipState::DivestitureOffered);
        assert_eq!(
            AttributeOwnershipRecord::owned_by(None).state(),
            OwnershipState::Unowned
        );
    }

    #[test]
    fn test_hand_over_follows_request_order() {
        let mut record = AttributeOwnershipRecord::owned_by(Some(fed(1)));
        record.candidates.push((fed(3), AcquisitionKind::Acquisition));
        record.candidates.push((fed(2), AcquisitionKind::IfAvailable));
        record.candidates.push((fed(4), AcquisitionKind::Acquisition));

        let handover = record.hand_over();
        assert_eq!(handover.new_owner, Some(fed(3)));
        assert_eq!(handover.unavailable, vec![fed(2)]);
        assert_eq!(handover.release_requested_from, Some(fed(3)));
        assert_eq!(record.owner(), Some(fed(3)));
        assert!(record.is_candidate(fed(4)));

        let handover = record.hand_over();
        assert_eq!(handover.new_owner, Some(fed(4)));
        assert_eq!(handover.release_requested_from, None);

        let handover = record.hand_over();
        assert_eq!(handover.new_owner, None);
        assert_eq!(record.state(), OwnershipState::Unowned);
    }
}
