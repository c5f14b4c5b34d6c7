// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object instances, name reservation, updates and interactions.

use std::collections::{BTreeMap, HashMap};

use super::ownership::AttributeOwnershipRecord;
use super::registry::Declarations;
use super::{FederationState, Outbox};
use crate::callback::Callback;
use crate::error::{Result, RtiError};
use crate::handle::{
    AttributeHandle, AttributeHandleSet, FederateHandle, HandleAllocator, InteractionClassHandle,
    MessageRetractionHandle, ObjectClassHandle, ObjectInstanceHandle, ObjectInstanceKind,
    RegionHandleSet,
};
use crate::time::LogicalTime;
use crate::types::{AttributeSetRegionSetPairList, AttributeValues, OrderType, ParameterValues};

#[derive(Debug, Clone)]
pub(crate) struct ObjectInstance {
    pub(crate) handle: ObjectInstanceHandle,
    pub(crate) name: String,
    pub(crate) class: ObjectClassHandle,
    pub(crate) registrar: FederateHandle,
    pub(crate) attributes: BTreeMap<AttributeHandle, AttributeOwnershipRecord>,
    /// Regions an attribute is updated with; absent means the default region.
    pub(crate) update_regions: BTreeMap<AttributeHandle, RegionHandleSet>,
    /// Federates that know the instance, with the class they know it as.
    pub(crate) known_by: BTreeMap<FederateHandle, ObjectClassHandle>,
}

impl ObjectInstance {
    pub(crate) fn record(&self, attribute: AttributeHandle) -> Result<&AttributeOwnershipRecord> {
        self.attributes
            .get(&attribute)
            .ok_or(RtiError::AttributeNotDefined(attribute))
    }

    pub(crate) fn owner(&self, attribute: AttributeHandle) -> Option<FederateHandle> {
        self.attributes.get(&attribute).and_then(|r| r.owner())
    }

    pub(crate) fn owns_any(&self, federate: FederateHandle) -> bool {
        self.attributes.values().any(|r| r.owner() == Some(federate))
    }
}

/// Every registered instance of a federation execution, plus name
/// reservations.
#[derive(Debug, Clone, Default)]
pub(crate) struct ObjectStore {
    instances: BTreeMap<ObjectInstanceHandle, ObjectInstance>,
    names: HashMap<String, ObjectInstanceHandle>,
    reservations: HashMap<String, FederateHandle>,
    /// Instances removed by a timestamp-ordered delete that may still be retracted.
    deleted: BTreeMap<MessageRetractionHandle, ObjectInstance>,
    allocator: HandleAllocator<ObjectInstanceKind>,
}

impl ObjectStore {
    pub(crate) fn get(&self, object: ObjectInstanceHandle) -> Result<&ObjectInstance> {
        self.instances
            .get(&object)
            .ok_or(RtiError::ObjectInstanceNotKnown(object))
    }

    pub(crate) fn get_mut(&mut self, object: ObjectInstanceHandle) -> Result<&mut ObjectInstance> {
        self.instances
            .get_mut(&object)
            .ok_or(RtiError::ObjectInstanceNotKnown(object))
    }

    /// The instance, provided `federate` knows it.
    pub(crate) fn known(
        &self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
    ) -> Result<&ObjectInstance> {
        self.get(object)
            .ok()
            .filter(|i| i.known_by.contains_key(&federate))
            .ok_or(RtiError::ObjectInstanceNotKnown(object))
    }

    pub(crate) fn instances(&self) -> impl Iterator<Item = &ObjectInstance> {
        self.instances.values()
    }

    pub(crate) fn instances_mut(&mut self) -> impl Iterator<Item = &mut ObjectInstance> {
        self.instances.values_mut()
    }

    pub(crate) fn handle_by_name(&self, name: &str) -> Option<ObjectInstanceHandle> {
        self.names.get(name).copied()
    }

    pub(crate) fn reservation(&self, name: &str) -> Option<FederateHandle> {
        self.reservations.get(name).copied()
    }

    fn insert(&mut self, instance: ObjectInstance) {
        self.reservations.remove(&instance.name);
        self.names.insert(instance.name.clone(), instance.handle);
        self.instances.insert(instance.handle, instance);
    }

    pub(crate) fn remove(&mut self, object: ObjectInstanceHandle) -> Option<ObjectInstance> {
        let instance = self.instances.remove(&object)?;
        self.names.remove(&instance.name);
        Some(instance)
    }

    /// Roll back to `saved`, keeping the allocator so handles stay unique.
    pub(crate) fn restore_from(&mut self, saved: &ObjectStore) {
        self.instances = saved.instances.clone();
        self.names = saved.names.clone();
        self.reservations = saved.reservations.clone();
        self.deleted = saved.deleted.clone();
    }

    fn bury(&mut self, retraction: MessageRetractionHandle, instance: ObjectInstance) {
        self.deleted.insert(retraction, instance);
    }

    fn tombstone(&self, retraction: MessageRetractionHandle) -> Option<&ObjectInstance> {
        self.deleted.get(&retraction)
    }

    /// Drop tombstones whose delete can no longer be retracted.
    pub(crate) fn prune_tombstones(&mut self, live: impl Fn(MessageRetractionHandle) -> bool) {
        self.deleted.retain(|h, _| live(*h));
    }

    /// Drop every trace of a resigned federate except ownership.
    pub(crate) fn forget_federate(&mut self, federate: FederateHandle) {
        for instance in self.instances.values_mut() {
            instance.known_by.remove(&federate);
        }
        self.reservations.retain(|_, owner| *owner != federate);
    }
}

/// Empty names and names in the reserved `HLA` namespace.
pub(crate) fn illegal_name(name: &str) -> bool {
    name.is_empty() || name.starts_with("HLA")
}

/// Most specific class in `class`'s lineage that `declarations` subscribes to.
fn discovery_class(
    catalog: &crate::fom::Catalog,
    declarations: &Declarations,
    class: ObjectClassHandle,
) -> Option<ObjectClassHandle> {
    catalog
        .object_class_lineage(class)
        .into_iter()
        .find(|c| declarations.subscribes_class(*c))
}

impl<T: LogicalTime> FederationState<T> {
    // ========================================================================
    // Names
    // ========================================================================

    pub(crate) fn reserve_object_instance_name(
        &mut self,
        federate: FederateHandle,
        name: &str,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        if illegal_name(name) {
            return Err(RtiError::IllegalName(name.to_string()));
        }
        let taken = self.objects.names.contains_key(name)
            || self.objects.reservations.contains_key(name);
        if taken {
            out.push(
                federate,
                Callback::ObjectInstanceNameReservationFailed {
                    name: name.to_string(),
                },
            );
        } else {
            self.objects
                .reservations
                .insert(name.to_string(), federate);
            out.push(
                federate,
                Callback::ObjectInstanceNameReservationSucceeded {
                    name: name.to_string(),
                },
            );
        }
        Ok(())
    }

    pub(crate) fn release_object_instance_name(
        &mut self,
        federate: FederateHandle,
        name: &str,
    ) -> Result<()> {
        self.check_active(federate)?;
        if self.objects.reservation(name) != Some(federate) {
            return Err(RtiError::ObjectInstanceNameNotReserved(name.to_string()));
        }
        self.objects.reservations.remove(name);
        Ok(())
    }

    // ========================================================================
    // Registration and discovery
    // ========================================================================

    pub(crate) fn register_object_instance(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        name: Option<&str>,
        regions: &AttributeSetRegionSetPairList,
        out: &mut Outbox<T>,
    ) -> Result<ObjectInstanceHandle> {
        self.check_active(federate)?;
        let info = self.catalog.object_class(class)?;
        let declarations = self.registry.declarations(federate)?;
        if !declarations.publishes_class(class) {
            return Err(RtiError::ObjectClassNotPublished(class));
        }
        if let Some(name) = name {
            if illegal_name(name) {
                return Err(RtiError::IllegalName(name.to_string()));
            }
            if self.objects.names.contains_key(name) {
                return Err(RtiError::ObjectInstanceNameInUse(name.to_string()));
            }
            match self.objects.reservation(name) {
                Some(owner) if owner != federate => {
                    return Err(RtiError::ObjectInstanceNameInUse(name.to_string()))
                }
                None if self.config.strict_name_reservation => {
                    return Err(RtiError::ObjectInstanceNameNotReserved(name.to_string()))
                }
                _ => {}
            }
        }
        for (attributes, _) in regions {
            self.catalog.check_attributes(class, attributes)?;
            if let Some(a) = attributes
                .iter()
                .find(|a| !declarations.publishes_attribute(class, **a))
            {
                return Err(RtiError::AttributeNotPublished(*a));
            }
        }
        self.check_region_pairs(federate, regions)?;

        let handle = self.objects.allocator.allocate();
        let attributes = info
            .attributes
            .iter()
            .map(|a| {
                let owner = declarations
                    .publishes_attribute(class, *a)
                    .then_some(federate);
                (*a, AttributeOwnershipRecord::owned_by(owner))
            })
            .collect();
        let mut update_regions: BTreeMap<AttributeHandle, RegionHandleSet> = BTreeMap::new();
        for (attrs, set) in regions {
            for a in attrs {
                update_regions.entry(*a).or_default().extend(set.iter().copied());
            }
        }
        let name = match name {
            Some(n) => n.to_string(),
            None => format!("{}{}", self.config.object_name_prefix, handle.value()),
        };
        let mut instance = ObjectInstance {
            handle,
            name,
            class,
            registrar: federate,
            attributes,
            update_regions,
            known_by: BTreeMap::new(),
        };
        instance.known_by.insert(federate, class);

        for record in self.registry.records() {
            if record.handle == federate {
                continue;
            }
            if let Some(known) = discovery_class(&self.catalog, &record.declarations, class) {
                instance.known_by.insert(record.handle, known);
                out.push(
                    record.handle,
                    Callback::DiscoverObjectInstance {
                        object: handle,
                        class: known,
                        name: instance.name.clone(),
                        producer: federate,
                    },
                );
            }
        }
        log::debug!(
            "[object] {:?} registered {:?} '{}' of {:?}",
            federate,
            handle,
            instance.name,
            class
        );
        self.objects.insert(instance);
        Ok(handle)
    }

    /// Discover existing instances a federate has become interested in.
    pub(crate) fn discover_existing(&mut self, federate: FederateHandle, out: &mut Outbox<T>) {
        let Ok(record) = self.registry.get(federate) else {
            return;
        };
        for instance in self.objects.instances.values_mut() {
            if instance.known_by.contains_key(&federate) {
                continue;
            }
            if let Some(known) = discovery_class(&self.catalog, &record.declarations, instance.class)
            {
                instance.known_by.insert(federate, known);
                out.push(
                    federate,
                    Callback::DiscoverObjectInstance {
                        object: instance.handle,
                        class: known,
                        name: instance.name.clone(),
                        producer: instance.registrar,
                    },
                );
            }
        }
    }

    // ========================================================================
    // Updates and interactions
    // ========================================================================

    pub(crate) fn update_attribute_values(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        values: AttributeValues,
        tag: &[u8],
        time: Option<T>,
        out: &mut Outbox<T>,
    ) -> Result<Option<MessageRetractionHandle>> {
        self.check_active(federate)?;
        let instance = self.objects.known(federate, object)?;
        let attributes: AttributeHandleSet = values.keys().copied().collect();
        self.catalog.check_attributes(instance.class, &attributes)?;
        if let Some(a) = attributes
            .iter()
            .find(|a| instance.owner(**a) != Some(federate))
        {
            return Err(RtiError::AttributeNotOwned(*a));
        }

        let (timestamped, receive): (AttributeValues, AttributeValues) = values
            .into_iter()
            .partition(|(a, _)| {
                self.catalog
                    .attribute(*a)
                    .is_ok_and(|info| info.order == OrderType::Timestamp)
            });
        let stamp = match time {
            Some(_) if !timestamped.is_empty() => {
                self.time
                    .message_timestamp(federate, time, OrderType::Timestamp)?
            }
            _ => self.time.message_timestamp(federate, time, OrderType::Receive)?,
        };
        let retraction = stamp.map(|t| self.time.issue_retraction(federate, t));
        let groups: Vec<(AttributeValues, Option<T>)> = match stamp {
            Some(t) => vec![(timestamped, Some(t)), (receive, None)],
            None => {
                let mut all = timestamped;
                all.extend(receive);
                vec![(all, None)]
            }
        };

        let mut deliveries = Vec::new();
        for (receiver, known_class) in &instance.known_by {
            if *receiver == federate {
                continue;
            }
            let Ok(declarations) = self.registry.declarations(*receiver) else {
                continue;
            };
            let Some(subscribed) = declarations.subscribed_attributes.get(known_class) else {
                continue;
            };
            for (group, stamp) in &groups {
                let filtered: AttributeValues = group
                    .iter()
                    .filter(|(a, _)| {
                        subscribed.get(*a).is_some_and(|regions| {
                            self.ddm.matches(instance.update_regions.get(*a), regions)
                        })
                    })
                    .map(|(a, v)| (*a, v.clone()))
                    .collect();
                if filtered.is_empty() {
                    continue;
                }
                let transportation = filtered
                    .keys()
                    .next()
                    .and_then(|a| self.catalog.attribute(*a).ok())
                    .map(|info| info.transportation)
                    .unwrap_or_default();
                let order = if stamp.is_some() {
                    OrderType::Timestamp
                } else {
                    OrderType::Receive
                };
                deliveries.push((
                    *receiver,
                    *stamp,
                    Callback::ReflectAttributeValues {
                        object,
                        values: filtered,
                        tag: tag.to_vec(),
                        sent_order: order,
                        transportation,
                        time,
                        received_order: order,
                        retraction: retraction.filter(|_| stamp.is_some()),
                        producer: federate,
                    },
                ));
            }
        }
        for (receiver, stamp, callback) in deliveries {
            self.time.deliver(receiver, callback, stamp, out);
        }
        Ok(retraction)
    }

    pub(crate) fn send_interaction(
        &mut self,
        federate: FederateHandle,
        class: InteractionClassHandle,
        parameters: ParameterValues,
        tag: &[u8],
        time: Option<T>,
        regions: Option<&RegionHandleSet>,
        out: &mut Outbox<T>,
    ) -> Result<Option<MessageRetractionHandle>> {
        self.check_active(federate)?;
        let info = self.catalog.interaction_class(class)?;
        if !self
            .registry
            .declarations(federate)?
            .published_interactions
            .contains(&class)
        {
            return Err(RtiError::InteractionClassNotPublished(class));
        }
        if let Some(p) = parameters.keys().find(|p| !info.parameters.contains(*p)) {
            return Err(RtiError::InteractionParameterNotDefined(*p));
        }
        if let Some(regions) = regions {
            self.check_regions_for_context(federate, regions, &info.dimensions)?;
        }
        let stamp = self.time.message_timestamp(federate, time, info.order)?;
        let retraction = stamp.map(|t| self.time.issue_retraction(federate, t));
        let order = if stamp.is_some() {
            OrderType::Timestamp
        } else {
            OrderType::Receive
        };
        let lineage = self.catalog.interaction_lineage(class);

        let mut deliveries = Vec::new();
        for record in self.registry.records() {
            if record.handle == federate {
                continue;
            }
            let subscribed = lineage.iter().find_map(|c| {
                record
                    .declarations
                    .subscribed_interactions
                    .get(c)
                    .map(|regions| (*c, regions))
            });
            let Some((known, subscription)) = subscribed else {
                continue;
            };
            if !self.ddm.matches(regions, subscription) {
                continue;
            }
            let known_parameters = &self.catalog.interaction_class(known)?.parameters;
            let filtered: ParameterValues = parameters
                .iter()
                .filter(|(p, _)| known_parameters.contains(*p))
                .map(|(p, v)| (*p, v.clone()))
                .collect();
            deliveries.push((
                record.handle,
                Callback::ReceiveInteraction {
                    class: known,
                    parameters: filtered,
                    tag: tag.to_vec(),
                    sent_order: order,
                    transportation: info.transportation,
                    time,
                    received_order: order,
                    retraction,
                    producer: federate,
                },
            ));
        }
        for (receiver, callback) in deliveries {
            self.time.deliver(receiver, callback, stamp, out);
        }
        Ok(retraction)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    pub(crate) fn delete_object_instance(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        tag: &[u8],
        time: Option<T>,
        out: &mut Outbox<T>,
    ) -> Result<Option<MessageRetractionHandle>> {
        self.check_active(federate)?;
        let instance = self.objects.known(federate, object)?;
        if instance.owner(self.catalog.privilege_to_delete()) != Some(federate) {
            return Err(RtiError::DeletePrivilegeNotHeld(object));
        }
        let stamp = self
            .time
            .message_timestamp(federate, time, OrderType::Timestamp)?;
        let retraction = stamp.map(|t| self.time.issue_retraction(federate, t));
        self.remove_instance(federate, object, tag, time, stamp, retraction, out);
        Ok(retraction)
    }

    /// Remove an instance and tell every federate that knows it. A
    /// retractable delete keeps the instance as a tombstone.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn remove_instance(
        &mut self,
        producer: FederateHandle,
        object: ObjectInstanceHandle,
        tag: &[u8],
        time: Option<T>,
        stamp: Option<T>,
        retraction: Option<MessageRetractionHandle>,
        out: &mut Outbox<T>,
    ) {
        let Some(instance) = self.objects.remove(object) else {
            return;
        };
        let order = if stamp.is_some() {
            OrderType::Timestamp
        } else {
            OrderType::Receive
        };
        for receiver in instance.known_by.keys() {
            if *receiver == producer {
                continue;
            }
            self.time.deliver(
                *receiver,
                Callback::RemoveObjectInstance {
                    object,
                    tag: tag.to_vec(),
                    sent_order: order,
                    time,
                    received_order: order,
                    retraction,
                    producer,
                },
                stamp,
                out,
            );
        }
        log::debug!("[object] {:?} deleted {:?}", producer, object);
        if let Some(retraction) = retraction {
            self.objects.bury(retraction, instance);
        }
    }

    /// A retracted delete cannot come back once its name was taken again.
    pub(crate) fn check_revivable(&self, retraction: MessageRetractionHandle) -> Result<()> {
        let Some(instance) = self.objects.tombstone(retraction) else {
            return Ok(());
        };
        if self.objects.handle_by_name(&instance.name).is_some()
            || self.objects.reservation(&instance.name).is_some()
        {
            return Err(RtiError::MessageCanNoLongerBeRetracted(retraction));
        }
        Ok(())
    }

    /// Put back the instance of a retracted delete, minus what left the
    /// federation meanwhile.
    pub(crate) fn revive_instance(&mut self, retraction: MessageRetractionHandle) {
        let Some(mut instance) = self.objects.deleted.remove(&retraction) else {
            return;
        };
        let registry = &self.registry;
        instance.known_by.retain(|h, _| registry.contains(*h));
        for record in instance.attributes.values_mut() {
            *record = record.revived(|h| registry.contains(h));
        }
        let ddm = &self.ddm;
        for set in instance.update_regions.values_mut() {
            set.retain(|r| ddm.contains(*r));
        }
        instance.update_regions.retain(|_, set| !set.is_empty());
        log::debug!("[object] {:?} restored by retraction", instance.handle);
        self.objects.insert(instance);
    }

    pub(crate) fn local_delete_object_instance(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
    ) -> Result<()> {
        self.check_active(federate)?;
        let instance = self.objects.known(federate, object)?;
        if instance.owns_any(federate) {
            return Err(RtiError::FederateOwnsAttributes(federate));
        }
        self.objects.get_mut(object)?.known_by.remove(&federate);
        Ok(())
    }

    // ========================================================================
    // Update requests
    // ========================================================================

    pub(crate) fn request_attribute_value_update(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        let instance = self.objects.known(federate, object)?;
        self.catalog.check_attributes(instance.class, attributes)?;
        request_from_owners(federate, instance, attributes, tag, out);
        Ok(())
    }

    pub(crate) fn request_class_attribute_value_update(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.check_attributes(class, attributes)?;
        for instance in self.objects.instances() {
            if self.catalog.is_subclass_of(instance.class, class) {
                request_from_owners(federate, instance, attributes, tag, out);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub(crate) fn object_instance_handle(
        &self,
        federate: FederateHandle,
        name: &str,
    ) -> Result<ObjectInstanceHandle> {
        self.check_member(federate)?;
        self.objects
            .handle_by_name(name)
            .ok_or_else(|| RtiError::NameNotFound(name.to_string()))
    }

    pub(crate) fn object_instance_name(
        &self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
    ) -> Result<String> {
        self.check_member(federate)?;
        Ok(self.objects.get(object)?.name.clone())
    }

    pub(crate) fn known_object_class_handle(
        &self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
    ) -> Result<ObjectClassHandle> {
        self.check_member(federate)?;
        self.objects
            .known(federate, object)?
            .known_by
            .get(&federate)
            .copied()
            .ok_or(RtiError::ObjectInstanceNotKnown(object))
    }
}

fn request_from_owners<T>(
    requester: FederateHandle,
    instance: &ObjectInstance,
    attributes: &AttributeHandleSet,
    tag: &[u8],
    out: &mut Outbox<T>,
) {
    let mut by_owner: BTreeMap<FederateHandle, AttributeHandleSet> = BTreeMap::new();
    for attribute in attributes {
        if let Some(owner) = instance.owner(*attribute) {
            if owner != requester {
                by_owner.entry(owner).or_default().insert(*attribute);
            }
        }
    }
    for (owner, attributes) in by_owner {
        out.push(
            owner,
            Callback::ProvideAttributeValueUpdate {
                object: instance.handle,
                attributes,
                tag: tag.to_vec(),
            },
        );
    }
}
