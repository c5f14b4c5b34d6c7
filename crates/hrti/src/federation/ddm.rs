// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data distribution management: regions and their overlap.
//!
//! A region holds a half-open range per dimension. Two regions overlap when
//! their ranges overlap on every dimension they share; a dimension missing
//! from a region spans its whole extent. Updates or subscriptions made
//! without regions use the default region, which overlaps everything.
//!
//! Range changes are staged by `set_range_bounds` and only take part in
//! matching after `commit_region_modifications`.

use std::collections::BTreeMap;

use super::registry::SubscriptionRegions;
use super::{FederationState, Outbox};
use crate::error::{Result, RtiError};
use crate::handle::{
    DimensionHandle, DimensionHandleSet, FederateHandle, HandleAllocator, InteractionClassHandle,
    ObjectClassHandle, ObjectInstanceHandle, RegionHandle, RegionHandleSet, RegionKind,
};
use crate::time::LogicalTime;
use crate::types::{AttributeSetRegionSetPairList, RangeBounds};

#[derive(Debug, Clone)]
pub(crate) struct Region {
    owner: FederateHandle,
    committed: BTreeMap<DimensionHandle, RangeBounds>,
    staged: BTreeMap<DimensionHandle, RangeBounds>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RegionStore {
    regions: BTreeMap<RegionHandle, Region>,
    allocator: HandleAllocator<RegionKind>,
}

impl RegionStore {
    fn get(&self, region: RegionHandle) -> Result<&Region> {
        self.regions
            .get(&region)
            .ok_or(RtiError::InvalidRegion(region))
    }

    pub(crate) fn contains(&self, region: RegionHandle) -> bool {
        self.regions.contains_key(&region)
    }

    fn owned(&self, federate: FederateHandle, region: RegionHandle) -> Result<&Region> {
        let r = self.get(region)?;
        if r.owner != federate {
            return Err(RtiError::RegionNotCreatedByThisFederate(region));
        }
        Ok(r)
    }

    pub(crate) fn overlap(&self, a: RegionHandle, b: RegionHandle) -> bool {
        let (Some(ra), Some(rb)) = (self.regions.get(&a), self.regions.get(&b)) else {
            return false;
        };
        ra.committed.iter().all(|(dimension, bounds)| {
            rb.committed
                .get(dimension)
                .map_or(true, |other| bounds.overlaps(other))
        })
    }

    /// Whether an update made with `update` regions reaches `subscription`.
    pub(crate) fn matches(
        &self,
        update: Option<&RegionHandleSet>,
        subscription: &SubscriptionRegions,
    ) -> bool {
        if subscription.contains(&None) {
            return true;
        }
        let update = match update {
            Some(set) if !set.is_empty() => set,
            _ => return !subscription.is_empty(),
        };
        subscription
            .iter()
            .flatten()
            .any(|s| update.iter().any(|u| self.overlap(*u, *s)))
    }

    /// Roll back to `saved`, keeping the allocator so handles stay unique.
    pub(crate) fn restore_from(&mut self, saved: &RegionStore) {
        self.regions = saved.regions.clone();
    }

    /// Remove the regions of a resigned federate, returning their handles.
    pub(crate) fn remove_owned_by(&mut self, federate: FederateHandle) -> RegionHandleSet {
        let owned: RegionHandleSet = self
            .regions
            .iter()
            .filter(|(_, r)| r.owner == federate)
            .map(|(h, _)| *h)
            .collect();
        for h in &owned {
            self.regions.remove(h);
        }
        owned
    }
}

impl<T: LogicalTime> FederationState<T> {
    /// Each region must exist, belong to `federate`, and use only dimensions
    /// in `available`.
    pub(crate) fn check_regions_for_context(
        &self,
        federate: FederateHandle,
        regions: &RegionHandleSet,
        available: &DimensionHandleSet,
    ) -> Result<()> {
        for region in regions {
            let r = self.ddm.owned(federate, *region)?;
            if !r.committed.keys().all(|d| available.contains(d)) {
                return Err(RtiError::InvalidRegionContext(*region));
            }
        }
        Ok(())
    }

    pub(crate) fn check_region_pairs(
        &self,
        federate: FederateHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()> {
        for (attributes, regions) in pairs {
            for attribute in attributes {
                let available = &self.catalog.attribute(*attribute)?.dimensions;
                self.check_regions_for_context(federate, regions, available)?;
            }
        }
        Ok(())
    }

    pub(crate) fn create_region(
        &mut self,
        federate: FederateHandle,
        dimensions: &DimensionHandleSet,
    ) -> Result<RegionHandle> {
        self.check_active(federate)?;
        let mut bounds = BTreeMap::new();
        for dimension in dimensions {
            let info = self.catalog.dimension(*dimension)?;
            bounds.insert(*dimension, RangeBounds::new(0, info.upper_bound));
        }
        let handle = self.ddm.allocator.allocate();
        self.ddm.regions.insert(
            handle,
            Region {
                owner: federate,
                committed: bounds.clone(),
                staged: bounds,
            },
        );
        log::debug!("[ddm] {:?} created {:?} over {:?}", federate, handle, dimensions);
        Ok(handle)
    }

    pub(crate) fn set_range_bounds(
        &mut self,
        federate: FederateHandle,
        region: RegionHandle,
        dimension: DimensionHandle,
        bounds: RangeBounds,
    ) -> Result<()> {
        self.check_active(federate)?;
        let r = self.ddm.owned(federate, region)?;
        if !r.staged.contains_key(&dimension) {
            return Err(RtiError::RegionDoesNotContainSpecifiedDimension(region, dimension));
        }
        let upper_bound = self.catalog.dimension(dimension)?.upper_bound;
        if bounds.lower >= bounds.upper || bounds.upper > upper_bound {
            return Err(RtiError::InvalidRangeBound(format!(
                "[{}, {}) outside [0, {})",
                bounds.lower, bounds.upper, upper_bound
            )));
        }
        if let Some(r) = self.ddm.regions.get_mut(&region) {
            r.staged.insert(dimension, bounds);
        }
        Ok(())
    }

    pub(crate) fn get_range_bounds(
        &self,
        federate: FederateHandle,
        region: RegionHandle,
        dimension: DimensionHandle,
    ) -> Result<RangeBounds> {
        self.check_member(federate)?;
        self.ddm
            .get(region)?
            .staged
            .get(&dimension)
            .copied()
            .ok_or(RtiError::RegionDoesNotContainSpecifiedDimension(region, dimension))
    }

    pub(crate) fn get_dimension_handle_set(
        &self,
        federate: FederateHandle,
        region: RegionHandle,
    ) -> Result<DimensionHandleSet> {
        self.check_member(federate)?;
        Ok(self.ddm.get(region)?.staged.keys().copied().collect())
    }

    pub(crate) fn commit_region_modifications(
        &mut self,
        federate: FederateHandle,
        regions: &RegionHandleSet,
    ) -> Result<()> {
        self.check_active(federate)?;
        for region in regions {
            self.ddm.owned(federate, *region)?;
        }
        for region in regions {
            if let Some(r) = self.ddm.regions.get_mut(region) {
                r.committed = r.staged.clone();
            }
        }
        Ok(())
    }

    pub(crate) fn delete_region(&mut self, federate: FederateHandle, region: RegionHandle) -> Result<()> {
        self.check_active(federate)?;
        self.ddm.owned(federate, region)?;
        let used_for_update = self
            .objects
            .instances()
            .any(|i| i.update_regions.values().any(|set| set.contains(&region)));
        let used_for_subscription = self
            .registry
            .records()
            .any(|r| r.declarations.subscription_regions().any(|h| h == region));
        if used_for_update || used_for_subscription {
            return Err(RtiError::RegionInUseForUpdateOrSubscription(region));
        }
        self.ddm.regions.remove(&region);
        Ok(())
    }

    pub(crate) fn associate_regions_for_updates(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()> {
        self.check_active(federate)?;
        let instance = self.objects.known(federate, object)?;
        for (attributes, _) in pairs {
            self.catalog.check_attributes(instance.class, attributes)?;
            if let Some(a) = attributes
                .iter()
                .find(|a| instance.owner(**a) != Some(federate))
            {
                return Err(RtiError::AttributeNotOwned(*a));
            }
        }
        self.check_region_pairs(federate, pairs)?;

        let instance = self.objects.get_mut(object)?;
        for (attributes, regions) in pairs {
            for attribute in attributes {
                instance
                    .update_regions
                    .entry(*attribute)
                    .or_default()
                    .extend(regions.iter().copied());
            }
        }
        Ok(())
    }

    pub(crate) fn unassociate_regions_for_updates(
        &mut self,
        federate: FederateHandle,
        object: ObjectInstanceHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()> {
        self.check_active(federate)?;
        let instance = self.objects.known(federate, object)?;
        for (attributes, regions) in pairs {
            self.catalog.check_attributes(instance.class, attributes)?;
            for region in regions {
                self.ddm.owned(federate, *region)?;
            }
        }

        let instance = self.objects.get_mut(object)?;
        for (attributes, regions) in pairs {
            for attribute in attributes {
                if let Some(set) = instance.update_regions.get_mut(attribute) {
                    set.retain(|r| !regions.contains(r));
                    if set.is_empty() {
                        instance.update_regions.remove(attribute);
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn subscribe_object_class_attributes_with_regions(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        pairs: &AttributeSetRegionSetPairList,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        for (attributes, _) in pairs {
            self.catalog.check_attributes(class, attributes)?;
        }
        self.check_region_pairs(federate, pairs)?;

        let declarations = self.registry.declarations_mut(federate)?;
        let subscribed = declarations.subscribed_attributes.entry(class).or_default();
        for (attributes, regions) in pairs {
            for attribute in attributes {
                subscribed
                    .entry(*attribute)
                    .or_default()
                    .extend(regions.iter().map(|r| Some(*r)));
            }
        }
        self.discover_existing(federate, out);
        Ok(())
    }

    pub(crate) fn unsubscribe_object_class_attributes_with_regions(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()> {
        self.check_active(federate)?;
        for (attributes, regions) in pairs {
            self.catalog.check_attributes(class, attributes)?;
            for region in regions {
                self.ddm.owned(federate, *region)?;
            }
        }

        let declarations = self.registry.declarations_mut(federate)?;
        if let Some(subscribed) = declarations.subscribed_attributes.get_mut(&class) {
            for (attributes, regions) in pairs {
                for attribute in attributes {
                    if let Some(set) = subscribed.get_mut(attribute) {
                        set.retain(|r| !r.is_some_and(|r| regions.contains(&r)));
                        if set.is_empty() {
                            subscribed.remove(attribute);
                        }
                    }
                }
            }
            if subscribed.is_empty() {
                declarations.subscribed_attributes.remove(&class);
            }
        }
        Ok(())
    }

    pub(crate) fn subscribe_interaction_class_with_regions(
        &mut self,
        federate: FederateHandle,
        class: InteractionClassHandle,
        regions: &RegionHandleSet,
    ) -> Result<()> {
        self.check_active(federate)?;
        let available = &self.catalog.interaction_class(class)?.dimensions;
        self.check_regions_for_context(federate, regions, available)?;
        self.registry
            .declarations_mut(federate)?
            .subscribed_interactions
            .entry(class)
            .or_default()
            .extend(regions.iter().map(|r| Some(*r)));
        Ok(())
    }

    pub(crate) fn unsubscribe_interaction_class_with_regions(
        &mut self,
        federate: FederateHandle,
        class: InteractionClassHandle,
        regions: &RegionHandleSet,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.interaction_class(class)?;
        for region in regions {
            self.ddm.owned(federate, *region)?;
        }
        let declarations = self.registry.declarations_mut(federate)?;
        if let Some(set) = declarations.subscribed_interactions.get_mut(&class) {
            set.retain(|r| !r.is_some_and(|r| regions.contains(&r)));
            if set.is_empty() {
                declarations.subscribed_interactions.remove(&class);
            }
        }
        Ok(())
    }

    /// Drop a resigned federate's regions and every association made with them.
    pub(crate) fn remove_regions_of(&mut self, federate: FederateHandle) {
        let removed = self.ddm.remove_owned_by(federate);
        if removed.is_empty() {
            return;
        }
        for instance in self.objects.instances_mut() {
            for set in instance.update_regions.values_mut() {
                set.retain(|r| !removed.contains(r));
            }
            instance.update_regions.retain(|_, set| !set.is_empty());
        }
    }
}
