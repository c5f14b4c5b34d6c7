// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::RtiAmbassador;
use crate::error::Result;
use crate::handle::{
    DimensionHandle, DimensionHandleSet, InteractionClassHandle, MessageRetractionHandle,
    ObjectClassHandle, ObjectInstanceHandle, RegionHandle, RegionHandleSet,
};
use crate::time::LogicalTime;
use crate::types::{AttributeSetRegionSetPairList, ParameterValues, RangeBounds};

/// Data distribution management services.
///
/// Range bounds are half-open `[lower, upper)`. Changes made with
/// [`set_range_bounds`](Self::set_range_bounds) only affect routing once
/// committed.
pub trait DataDistributionManagement<T: LogicalTime> {
    /// New region spanning the full range of each dimension.
    fn create_region(&self, dimensions: &DimensionHandleSet) -> Result<RegionHandle>;

    fn commit_region_modifications(&self, regions: &RegionHandleSet) -> Result<()>;

    /// Fails while the region is associated with an update or subscription.
    fn delete_region(&self, region: RegionHandle) -> Result<()>;

    fn set_range_bounds(
        &self,
        region: RegionHandle,
        dimension: DimensionHandle,
        bounds: RangeBounds,
    ) -> Result<()>;

    fn get_range_bounds(&self, region: RegionHandle, dimension: DimensionHandle) -> Result<RangeBounds>;

    fn get_dimension_handle_set(&self, region: RegionHandle) -> Result<DimensionHandleSet>;

    fn register_object_instance_with_regions(
        &self,
        class: ObjectClassHandle,
        pairs: &AttributeSetRegionSetPairList,
        name: Option<&str>,
    ) -> Result<ObjectInstanceHandle>;

    fn associate_regions_for_updates(
        &self,
        object: ObjectInstanceHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()>;

    fn unassociate_regions_for_updates(
        &self,
        object: ObjectInstanceHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()>;

    fn subscribe_object_class_attributes_with_regions(
        &self,
        class: ObjectClassHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()>;

    fn unsubscribe_object_class_attributes_with_regions(
        &self,
        class: ObjectClassHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()>;

    fn subscribe_interaction_class_with_regions(
        &self,
        class: InteractionClassHandle,
        regions: &RegionHandleSet,
    ) -> Result<()>;

    fn unsubscribe_interaction_class_with_regions(
        &self,
        class: InteractionClassHandle,
        regions: &RegionHandleSet,
    ) -> Result<()>;

    /// Deliver only to subscribers whose regions overlap `regions`.
    fn send_interaction_with_regions(
        &self,
        class: InteractionClassHandle,
        parameters: ParameterValues,
        regions: &RegionHandleSet,
        tag: &[u8],
        time: Option<T>,
    ) -> Result<Option<MessageRetractionHandle>>;
}

impl<T: LogicalTime> DataDistributionManagement<T> for RtiAmbassador<T> {
    fn create_region(&self, dimensions: &DimensionHandleSet) -> Result<RegionHandle> {
        self.transact(|s, me, _| s.create_region(me, dimensions))
    }

    fn commit_region_modifications(&self, regions: &RegionHandleSet) -> Result<()> {
        self.transact(|s, me, _| s.commit_region_modifications(me, regions))
    }

    fn delete_region(&self, region: RegionHandle) -> Result<()> {
        self.transact(|s, me, _| s.delete_region(me, region))
    }

    fn set_range_bounds(
        &self,
        region: RegionHandle,
        dimension: DimensionHandle,
        bounds: RangeBounds,
    ) -> Result<()> {
        self.transact(|s, me, _| s.set_range_bounds(me, region, dimension, bounds))
    }

    fn get_range_bounds(&self, region: RegionHandle, dimension: DimensionHandle) -> Result<RangeBounds> {
        self.read(|s, me| s.get_range_bounds(me, region, dimension))
    }

    fn get_dimension_handle_set(&self, region: RegionHandle) -> Result<DimensionHandleSet> {
        self.read(|s, me| s.get_dimension_handle_set(me, region))
    }

    fn register_object_instance_with_regions(
        &self,
        class: ObjectClassHandle,
        pairs: &AttributeSetRegionSetPairList,
        name: Option<&str>,
    ) -> Result<ObjectInstanceHandle> {
        self.transact(|s, me, out| s.register_object_instance(me, class, name, pairs, out))
    }

    fn associate_regions_for_updates(
        &self,
        object: ObjectInstanceHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()> {
        self.transact(|s, me, _| s.associate_regions_for_updates(me, object, pairs))
    }

    fn unassociate_regions_for_updates(
        &self,
        object: ObjectInstanceHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()> {
        self.transact(|s, me, _| s.unassociate_regions_for_updates(me, object, pairs))
    }

    fn subscribe_object_class_attributes_with_regions(
        &self,
        class: ObjectClassHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()> {
        self.transact(|s, me, out| {
            s.subscribe_object_class_attributes_with_regions(me, class, pairs, out)
        })
    }

    fn unsubscribe_object_class_attributes_with_regions(
        &self,
        class: ObjectClassHandle,
        pairs: &AttributeSetRegionSetPairList,
    ) -> Result<()> {
        self.transact(|s, me, _| s.unsubscribe_object_class_attributes_with_regions(me, class, pairs))
    }

    fn subscribe_interaction_class_with_regions(
        &self,
        class: InteractionClassHandle,
        regions: &RegionHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, _| s.subscribe_interaction_class_with_regions(me, class, regions))
    }

    fn unsubscribe_interaction_class_with_regions(
        &self,
        class: InteractionClassHandle,
        regions: &RegionHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, _| s.unsubscribe_interaction_class_with_regions(me, class, regions))
    }

    fn send_interaction_with_regions(
        &self,
        class: InteractionClassHandle,
        parameters: ParameterValues,
        regions: &RegionHandleSet,
        tag: &[u8],
        time: Option<T>,
    ) -> Result<Option<MessageRetractionHandle>> {
        self.transact(|s, me, out| {
            s.send_interaction(me, class, parameters, tag, time, Some(regions), out)
        })
    }
}
