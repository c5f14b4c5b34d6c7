// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Data distribution management integration tests

mod common;

use common::{drain, join, rti, set, Federate};
use hrti::{
    Callback, DataDistributionManagement, DeclarationManagement, DimensionHandle,
    ObjectManagement, ParameterValues, RangeBounds, RegionHandle, RtiError, SupportServices,
};

/// Committed region over X spanning `[lower, upper)`.
fn region_x(federate: &Federate, lower: u64, upper: u64) -> RegionHandle {
    let x = federate.get_dimension_handle("X").unwrap();
    let region = federate.create_region(&set([x])).unwrap();
    federate
        .set_range_bounds(region, x, RangeBounds::new(lower, upper))
        .unwrap();
    federate
        .commit_region_modifications(&set([region]))
        .unwrap();
    region
}

fn reflected(callbacks: &[Callback<hrti::Float64Time>]) -> usize {
    callbacks
        .iter()
        .filter(|c| matches!(c, Callback::ReflectAttributeValues { .. }))
        .count()
}

#[test]
fn test_interaction_routing_follows_committed_bounds() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    let honk = a.get_interaction_class_handle("Honk").unwrap();
    let x: DimensionHandle = a.get_dimension_handle("X").unwrap();

    let ra = region_x(&a, 0, 10);
    let rb = region_x(&b, 50, 60);
    assert_eq!(a.get_dimension_handle_set(ra).unwrap(), set([x]));

    a.publish_interaction_class(honk).unwrap();
    b.subscribe_interaction_class_with_regions(honk, &set([rb]))
        .unwrap();

    a.send_interaction_with_regions(honk, ParameterValues::new(), &set([ra]), &[], None)
        .unwrap();
    assert!(drain(&b).is_empty());

    // Staged bounds are visible but do not route until committed.
    a.set_range_bounds(ra, x, RangeBounds::new(55, 70)).unwrap();
    assert_eq!(a.get_range_bounds(ra, x).unwrap(), RangeBounds::new(55, 70));
    a.send_interaction_with_regions(honk, ParameterValues::new(), &set([ra]), &[], None)
        .unwrap();
    assert!(drain(&b).is_empty());

    a.commit_region_modifications(&set([ra])).unwrap();
    a.send_interaction_with_regions(honk, ParameterValues::new(), &set([ra]), b"near", None)
        .unwrap();
    let received = drain(&b);
    assert_eq!(received.len(), 1);
    assert!(matches!(
        &received[0],
        Callback::ReceiveInteraction { class, tag, .. } if *class == honk && tag == b"near"
    ));

    // No regions means the default region, which overlaps everything.
    a.send_interaction(honk, ParameterValues::new(), &[], None)
        .unwrap();
    assert_eq!(drain(&b).len(), 1);
}

#[test]
fn test_region_errors() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    let honk = a.get_interaction_class_handle("Honk").unwrap();
    let x = a.get_dimension_handle("X").unwrap();
    let y = a.get_dimension_handle("Y").unwrap();
    let ra = region_x(&a, 0, 10);

    for bounds in [RangeBounds::new(5, 5), RangeBounds::new(7, 3), RangeBounds::new(0, 101)] {
        assert!(matches!(
            a.set_range_bounds(ra, x, bounds),
            Err(RtiError::InvalidRangeBound(_))
        ));
    }
    assert_eq!(
        a.set_range_bounds(ra, y, RangeBounds::new(0, 1)),
        Err(RtiError::RegionDoesNotContainSpecifiedDimension(ra, y))
    );
    assert_eq!(
        b.set_range_bounds(ra, x, RangeBounds::new(0, 1)),
        Err(RtiError::RegionNotCreatedByThisFederate(ra))
    );
    assert_eq!(
        b.subscribe_interaction_class_with_regions(honk, &set([ra])),
        Err(RtiError::RegionNotCreatedByThisFederate(ra))
    );

    // Honk is only routed along X.
    let ry = a.create_region(&set([y])).unwrap();
    a.publish_interaction_class(honk).unwrap();
    assert_eq!(
        a.send_interaction_with_regions(honk, ParameterValues::new(), &set([ry]), &[], None),
        Err(RtiError::InvalidRegionContext(ry))
    );

    let rb = region_x(&b, 0, 100);
    b.subscribe_interaction_class_with_regions(honk, &set([rb]))
        .unwrap();
    assert_eq!(
        b.delete_region(rb),
        Err(RtiError::RegionInUseForUpdateOrSubscription(rb))
    );
    b.unsubscribe_interaction_class_with_regions(honk, &set([rb]))
        .unwrap();
    b.delete_region(rb).unwrap();
    assert_eq!(b.delete_region(rb), Err(RtiError::InvalidRegion(rb)));
    assert_eq!(b.get_range_bounds(rb, x), Err(RtiError::InvalidRegion(rb)));
}

#[test]
fn test_attribute_updates_with_regions() {
    let rti = rti();
    let a = join(&rti, "a");
    let b = join(&rti, "b");
    let vehicle = a.get_object_class_handle("Vehicle").unwrap();
    let position = a.get_attribute_handle(vehicle, "Position").unwrap();
    let name = a.get_attribute_handle(vehicle, "Name").unwrap();
    let x = a.get_dimension_handle("X").unwrap();

    let ra = region_x(&a, 0, 10);
    let rb = region_x(&b, 50, 60);
    a.publish_object_class_attributes(vehicle, &set([position, name]))
        .unwrap();
    let object = a
        .register_object_instance_with_regions(vehicle, &vec![(set([position]), set([ra]))], None)
        .unwrap();
    b.subscribe_object_class_attributes_with_regions(vehicle, &vec![(set([position]), set([rb]))])
        .unwrap();

    // Discovery does not depend on regions.
    assert!(matches!(
        drain(&b).as_slice(),
        [Callback::DiscoverObjectInstance { object: o, .. }] if *o == object
    ));

    let update = || {
        a.update_attribute_values(object, [(position, vec![1])].into_iter().collect(), &[], None)
            .unwrap();
    };
    update();
    assert_eq!(reflected(&drain(&b)), 0);

    a.set_range_bounds(ra, x, RangeBounds::new(40, 55)).unwrap();
    update();
    assert_eq!(reflected(&drain(&b)), 0);
    a.commit_region_modifications(&set([ra])).unwrap();
    update();
    assert_eq!(reflected(&drain(&b)), 1);

    assert_eq!(
        b.associate_regions_for_updates(object, &vec![(set([position]), set([rb]))]),
        Err(RtiError::AttributeNotOwned(position))
    );
    assert_eq!(
        a.delete_region(ra),
        Err(RtiError::RegionInUseForUpdateOrSubscription(ra))
    );

    // Back on the default region the update reaches every subscriber.
    a.set_range_bounds(ra, x, RangeBounds::new(0, 10)).unwrap();
    a.commit_region_modifications(&set([ra])).unwrap();
    a.unassociate_regions_for_updates(object, &vec![(set([position]), set([ra]))])
        .unwrap();
    a.delete_region(ra).unwrap();
    update();
    assert_eq!(reflected(&drain(&b)), 1);

    b.unsubscribe_object_class_attributes_with_regions(vehicle, &vec![(set([position]), set([rb]))])
        .unwrap();
    update();
    assert!(drain(&b).is_empty());
    b.delete_region(rb).unwrap();
}
