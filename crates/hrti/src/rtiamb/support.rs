// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::RtiAmbassador;
use crate::error::Result;
use crate::fom::Catalog;
use crate::handle::{
    AttributeHandle, DimensionHandle, DimensionHandleSet, FederateHandle, Handle, HandleKind,
    InteractionClassHandle, ObjectClassHandle, ObjectInstanceHandle, ParameterHandle,
};
use crate::time::LogicalTime;
use crate::types::{OrderType, TransportationType};

/// Name and handle lookups against the joined federation.
pub trait SupportServices {
    fn get_object_class_handle(&self, name: &str) -> Result<ObjectClassHandle>;

    fn get_object_class_name(&self, class: ObjectClassHandle) -> Result<String>;

    fn get_attribute_handle(&self, class: ObjectClassHandle, name: &str) -> Result<AttributeHandle>;

    fn get_attribute_name(&self, class: ObjectClassHandle, attribute: AttributeHandle) -> Result<String>;

    fn get_interaction_class_handle(&self, name: &str) -> Result<InteractionClassHandle>;

    fn get_interaction_class_name(&self, class: InteractionClassHandle) -> Result<String>;

    fn get_parameter_handle(&self, class: InteractionClassHandle, name: &str) -> Result<ParameterHandle>;

    fn get_parameter_name(
        &self,
        class: InteractionClassHandle,
        parameter: ParameterHandle,
    ) -> Result<String>;

    fn get_federate_handle(&self, name: &str) -> Result<FederateHandle>;

    fn get_federate_name(&self, federate: FederateHandle) -> Result<String>;

    fn get_object_instance_handle(&self, name: &str) -> Result<ObjectInstanceHandle>;

    fn get_object_instance_name(&self, object: ObjectInstanceHandle) -> Result<String>;

    /// Class the federate discovered (or registered) the instance as.
    fn get_known_object_class_handle(&self, object: ObjectInstanceHandle) -> Result<ObjectClassHandle>;

    fn get_dimension_handle(&self, name: &str) -> Result<DimensionHandle>;

    fn get_dimension_name(&self, dimension: DimensionHandle) -> Result<String>;

    fn get_dimension_upper_bound(&self, dimension: DimensionHandle) -> Result<u64>;

    fn get_available_dimensions_for_class_attribute(
        &self,
        class: ObjectClassHandle,
        attribute: AttributeHandle,
    ) -> Result<DimensionHandleSet>;

    fn get_available_dimensions_for_interaction_class(
        &self,
        class: InteractionClassHandle,
    ) -> Result<DimensionHandleSet>;

    fn get_order_type(&self, name: &str) -> Result<OrderType> {
        name.parse()
    }

    fn get_order_name(&self, order: OrderType) -> &'static str {
        order.name()
    }

    fn get_transportation_type(&self, name: &str) -> Result<TransportationType> {
        name.parse()
    }

    fn get_transportation_name(&self, transportation: TransportationType) -> &'static str {
        transportation.name()
    }

    /// Rebuild a handle from its encoded form.
    fn decode_handle<K: HandleKind>(&self, bytes: &[u8]) -> Result<Handle<K>> {
        Handle::decode(bytes)
    }
}

impl<T: LogicalTime> RtiAmbassador<T> {
    fn with_catalog<R>(&self, op: impl FnOnce(&Catalog) -> Result<R>) -> Result<R> {
        let (federation, _) = self.joined()?;
        op(federation.catalog())
    }
}

impl<T: LogicalTime> SupportServices for RtiAmbassador<T> {
    fn get_object_class_handle(&self, name: &str) -> Result<ObjectClassHandle> {
        self.with_catalog(|c| c.object_class_handle(name))
    }

    fn get_object_class_name(&self, class: ObjectClassHandle) -> Result<String> {
        self.with_catalog(|c| Ok(c.object_class(class)?.name.clone()))
    }

    fn get_attribute_handle(&self, class: ObjectClassHandle, name: &str) -> Result<AttributeHandle> {
        self.with_catalog(|c| c.attribute_handle(class, name))
    }

    fn get_attribute_name(&self, class: ObjectClassHandle, attribute: AttributeHandle) -> Result<String> {
        self.with_catalog(|c| c.attribute_name(class, attribute).map(str::to_string))
    }

    fn get_interaction_class_handle(&self, name: &str) -> Result<InteractionClassHandle> {
        self.with_catalog(|c| c.interaction_class_handle(name))
    }

    fn get_interaction_class_name(&self, class: InteractionClassHandle) -> Result<String> {
        self.with_catalog(|c| Ok(c.interaction_class(class)?.name.clone()))
    }

    fn get_parameter_handle(&self, class: InteractionClassHandle, name: &str) -> Result<ParameterHandle> {
        self.with_catalog(|c| c.parameter_handle(class, name))
    }

    fn get_parameter_name(
        &self,
        class: InteractionClassHandle,
        parameter: ParameterHandle,
    ) -> Result<String> {
        self.with_catalog(|c| c.parameter_name(class, parameter).map(str::to_string))
    }

    fn get_federate_handle(&self, name: &str) -> Result<FederateHandle> {
        self.read(|s, me| s.federate_handle(me, name))
    }

    fn get_federate_name(&self, federate: FederateHandle) -> Result<String> {
        self.read(|s, me| s.federate_name(me, federate))
    }

    fn get_object_instance_handle(&self, name: &str) -> Result<ObjectInstanceHandle> {
        self.read(|s, me| s.object_instance_handle(me, name))
    }

    fn get_object_instance_name(&self, object: ObjectInstanceHandle) -> Result<String> {
        self.read(|s, me| s.object_instance_name(me, object))
    }

    fn get_known_object_class_handle(&self, object: ObjectInstanceHandle) -> Result<ObjectClassHandle> {
        self.read(|s, me| s.known_object_class_handle(me, object))
    }

    fn get_dimension_handle(&self, name: &str) -> Result<DimensionHandle> {
        self.with_catalog(|c| c.dimension_handle(name))
    }

    fn get_dimension_name(&self, dimension: DimensionHandle) -> Result<String> {
        self.with_catalog(|c| Ok(c.dimension(dimension)?.name.clone()))
    }

    fn get_dimension_upper_bound(&self, dimension: DimensionHandle) -> Result<u64> {
        self.with_catalog(|c| Ok(c.dimension(dimension)?.upper_bound))
    }

    fn get_available_dimensions_for_class_attribute(
        &self,
        class: ObjectClassHandle,
        attribute: AttributeHandle,
    ) -> Result<DimensionHandleSet> {
        self.with_catalog(|c| {
            c.check_attributes(class, &[attribute].into_iter().collect())?;
            Ok(c.attribute(attribute)?.dimensions.clone())
        })
    }

    fn get_available_dimensions_for_interaction_class(
        &self,
        class: InteractionClassHandle,
    ) -> Result<DimensionHandleSet> {
        self.with_catalog(|c| Ok(c.interaction_class(class)?.dimensions.clone()))
    }
}
