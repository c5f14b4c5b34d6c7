// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::RtiAmbassador;
use crate::error::Result;
use crate::handle::{
    AttributeHandleSet, InteractionClassHandle, MessageRetractionHandle, ObjectClassHandle,
    ObjectInstanceHandle,
};
use crate::time::LogicalTime;
use crate::types::{AttributeValues, ParameterValues};

/// Object management services.
///
/// Passing a `time` makes an update, interaction or delete timestamp ordered
/// when the sender is regulating and the data is declared timestamp ordered;
/// otherwise it is delivered in receive order carrying the time. A timestamp
/// ordered send returns the handle under which it may later be retracted.
pub trait ObjectManagement<T: LogicalTime> {
    /// Answered by `object_instance_name_reservation_succeeded` or `_failed`.
    fn reserve_object_instance_name(&self, name: &str) -> Result<()>;

    fn release_object_instance_name(&self, name: &str) -> Result<()>;

    /// Register an instance of a published class. Without a name one is
    /// generated.
    fn register_object_instance(
        &self,
        class: ObjectClassHandle,
        name: Option<&str>,
    ) -> Result<ObjectInstanceHandle>;

    fn update_attribute_values(
        &self,
        object: ObjectInstanceHandle,
        values: AttributeValues,
        tag: &[u8],
        time: Option<T>,
    ) -> Result<Option<MessageRetractionHandle>>;

    fn send_interaction(
        &self,
        class: InteractionClassHandle,
        parameters: ParameterValues,
        tag: &[u8],
        time: Option<T>,
    ) -> Result<Option<MessageRetractionHandle>>;

    /// Requires the delete privilege of the instance.
    fn delete_object_instance(
        &self,
        object: ObjectInstanceHandle,
        tag: &[u8],
        time: Option<T>,
    ) -> Result<Option<MessageRetractionHandle>>;

    /// Forget the instance locally; it can be discovered again.
    fn local_delete_object_instance(&self, object: ObjectInstanceHandle) -> Result<()>;

    fn request_attribute_value_update(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()>;

    fn request_class_attribute_value_update(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()>;
}

impl<T: LogicalTime> ObjectManagement<T> for RtiAmbassador<T> {
    fn reserve_object_instance_name(&self, name: &str) -> Result<()> {
        self.transact(|s, me, out| s.reserve_object_instance_name(me, name, out))
    }

    fn release_object_instance_name(&self, name: &str) -> Result<()> {
        self.transact(|s, me, _| s.release_object_instance_name(me, name))
    }

    fn register_object_instance(
        &self,
        class: ObjectClassHandle,
        name: Option<&str>,
    ) -> Result<ObjectInstanceHandle> {
        self.transact(|s, me, out| s.register_object_instance(me, class, name, &Vec::new(), out))
    }

    fn update_attribute_values(
        &self,
        object: ObjectInstanceHandle,
        values: AttributeValues,
        tag: &[u8],
        time: Option<T>,
    ) -> Result<Option<MessageRetractionHandle>> {
        self.transact(|s, me, out| s.update_attribute_values(me, object, values, tag, time, out))
    }

    fn send_interaction(
        &self,
        class: InteractionClassHandle,
        parameters: ParameterValues,
        tag: &[u8],
        time: Option<T>,
    ) -> Result<Option<MessageRetractionHandle>> {
        self.transact(|s, me, out| s.send_interaction(me, class, parameters, tag, time, None, out))
    }

    fn delete_object_instance(
        &self,
        object: ObjectInstanceHandle,
        tag: &[u8],
        time: Option<T>,
    ) -> Result<Option<MessageRetractionHandle>> {
        self.transact(|s, me, out| s.delete_object_instance(me, object, tag, time, out))
    }

    fn local_delete_object_instance(&self, object: ObjectInstanceHandle) -> Result<()> {
        self.transact(|s, me, _| s.local_delete_object_instance(me, object))
    }

    fn request_attribute_value_update(
        &self,
        object: ObjectInstanceHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()> {
        self.transact(|s, me, out| s.request_attribute_value_update(me, object, attributes, tag, out))
    }

    fn request_class_attribute_value_update(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
        tag: &[u8],
    ) -> Result<()> {
        self.transact(|s, me, out| {
            s.request_class_attribute_value_update(me, class, attributes, tag, out)
        })
    }
}
