// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::RtiAmbassador;
use crate::error::Result;
use crate::handle::{AttributeHandleSet, InteractionClassHandle, ObjectClassHandle};
use crate::time::LogicalTime;

/// Declaration management services.
pub trait DeclarationManagement {
    fn publish_object_class_attributes(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()>;

    /// Stop publishing `class`; owned attributes of its instances are
    /// divested and pending acquisitions cancelled.
    fn unpublish_object_class(&self, class: ObjectClassHandle) -> Result<()>;

    fn unpublish_object_class_attributes(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()>;

    fn publish_interaction_class(&self, class: InteractionClassHandle) -> Result<()>;

    fn unpublish_interaction_class(&self, class: InteractionClassHandle) -> Result<()>;

    /// Subscribe with the default region. Existing instances of the class
    /// are discovered.
    fn subscribe_object_class_attributes(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()>;

    fn unsubscribe_object_class(&self, class: ObjectClassHandle) -> Result<()>;

    fn unsubscribe_object_class_attributes(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()>;

    fn subscribe_interaction_class(&self, class: InteractionClassHandle) -> Result<()>;

    fn unsubscribe_interaction_class(&self, class: InteractionClassHandle) -> Result<()>;
}

impl<T: LogicalTime> DeclarationManagement for RtiAmbassador<T> {
    fn publish_object_class_attributes(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, _| s.publish_object_class_attributes(me, class, attributes))
    }

    fn unpublish_object_class(&self, class: ObjectClassHandle) -> Result<()> {
        self.transact(|s, me, out| s.unpublish_object_class(me, class, out))
    }

    fn unpublish_object_class_attributes(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, out| s.unpublish_object_class_attributes(me, class, attributes, out))
    }

    fn publish_interaction_class(&self, class: InteractionClassHandle) -> Result<()> {
        self.transact(|s, me, _| s.publish_interaction_class(me, class))
    }

    fn unpublish_interaction_class(&self, class: InteractionClassHandle) -> Result<()> {
        self.transact(|s, me, _| s.unpublish_interaction_class(me, class))
    }

    fn subscribe_object_class_attributes(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, out| s.subscribe_object_class_attributes(me, class, attributes, out))
    }

    fn unsubscribe_object_class(&self, class: ObjectClassHandle) -> Result<()> {
        self.transact(|s, me, _| s.unsubscribe_object_class(me, class))
    }

    fn unsubscribe_object_class_attributes(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.transact(|s, me, _| s.unsubscribe_object_class_attributes(me, class, attributes))
    }

    fn subscribe_interaction_class(&self, class: InteractionClassHandle) -> Result<()> {
        self.transact(|s, me, _| s.subscribe_interaction_class(me, class))
    }

    fn unsubscribe_interaction_class(&self, class: InteractionClassHandle) -> Result<()> {
        self.transact(|s, me, _| s.unsubscribe_interaction_class(me, class))
    }
}
