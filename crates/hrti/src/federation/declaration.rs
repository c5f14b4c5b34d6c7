// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publication and subscription of object and interaction classes.

use super::{FederationState, Outbox};
use crate::error::Result;
use crate::handle::{AttributeHandleSet, FederateHandle, InteractionClassHandle, ObjectClassHandle};
use crate::time::LogicalTime;

impl<T: LogicalTime> FederationState<T> {
    /// Add `attributes` to the published set of `class`. Publishing any
    /// attribute also publishes the delete privilege.
    pub(crate) fn publish_object_class_attributes(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.check_attributes(class, attributes)?;
        if attributes.is_empty() {
            return Ok(());
        }
        let privilege = self.catalog.privilege_to_delete();
        let published = self
            .registry
            .declarations_mut(federate)?
            .published_attributes
            .entry(class)
            .or_default();
        published.extend(attributes.iter().copied());
        published.insert(privilege);
        log::debug!("[declaration] {:?} publishes {:?} {:?}", federate, class, attributes);
        Ok(())
    }

    pub(crate) fn unpublish_object_class(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.object_class(class)?;
        self.registry
            .declarations_mut(federate)?
            .published_attributes
            .remove(&class);
        self.cancel_acquisitions_where(federate, |i, _| i.class == class, true, out);
        self.release_attributes_where(federate, |i, _| i.class == class, out);
        Ok(())
    }

    pub(crate) fn unpublish_object_class_attributes(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.check_attributes(class, attributes)?;
        let declarations = self.registry.declarations_mut(federate)?;
        if let Some(published) = declarations.published_attributes.get_mut(&class) {
            published.retain(|a| !attributes.contains(a));
            if published.is_empty() {
                declarations.published_attributes.remove(&class);
            }
        }
        let matches = |i: &super::object::ObjectInstance, a| i.class == class && attributes.contains(&a);
        self.cancel_acquisitions_where(federate, matches, true, out);
        self.release_attributes_where(federate, matches, out);
        Ok(())
    }

    pub(crate) fn subscribe_object_class_attributes(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.check_attributes(class, attributes)?;
        let subscribed = self
            .registry
            .declarations_mut(federate)?
            .subscribed_attributes
            .entry(class)
            .or_default();
        for attribute in attributes {
            subscribed.entry(*attribute).or_default().insert(None);
        }
        if subscribed.is_empty() {
            self.registry
                .declarations_mut(federate)?
                .subscribed_attributes
                .remove(&class);
        }
        log::debug!("[declaration] {:?} subscribes {:?} {:?}", federate, class, attributes);
        self.discover_existing(federate, out);
        Ok(())
    }

    pub(crate) fn unsubscribe_object_class(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.object_class(class)?;
        self.registry
            .declarations_mut(federate)?
            .subscribed_attributes
            .remove(&class);
        Ok(())
    }

    pub(crate) fn unsubscribe_object_class_attributes(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.check_attributes(class, attributes)?;
        let declarations = self.registry.declarations_mut(federate)?;
        if let Some(subscribed) = declarations.subscribed_attributes.get_mut(&class) {
            subscribed.retain(|a, _| !attributes.contains(a));
            if subscribed.is_empty() {
                declarations.subscribed_attributes.remove(&class);
            }
        }
        Ok(())
    }

    pub(crate) fn publish_interaction_class(
        &mut self,
        federate: FederateHandle,
        class: InteractionClassHandle,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.interaction_class(class)?;
        self.registry
            .declarations_mut(federate)?
            .published_interactions
            .insert(class);
        Ok(())
    }

    pub(crate) fn unpublish_interaction_class(
        &mut self,
        federate: FederateHandle,
        class: InteractionClassHandle,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.interaction_class(class)?;
        self.registry
            .declarations_mut(federate)?
            .published_interactions
            .remove(&class);
        Ok(())
    }

    pub(crate) fn subscribe_interaction_class(
        &mut self,
        federate: FederateHandle,
        class: InteractionClassHandle,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.interaction_class(class)?;
        self.registry
            .declarations_mut(federate)?
            .subscribed_interactions
            .entry(class)
            .or_default()
            .insert(None);
        Ok(())
    }

    pub(crate) fn unsubscribe_interaction_class(
        &mut self,
        federate: FederateHandle,
        class: InteractionClassHandle,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.catalog.interaction_class(class)?;
        self.registry
            .declarations_mut(federate)?
            .subscribed_interactions
            .remove(&class);
        Ok(())
    }
}
