// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Joined federates and their declaration state.

use std::collections::{BTreeMap, BTreeSet};

use super::object::illegal_name;
use crate::error::{Result, RtiError};
use crate::handle::{
    AttributeHandle, AttributeHandleSet, FederateHandle, FederateHandleSet, FederateKind,
    HandleAllocator, InteractionClassHandle, InteractionClassHandleSet, ObjectClassHandle,
    RegionHandle,
};

/// Regions a subscription was made with. `None` stands for the default
/// region, which overlaps everything.
pub(crate) type SubscriptionRegions = BTreeSet<Option<RegionHandle>>;

/// Publish/subscribe state of one federate.
#[derive(Debug, Clone, Default)]
pub(crate) struct Declarations {
    pub(crate) published_attributes: BTreeMap<ObjectClassHandle, AttributeHandleSet>,
    pub(crate) subscribed_attributes:
        BTreeMap<ObjectClassHandle, BTreeMap<AttributeHandle, SubscriptionRegions>>,
    pub(crate) published_interactions: InteractionClassHandleSet,
    pub(crate) subscribed_interactions: BTreeMap<InteractionClassHandle, SubscriptionRegions>,
}

impl Declarations {
    pub(crate) fn publishes_attribute(
        &self,
        class: ObjectClassHandle,
        attribute: AttributeHandle,
    ) -> bool {
        self.published_attributes
            .get(&class)
            .is_some_and(|attrs| attrs.contains(&attribute))
    }

    pub(crate) fn publishes_class(&self, class: ObjectClassHandle) -> bool {
        self.published_attributes
            .get(&class)
            .is_some_and(|attrs| !attrs.is_empty())
    }

    pub(crate) fn subscribes_class(&self, class: ObjectClassHandle) -> bool {
        self.subscribed_attributes
            .get(&class)
            .is_some_and(|attrs| !attrs.is_empty())
    }

    /// Every region referenced by a subscription.
    pub(crate) fn subscription_regions(&self) -> impl Iterator<Item = RegionHandle> + '_ {
        self.subscribed_attributes
            .values()
            .flat_map(|attrs| attrs.values())
            .chain(self.subscribed_interactions.values())
            .flat_map(|regions| regions.iter().flatten().copied())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FederateRecord {
    pub(crate) handle: FederateHandle,
    pub(crate) name: String,
    pub(crate) federate_type: String,
    pub(crate) declarations: Declarations,
}

/// Owns the handle -> federate mapping of one federation execution.
#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    federates: BTreeMap<FederateHandle, FederateRecord>,
    allocator: HandleAllocator<FederateKind>,
}

impl Registry {
    /// Admit a federate. A missing name is generated from the handle in the
    /// reserved `HLA` namespace, which explicit names may not use.
    pub(crate) fn join(&mut self, name: Option<&str>, federate_type: &str) -> Result<FederateHandle> {
        if let Some(name) = name {
            if illegal_name(name) {
                return Err(RtiError::IllegalName(name.to_string()));
            }
            if self.handle_by_name(name).is_some() {
                return Err(RtiError::FederateNameAlreadyInUse(name.to_string()));
            }
        }
        let handle = self.allocator.allocate();
        let name = match name {
            Some(n) => n.to_string(),
            None => format!("HLAfederate_{}", handle.value()),
        };
        self.federates.insert(
            handle,
            FederateRecord {
                handle,
                name,
                federate_type: federate_type.to_string(),
                declarations: Declarations::default(),
            },
        );
        Ok(handle)
    }

    pub(crate) fn remove(&mut self, federate: FederateHandle) -> Option<FederateRecord> {
        self.federates.remove(&federate)
    }

    pub(crate) fn contains(&self, federate: FederateHandle) -> bool {
        self.federates.contains_key(&federate)
    }

    pub(crate) fn get(&self, federate: FederateHandle) -> Result<&FederateRecord> {
        self.federates
            .get(&federate)
            .ok_or(RtiError::FederateNotExecutionMember)
    }

    pub(crate) fn get_mut(&mut self, federate: FederateHandle) -> Result<&mut FederateRecord> {
        self.federates
            .get_mut(&federate)
            .ok_or(RtiError::FederateNotExecutionMember)
    }

    pub(crate) fn declarations(&self, federate: FederateHandle) -> Result<&Declarations> {
        self.get(federate).map(|r| &r.declarations)
    }

    pub(crate) fn declarations_mut(&mut self, federate: FederateHandle) -> Result<&mut Declarations> {
        self.get_mut(federate).map(|r| &mut r.declarations)
    }

    pub(crate) fn handle_by_name(&self, name: &str) -> Option<FederateHandle> {
        self.federates
            .values()
            .find(|r| r.name == name)
            .map(|r| r.handle)
    }

    pub(crate) fn members(&self) -> FederateHandleSet {
        self.federates.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.federates.len()
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &FederateRecord> {
        self.federates.values()
    }

    /// Roll back to `saved`, keeping the allocator so handles stay unique.
    pub(crate) fn restore_from(&mut self, saved: &Registry) {
        self.federates = saved.federates.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_names_unique() {
        let mut registry = Registry::default();
        let a = registry.join(Some("alpha"), "tank").unwrap();
        assert_eq!(
            registry.join(Some("alpha"), "tank").unwrap_err(),
            RtiError::FederateNameAlreadyInUse("alpha".into())
        );
        let b = registry.join(None, "tank").unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.get(b).unwrap().name, format!("HLAfederate_{}", b.value()));
        assert_eq!(registry.handle_by_name("alpha"), Some(a));
    }

    #[test]
    fn test_reserved_prefix_rejected() {
        let mut registry = Registry::default();
        assert_eq!(
            registry.join(Some("HLAfederate_1"), "tank").unwrap_err(),
            RtiError::IllegalName("HLAfederate_1".into())
        );
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_handles_not_reused() {
        let mut registry = Registry::default();
        let a = registry.join(Some("a"), "t").unwrap();
        registry.remove(a);
        let b = registry.join(Some("a"), "t").unwrap();
        assert!(b > a);
        assert_eq!(registry.len(), 1);
    }
}
