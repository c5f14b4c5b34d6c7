// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One federation execution.
//!
//! All state of an execution lives in a [`FederationState`] behind a single
//! mutex. Every RTI operation runs as one transaction on it:
//!
//! 1. lock the state,
//! 2. validate every precondition, then mutate,
//! 3. settle: complete constraint enables, time grants and timed saves the
//!    mutation made possible,
//! 4. append the produced callbacks to the target federates' queues.
//!
//! An operation that fails in step 2 leaves the state untouched and its
//! callbacks are discarded. Callbacks only run after the lock is released,
//! when the federate drains its queue.

mod ddm;
mod declaration;
mod object;
mod ownership;
mod registry;
mod save;
mod sync;
mod time;

pub use ownership::OwnershipState;
pub use save::SaveRestoreState;
pub use time::{AdvanceKind, TimeAdvanceState};

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::callback::{Callback, CallbackQueue};
use crate::config::RtiConfig;
use crate::error::{Result, RtiError};
use crate::fom::Catalog;
use crate::handle::FederateHandle;
use crate::time::LogicalTime;
use crate::types::ResignAction;

use ddm::RegionStore;
use object::ObjectStore;
use registry::Registry;
use save::SaveCoordinator;
use sync::SyncPoints;
use time::TimeManager;

/// Callbacks produced by one transaction, delivered once it commits.
pub(crate) struct Outbox<T> {
    items: Vec<(FederateHandle, Callback<T>)>,
}

impl<T> Default for Outbox<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Outbox<T> {
    pub(crate) fn push(&mut self, federate: FederateHandle, callback: Callback<T>) {
        self.items.push((federate, callback));
    }

    fn flush(self, queues: &BTreeMap<FederateHandle, Arc<CallbackQueue<T>>>) {
        for (federate, callback) in self.items {
            match queues.get(&federate) {
                Some(queue) => queue.push(callback),
                None => log::debug!("[federation] dropping {} for {:?}", callback.name(), federate),
            }
        }
    }
}

/// Complete mutable state of one federation execution.
pub(crate) struct FederationState<T: LogicalTime> {
    name: String,
    catalog: Arc<Catalog>,
    config: Arc<RtiConfig>,
    registry: Registry,
    objects: ObjectStore,
    time: TimeManager<T>,
    ddm: RegionStore,
    sync: SyncPoints,
    save: SaveCoordinator<T>,
    queues: BTreeMap<FederateHandle, Arc<CallbackQueue<T>>>,
    destroyed: bool,
}

impl<T: LogicalTime> FederationState<T> {
    fn new(name: String, catalog: Arc<Catalog>, config: Arc<RtiConfig>) -> Self {
        Self {
            name,
            catalog,
            config,
            registry: Registry::default(),
            objects: ObjectStore::default(),
            time: TimeManager::default(),
            ddm: RegionStore::default(),
            sync: SyncPoints::default(),
            save: SaveCoordinator::default(),
            queues: BTreeMap::new(),
            destroyed: false,
        }
    }

    pub(crate) fn check_member(&self, federate: FederateHandle) -> Result<()> {
        if self.registry.contains(federate) {
            Ok(())
        } else {
            Err(RtiError::FederateNotExecutionMember)
        }
    }

    /// Membership plus the save/restore gate for ordinary operations.
    pub(crate) fn check_active(&self, federate: FederateHandle) -> Result<()> {
        self.check_member(federate)?;
        match self.save.blocks(federate) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn settle(&mut self, out: &mut Outbox<T>) {
        let grants = self.time.evaluate(out);
        if !grants.is_empty() {
            log::trace!("[federation] {} grants in '{}'", grants.len(), self.name);
        }
        self.save.instruct_due(&self.time, out);
        let time = &self.time;
        self.objects.prune_tombstones(|h| time.is_retractable(h));
    }

    // ========================================================================
    // Membership
    // ========================================================================

    pub(crate) fn join(
        &mut self,
        federate_name: Option<&str>,
        federate_type: &str,
        queue: Arc<CallbackQueue<T>>,
        out: &mut Outbox<T>,
    ) -> Result<FederateHandle> {
        if self.destroyed {
            return Err(RtiError::FederationExecutionDoesNotExist(self.name.clone()));
        }
        self.save.check_idle()?;
        let federate = self.registry.join(federate_name, federate_type)?;
        self.time.join(federate);
        self.queues.insert(federate, queue);
        self.sync.on_join(federate, out);
        log::info!(
            "[federation] {:?} joined '{}' ({} members)",
            federate,
            self.name,
            self.registry.len()
        );
        Ok(federate)
    }

    /// Leave the execution after applying `action`.
    ///
    /// Fails without changing anything when the action would leave the
    /// federate owning attributes or waiting on acquisitions.
    pub(crate) fn resign(
        &mut self,
        federate: FederateHandle,
        action: ResignAction,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_member(federate)?;
        if !action.cancels_acquisitions() && self.has_pending_acquisitions(federate) {
            return Err(RtiError::OwnershipAcquisitionPending);
        }
        let privilege = self.catalog.privilege_to_delete();
        let deletable = |owner: Option<FederateHandle>| action.deletes_objects() && owner == Some(federate);
        if !action.divests()
            && self
                .objects
                .instances()
                .any(|i| i.owns_any(federate) && !deletable(i.owner(privilege)))
        {
            return Err(RtiError::FederateOwnsAttributes(federate));
        }

        if action.cancels_acquisitions() {
            self.cancel_acquisitions_where(federate, |_, _| true, false, out);
        }
        if action.deletes_objects() {
            let doomed: Vec<_> = self
                .objects
                .instances()
                .filter(|i| i.owner(privilege) == Some(federate))
                .map(|i| i.handle)
                .collect();
            for object in doomed {
                self.remove_instance(federate, object, &[], None, None, None, out);
            }
        }
        if action.divests() {
            self.release_attributes_where(federate, |_, _| true, out);
        }

        self.objects.forget_federate(federate);
        self.remove_regions_of(federate);
        self.registry.remove(federate);
        self.time.leave(federate);
        self.sync.on_resign(federate, out);
        self.save.on_resign(federate, out);
        self.queues.remove(&federate);
        log::info!(
            "[federation] {:?} resigned from '{}' with {:?}",
            federate,
            self.name,
            action
        );
        Ok(())
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub(crate) fn federate_handle(&self, federate: FederateHandle, name: &str) -> Result<FederateHandle> {
        self.check_member(federate)?;
        self.registry
            .handle_by_name(name)
            .ok_or_else(|| RtiError::NameNotFound(name.to_string()))
    }

    pub(crate) fn federate_name(&self, federate: FederateHandle, of: FederateHandle) -> Result<String> {
        self.check_member(federate)?;
        self.registry
            .get(of)
            .map(|r| r.name.clone())
            .map_err(|_| RtiError::FederateHandleNotKnown(of))
    }
}

/// A named federation execution shared by its federates' sessions.
pub(crate) struct Federation<T: LogicalTime> {
    name: String,
    catalog: Arc<Catalog>,
    state: Mutex<FederationState<T>>,
}

impl<T: LogicalTime> Federation<T> {
    pub(crate) fn new(name: &str, catalog: Catalog, config: Arc<RtiConfig>) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            name: name.to_string(),
            catalog: catalog.clone(),
            state: Mutex::new(FederationState::new(name.to_string(), catalog, config)),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// The immutable object model; readable without the lock.
    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run `op` as one transaction; see the module docs.
    pub(crate) fn transact<R>(
        &self,
        op: impl FnOnce(&mut FederationState<T>, &mut Outbox<T>) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.state.lock();
        let mut out = Outbox::default();
        let value = op(&mut state, &mut out)?;
        state.settle(&mut out);
        out.flush(&state.queues);
        Ok(value)
    }

    /// Run a query that produces no callbacks.
    pub(crate) fn read<R>(&self, op: impl FnOnce(&FederationState<T>) -> Result<R>) -> Result<R> {
        let state = self.state.lock();
        op(&state)
    }

    pub(crate) fn member_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    /// Refuse further joins; fails while federates are joined.
    pub(crate) fn mark_destroyed(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(RtiError::FederationExecutionDoesNotExist(self.name.clone()));
        }
        if state.registry.len() > 0 {
            return Err(RtiError::FederatesCurrentlyJoined(self.name.clone()));
        }
        state.destroyed = true;
        Ok(())
    }
}
