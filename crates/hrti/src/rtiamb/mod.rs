// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Federate -> RTI surface.
//!
//! [`RtiAmbassador`] is one federate's session with the RTI. Its operations
//! are grouped into capability traits, one per 1516 service group:
//!
//! | Trait | Services |
//! |-------|----------|
//! | [`FederationManagement`] | create/join/resign, sync points, save/restore |
//! | [`DeclarationManagement`] | publish/subscribe |
//! | [`ObjectManagement`] | register, update, interactions, delete |
//! | [`OwnershipManagement`] | divestiture and acquisition |
//! | [`TimeManagement`] | regulation, constraint, advancing |
//! | [`DataDistributionManagement`] | regions |
//! | [`SupportServices`] | name/handle lookups |
//!
//! Callbacks are queued per session and delivered by
//! [`RtiAmbassador::evoke_callback`] / [`RtiAmbassador::evoke_multiple_callbacks`]
//! ([`CallbackModel::Evoked`]) or by a delivery thread
//! ([`CallbackModel::Immediate`]).

mod ddm;
mod declaration;
mod federation;
mod object;
mod ownership;
mod support;
mod time;

pub use ddm::DataDistributionManagement;
pub use declaration::DeclarationManagement;
pub use federation::FederationManagement;
pub use object::ObjectManagement;
pub use ownership::OwnershipManagement;
pub use support::SupportServices;
pub use time::TimeManagement;

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::ambassador::FederateAmbassador;
use crate::callback::{Callback, CallbackQueue, QueueWaker};
use crate::error::{Result, RtiError};
use crate::federation::{
    Federation, FederationState, OwnershipState, Outbox, SaveRestoreState, TimeAdvanceState,
};
use crate::handle::{AttributeHandle, FederateHandle, ObjectInstanceHandle};
use crate::rti::Rti;
use crate::time::LogicalTime;
use crate::types::CallbackModel;

type SharedAmbassador<T> = Arc<Mutex<Box<dyn FederateAmbassador<T>>>>;

struct Membership<T: LogicalTime> {
    federation: Arc<Federation<T>>,
    federate: FederateHandle,
}

/// A federate's session with the RTI.
///
/// Dropping a joined session does not resign it; call
/// [`FederationManagement::resign_federation_execution`] first.
pub struct RtiAmbassador<T: LogicalTime> {
    rti: Rti<T>,
    ambassador: SharedAmbassador<T>,
    queue: Arc<CallbackQueue<T>>,
    membership: Mutex<Option<Membership<T>>>,
    delivery: Option<JoinHandle<()>>,
}

impl<T: LogicalTime> RtiAmbassador<T> {
    pub(crate) fn new(
        rti: Rti<T>,
        ambassador: Box<dyn FederateAmbassador<T>>,
        model: CallbackModel,
    ) -> Result<Self> {
        let ambassador: SharedAmbassador<T> = Arc::new(Mutex::new(ambassador));
        let queue = Arc::new(CallbackQueue::new());
        let delivery = match model {
            CallbackModel::Evoked => None,
            CallbackModel::Immediate => {
                let poll = rti.config().immediate_poll_interval();
                let queue = Arc::clone(&queue);
                let ambassador = Arc::clone(&ambassador);
                let handle = std::thread::Builder::new()
                    .name("hrti-delivery".into())
                    .spawn(move || {
                        log::debug!("[rtiamb] delivery thread started");
                        while !queue.is_closed() {
                            if let Some(callback) = queue.pop_wait(poll) {
                                dispatch(&ambassador, callback);
                            }
                        }
                        log::debug!("[rtiamb] delivery thread stopped");
                    })
                    .map_err(|e| RtiError::RtiInternalError(format!("delivery thread: {}", e)))?;
                Some(handle)
            }
        };
        Ok(Self {
            rti,
            ambassador,
            queue,
            membership: Mutex::new(None),
            delivery,
        })
    }

    /// Federation and handle of the joined federate.
    fn joined(&self) -> Result<(Arc<Federation<T>>, FederateHandle)> {
        self.membership
            .lock()
            .as_ref()
            .map(|m| (Arc::clone(&m.federation), m.federate))
            .ok_or(RtiError::FederateNotExecutionMember)
    }

    /// Run a mutating operation on the joined federation.
    fn transact<R>(
        &self,
        op: impl FnOnce(&mut FederationState<T>, FederateHandle, &mut Outbox<T>) -> Result<R>,
    ) -> Result<R> {
        let (federation, federate) = self.joined()?;
        federation.transact(|state, out| op(state, federate, out))
    }

    /// Run a query on the joined federation.
    fn read<R>(&self, op: impl FnOnce(&FederationState<T>, FederateHandle) -> Result<R>) -> Result<R> {
        let (federation, federate) = self.joined()?;
        federation.read(|state| op(state, federate))
    }

    /// Handle of the joined federate.
    pub fn federate_handle(&self) -> Result<FederateHandle> {
        self.joined().map(|(_, federate)| federate)
    }

    /// Name of the joined federation execution.
    pub fn federation_name(&self) -> Result<String> {
        self.joined().map(|(federation, _)| federation.name().to_string())
    }

    /// Observable ownership state of one attribute.
    pub fn ownership_state(
        &self,
        object: ObjectInstanceHandle,
        attribute: AttributeHandle,
    ) -> Result<OwnershipState> {
        self.read(|s, me| s.ownership_state(me, object, attribute))
    }

    /// Whether the federate is waiting for a grant.
    pub fn time_advance_state(&self) -> Result<TimeAdvanceState<T>> {
        self.read(|s, me| s.time_advance_state(me))
    }

    /// Minimum LOTS over every regulating federate, this one included.
    pub fn federation_galt(&self) -> Result<Option<T>> {
        self.read(|s, me| s.federation_galt(me))
    }

    /// Save/restore state of the joined federation.
    pub fn save_restore_state(&self) -> Result<SaveRestoreState> {
        self.read(|s, _| Ok(s.save_restore_state()))
    }

    // ========================================================================
    // Callback delivery
    // ========================================================================

    /// Deliver at most one callback, waiting up to `timeout` for one.
    ///
    /// Returns `true` when a callback was delivered.
    pub fn evoke_callback(&self, timeout: Duration) -> Result<bool> {
        match self.queue.pop_wait(timeout) {
            Some(callback) => {
                dispatch(&self.ambassador, callback);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Deliver callbacks for at least `min` and at most `max`, stopping
    /// early once `min` has passed and the queue is empty.
    ///
    /// Returns `true` when callbacks are still pending.
    pub fn evoke_multiple_callbacks(&self, min: Duration, max: Duration) -> Result<bool> {
        let start = Instant::now();
        let min_deadline = start + min;
        let max_deadline = start + max.max(min);
        loop {
            let now = Instant::now();
            if now >= max_deadline {
                break;
            }
            let wait = min_deadline.saturating_duration_since(now);
            match self.queue.pop_wait(wait) {
                Some(callback) => dispatch(&self.ambassador, callback),
                None if Instant::now() >= min_deadline => break,
                None => {}
            }
        }
        Ok(!self.queue.is_empty())
    }

    pub fn enable_callbacks(&self) {
        self.queue.set_enabled(true);
    }

    pub fn disable_callbacks(&self) {
        self.queue.set_enabled(false);
    }

    /// Take up to `max` queued callbacks without dispatching them, e.g. to
    /// forward them to a remote federate.
    pub fn drain_callbacks(&self, max: usize) -> Vec<Callback<T>> {
        self.queue.drain(max)
    }

    /// Install a hook called whenever a callback is queued.
    pub fn set_callback_waker(&self, waker: Option<QueueWaker>) {
        self.queue.set_waker(waker);
    }

    pub fn pending_callbacks(&self) -> usize {
        self.queue.len()
    }
}

impl<T: LogicalTime> Drop for RtiAmbassador<T> {
    fn drop(&mut self) {
        self.queue.close();
        if let Some(handle) = self.delivery.take() {
            if handle.join().is_err() {
                log::warn!("[rtiamb] delivery thread panicked");
            }
        }
    }
}

fn dispatch<T: LogicalTime>(ambassador: &SharedAmbassador<T>, callback: Callback<T>) {
    let name = callback.name();
    let mut ambassador = ambassador.lock();
    if let Err(e) = callback.dispatch(&mut **ambassador) {
        log::warn!("[rtiamb] {} failed: {}", name, e);
    }
}
