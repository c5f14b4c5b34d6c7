// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::Arc;

use super::{Membership, RtiAmbassador};
use crate::error::{Result, RtiError};
use crate::fom::ObjectModel;
use crate::handle::{FederateHandle, FederateHandleSet};
use crate::rti::FederationExecutionInfo;
use crate::time::LogicalTime;
use crate::types::ResignAction;

/// Federation management services.
pub trait FederationManagement<T: LogicalTime> {
    fn create_federation_execution(&self, name: &str, model: &ObjectModel) -> Result<()>;

    fn destroy_federation_execution(&self, name: &str) -> Result<()>;

    fn list_federation_executions(&self) -> Vec<FederationExecutionInfo>;

    /// Join `federation`. Without a name one is generated.
    fn join_federation_execution(
        &self,
        federate_name: Option<&str>,
        federate_type: &str,
        federation: &str,
    ) -> Result<FederateHandle>;

    fn resign_federation_execution(&self, action: ResignAction) -> Result<()>;

    /// Register a point for `synchronization_set`, or for every member
    /// (present and future) when the set is `None` or empty.
    fn register_federation_synchronization_point(
        &self,
        label: &str,
        tag: &[u8],
        synchronization_set: Option<&FederateHandleSet>,
    ) -> Result<()>;

    fn synchronization_point_achieved(&self, label: &str, success: bool) -> Result<()>;

    /// Save now, or once every member reaches `time`.
    fn request_federation_save(&self, label: &str, time: Option<T>) -> Result<()>;

    fn federate_save_begun(&self) -> Result<()>;

    fn federate_save_complete(&self) -> Result<()>;

    fn federate_save_not_complete(&self) -> Result<()>;

    fn abort_federation_save(&self) -> Result<()>;

    fn query_federation_save_status(&self) -> Result<()>;

    fn request_federation_restore(&self, label: &str) -> Result<()>;

    fn federate_restore_complete(&self) -> Result<()>;

    fn federate_restore_not_complete(&self) -> Result<()>;

    fn abort_federation_restore(&self) -> Result<()>;

    fn query_federation_restore_status(&self) -> Result<()>;
}

impl<T: LogicalTime> FederationManagement<T> for RtiAmbassador<T> {
    fn create_federation_execution(&self, name: &str, model: &ObjectModel) -> Result<()> {
        self.rti.create_federation_execution(name, model)
    }

    fn destroy_federation_execution(&self, name: &str) -> Result<()> {
        self.rti.destroy_federation_execution(name)
    }

    fn list_federation_executions(&self) -> Vec<FederationExecutionInfo> {
        self.rti.list_federation_executions()
    }

    fn join_federation_execution(
        &self,
        federate_name: Option<&str>,
        federate_type: &str,
        federation: &str,
    ) -> Result<FederateHandle> {
        let mut membership = self.membership.lock();
        if membership.is_some() {
            return Err(RtiError::FederateAlreadyExecutionMember);
        }
        let execution = self.rti.federation(federation)?;
        let queue = Arc::clone(&self.queue);
        let federate = execution
            .transact(|state, out| state.join(federate_name, federate_type, queue, out))?;
        *membership = Some(Membership {
            federation: execution,
            federate,
        });
        Ok(federate)
    }

    fn resign_federation_execution(&self, action: ResignAction) -> Result<()> {
        let mut membership = self.membership.lock();
        let Some(current) = membership.as_ref() else {
            return Err(RtiError::FederateNotExecutionMember);
        };
        let federate = current.federate;
        current
            .federation
            .transact(|state, out| state.resign(federate, action, out))?;
        *membership = None;
        Ok(())
    }

    fn register_federation_synchronization_point(
        &self,
        label: &str,
        tag: &[u8],
        synchronization_set: Option<&FederateHandleSet>,
    ) -> Result<()> {
        self.transact(|s, me, out| {
            s.register_federation_synchronization_point(me, label, tag, synchronization_set, out)
        })
    }

    fn synchronization_point_achieved(&self, label: &str, success: bool) -> Result<()> {
        self.transact(|s, me, out| s.synchronization_point_achieved(me, label, success, out))
    }

    fn request_federation_save(&self, label: &str, time: Option<T>) -> Result<()> {
        self.transact(|s, me, out| s.request_federation_save(me, label, time, out))
    }

    fn federate_save_begun(&self) -> Result<()> {
        self.transact(|s, me, _| s.federate_save_begun(me))
    }

    fn federate_save_complete(&self) -> Result<()> {
        self.transact(|s, me, out| s.federate_save_complete(me, true, out))
    }

    fn federate_save_not_complete(&self) -> Result<()> {
        self.transact(|s, me, out| s.federate_save_complete(me, false, out))
    }

    fn abort_federation_save(&self) -> Result<()> {
        self.transact(|s, me, out| s.abort_federation_save(me, out))
    }

    fn query_federation_save_status(&self) -> Result<()> {
        self.transact(|s, me, out| s.query_federation_save_status(me, out))
    }

    fn request_federation_restore(&self, label: &str) -> Result<()> {
        self.transact(|s, me, out| s.request_federation_restore(me, label, out))
    }

    fn federate_restore_complete(&self) -> Result<()> {
        self.transact(|s, me, out| s.federate_restore_complete(me, true, out))
    }

    fn federate_restore_not_complete(&self) -> Result<()> {
        self.transact(|s, me, out| s.federate_restore_complete(me, false, out))
    }

    fn abort_federation_restore(&self) -> Result<()> {
        self.transact(|s, me, out| s.abort_federation_restore(me, out))
    }

    fn query_federation_restore_status(&self) -> Result<()> {
        self.transact(|s, me, out| s.query_federation_restore_status(me, out))
    }
}
