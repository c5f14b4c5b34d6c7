// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Federation save and restore.
//!
//! The members of a cycle are fixed when it starts. A cycle is decided only
//! once every member has reported; a single failure fails it for everyone.
//! A successful save keeps an in-memory snapshot of the registry, object,
//! time and region state, and a restore rolls those back to it.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::ddm::RegionStore;
use super::object::ObjectStore;
use super::registry::Registry;
use super::time::TimeManager;
use super::{FederationState, Outbox};
use crate::callback::Callback;
use crate::error::{Result, RtiError};
use crate::handle::FederateHandle;
use crate::time::LogicalTime;
use crate::types::{RestoreFailureReason, RestoreStatus, SaveFailureReason, SaveStatus};

/// Federation-wide save/restore state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveRestoreState {
    #[default]
    Idle,
    /// Timed save waiting for members to reach the save time.
    SaveRequested,
    Saving,
    SaveComplete,
    SaveFailed,
    RestoreRequested,
    Restoring,
    RestoreComplete,
    RestoreFailed,
}

impl SaveRestoreState {
    pub fn is_saving(self) -> bool {
        matches!(self, Self::SaveRequested | Self::Saving)
    }

    pub fn is_restoring(self) -> bool {
        matches!(self, Self::RestoreRequested | Self::Restoring)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Snapshot<T: LogicalTime> {
    label: String,
    registry: Registry,
    objects: ObjectStore,
    time: TimeManager<T>,
    ddm: RegionStore,
}

#[derive(Debug)]
pub(crate) struct SaveCoordinator<T: LogicalTime> {
    state: SaveRestoreState,
    label: String,
    save_time: Option<T>,
    save_status: BTreeMap<FederateHandle, SaveStatus>,
    restore_status: BTreeMap<FederateHandle, RestoreStatus>,
    failed: bool,
    snapshots: VecDeque<Snapshot<T>>,
}

impl<T: LogicalTime> Default for SaveCoordinator<T> {
    fn default() -> Self {
        Self {
            state: SaveRestoreState::Idle,
            label: String::new(),
            save_time: None,
            save_status: BTreeMap::new(),
            restore_status: BTreeMap::new(),
            failed: false,
            snapshots: VecDeque::new(),
        }
    }
}

impl<T: LogicalTime> SaveCoordinator<T> {
    pub(crate) fn state(&self) -> SaveRestoreState {
        self.state
    }

    /// Error a federate gets for an ordinary operation, if it is blocked.
    pub(crate) fn blocks(&self, federate: FederateHandle) -> Option<RtiError> {
        if self.state.is_restoring() {
            return Some(RtiError::RestoreInProgress);
        }
        let instructed = self
            .save_status
            .get(&federate)
            .is_some_and(|s| *s != SaveStatus::NoSaveInProgress);
        (self.state.is_saving() && instructed).then_some(RtiError::SaveInProgress)
    }

    /// Error for starting a new cycle (or joining) while one runs.
    pub(crate) fn check_idle(&self) -> Result<()> {
        if self.state.is_saving() {
            return Err(RtiError::SaveInProgress);
        }
        if self.state.is_restoring() {
            return Err(RtiError::RestoreInProgress);
        }
        Ok(())
    }

    fn keep(&mut self, snapshot: Snapshot<T>, limit: usize) {
        self.snapshots.retain(|s| s.label != snapshot.label);
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > limit {
            self.snapshots.pop_front();
        }
    }

    fn snapshot(&self, label: &str) -> Option<&Snapshot<T>> {
        self.snapshots.iter().rev().find(|s| s.label == label)
    }

    fn fail_save(&mut self, reason: SaveFailureReason, out: &mut Outbox<T>) {
        for member in self.save_status.keys() {
            out.push(*member, Callback::FederationNotSaved { reason });
        }
        log::info!("[save] '{}' failed: {:?}", self.label, reason);
        self.save_status.clear();
        self.save_time = None;
        self.state = SaveRestoreState::SaveFailed;
    }

    fn fail_restore(&mut self, reason: RestoreFailureReason, out: &mut Outbox<T>) {
        for member in self.restore_status.keys() {
            out.push(*member, Callback::FederationNotRestored { reason });
        }
        log::info!("[save] restore '{}' failed: {:?}", self.label, reason);
        self.restore_status.clear();
        self.state = SaveRestoreState::RestoreFailed;
    }

    fn instruct(&mut self, federate: FederateHandle, out: &mut Outbox<T>) {
        self.save_status
            .insert(federate, SaveStatus::FederateInstructedToSave);
        out.push(
            federate,
            Callback::InitiateFederateSave {
                label: self.label.clone(),
                time: self.save_time,
            },
        );
    }

    /// Instruct members of a timed save whose time has reached the save time.
    pub(crate) fn instruct_due(&mut self, time: &TimeManager<T>, out: &mut Outbox<T>) {
        if self.state != SaveRestoreState::SaveRequested {
            return;
        }
        let Some(save_time) = self.save_time else {
            return;
        };
        let due: Vec<FederateHandle> = self
            .save_status
            .iter()
            .filter(|(f, s)| {
                **s == SaveStatus::NoSaveInProgress
                    && time.time_of(**f).is_some_and(|t| t >= save_time)
            })
            .map(|(f, _)| *f)
            .collect();
        for federate in due {
            self.instruct(federate, out);
        }
        if self
            .save_status
            .values()
            .all(|s| *s != SaveStatus::NoSaveInProgress)
        {
            self.state = SaveRestoreState::Saving;
        }
    }

    /// A member left: any cycle it took part in fails.
    pub(crate) fn on_resign(&mut self, federate: FederateHandle, out: &mut Outbox<T>) {
        if self.state.is_saving() && self.save_status.remove(&federate).is_some() {
            self.fail_save(SaveFailureReason::FederateResignedDuringSave, out);
        }
        if self.state.is_restoring() && self.restore_status.remove(&federate).is_some() {
            self.fail_restore(RestoreFailureReason::FederateResignedDuringRestore, out);
        }
    }
}

impl<T: LogicalTime> FederationState<T> {
    // ========================================================================
    // Save
    // ========================================================================

    pub(crate) fn request_federation_save(
        &mut self,
        federate: FederateHandle,
        label: &str,
        time: Option<T>,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_member(federate)?;
        self.save.check_idle()?;
        if let Some(t) = time {
            if !t.is_valid() {
                return Err(RtiError::InvalidLogicalTime(t.to_string()));
            }
            let own = self.time.time_of(federate).unwrap_or_else(T::initial);
            if t < own {
                return Err(RtiError::LogicalTimeAlreadyPassed(format!(
                    "{} (current time {})",
                    t, own
                )));
            }
        }

        let members = self.registry.members();
        self.save.label = label.to_string();
        self.save.save_time = time;
        self.save.failed = false;
        self.save.save_status = members
            .iter()
            .map(|f| (*f, SaveStatus::NoSaveInProgress))
            .collect();
        log::info!("[save] {:?} requested save '{}' at {:?}", federate, label, time);

        match time {
            None => {
                for member in &members {
                    self.save.instruct(*member, out);
                }
                self.save.state = SaveRestoreState::Saving;
            }
            Some(t) => {
                let honoured = members
                    .iter()
                    .all(|f| self.time.time_of(*f).map_or(true, |own| own <= t));
                self.save.state = SaveRestoreState::SaveRequested;
                if honoured {
                    self.save.instruct_due(&self.time, out);
                } else {
                    self.save
                        .fail_save(SaveFailureReason::SaveTimeCannotBeHonored, out);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn federate_save_begun(&mut self, federate: FederateHandle) -> Result<()> {
        self.check_member(federate)?;
        if !self.save.state.is_saving() {
            return Err(RtiError::SaveNotInitiated);
        }
        match self.save.save_status.get_mut(&federate) {
            Some(status) if *status == SaveStatus::FederateInstructedToSave => {
                *status = SaveStatus::FederateSaving;
                Ok(())
            }
            _ => Err(RtiError::SaveNotInitiated),
        }
    }

    pub(crate) fn federate_save_complete(
        &mut self,
        federate: FederateHandle,
        success: bool,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_member(federate)?;
        if !self.save.state.is_saving() {
            return Err(RtiError::SaveNotInitiated);
        }
        match self.save.save_status.get_mut(&federate) {
            Some(status) if *status == SaveStatus::FederateSaving => {
                *status = SaveStatus::FederateWaitingForFederationToSave;
            }
            _ => return Err(RtiError::FederateHasNotBegunSave),
        }
        if !success {
            self.save.failed = true;
        }

        let all_reported = self
            .save
            .save_status
            .values()
            .all(|s| *s == SaveStatus::FederateWaitingForFederationToSave);
        if !all_reported {
            return Ok(());
        }
        if self.save.failed {
            self.save
                .fail_save(SaveFailureReason::FederateReportedFailureDuringSave, out);
            return Ok(());
        }

        let snapshot = Snapshot {
            label: self.save.label.clone(),
            registry: self.registry.clone(),
            objects: self.objects.clone(),
            time: self.time.clone(),
            ddm: self.ddm.clone(),
        };
        self.save.keep(snapshot, self.config.max_saved_snapshots);
        for member in self.save.save_status.keys() {
            out.push(*member, Callback::FederationSaved);
        }
        log::info!("[save] federation saved as '{}'", self.save.label);
        self.save.save_status.clear();
        self.save.save_time = None;
        self.save.state = SaveRestoreState::SaveComplete;
        Ok(())
    }

    pub(crate) fn abort_federation_save(
        &mut self,
        federate: FederateHandle,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_member(federate)?;
        if !self.save.state.is_saving() {
            return Err(RtiError::SaveNotInProgress);
        }
        self.save.fail_save(SaveFailureReason::SaveAborted, out);
        Ok(())
    }

    pub(crate) fn query_federation_save_status(
        &self,
        federate: FederateHandle,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_member(federate)?;
        let statuses = self
            .registry
            .members()
            .into_iter()
            .map(|f| {
                let status = self
                    .save
                    .save_status
                    .get(&f)
                    .copied()
                    .unwrap_or(SaveStatus::NoSaveInProgress);
                (f, status)
            })
            .collect();
        out.push(federate, Callback::FederationSaveStatusResponse { statuses });
        Ok(())
    }

    // ========================================================================
    // Restore
    // ========================================================================

    pub(crate) fn request_federation_restore(
        &mut self,
        federate: FederateHandle,
        label: &str,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_member(federate)?;
        self.save.check_idle()?;
        let members = self.registry.members();
        let names: Option<Vec<(FederateHandle, String)>> = self
            .save
            .snapshot(label)
            .filter(|s| s.registry.members() == members)
            .map(|s| s.registry.records().map(|r| (r.handle, r.name.clone())).collect());
        let Some(names) = names else {
            out.push(
                federate,
                Callback::RequestFederationRestoreFailed {
                    label: label.to_string(),
                },
            );
            return Ok(());
        };

        self.save.state = SaveRestoreState::RestoreRequested;
        self.save.label = label.to_string();
        self.save.failed = false;
        out.push(
            federate,
            Callback::RequestFederationRestoreSucceeded {
                label: label.to_string(),
            },
        );
        for member in &members {
            out.push(*member, Callback::FederationRestoreBegun);
        }
        for (member, federate_name) in names {
            out.push(
                member,
                Callback::InitiateFederateRestore {
                    label: label.to_string(),
                    federate_name,
                    federate: member,
                },
            );
        }
        self.save.restore_status = members
            .iter()
            .map(|f| (*f, RestoreStatus::FederateRestoring))
            .collect();
        self.save.state = SaveRestoreState::Restoring;
        log::info!("[save] {:?} requested restore '{}'", federate, label);
        Ok(())
    }

    pub(crate) fn federate_restore_complete(
        &mut self,
        federate: FederateHandle,
        success: bool,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_member(federate)?;
        if !self.save.state.is_restoring() {
            return Err(RtiError::RestoreNotRequested);
        }
        match self.save.restore_status.get_mut(&federate) {
            Some(status) if *status == RestoreStatus::FederateRestoring => {
                *status = RestoreStatus::FederateWaitingForFederationToRestore;
            }
            _ => return Err(RtiError::RestoreNotRequested),
        }
        if !success {
            self.save.failed = true;
        }

        let all_reported = self
            .save
            .restore_status
            .values()
            .all(|s| *s == RestoreStatus::FederateWaitingForFederationToRestore);
        if !all_reported {
            return Ok(());
        }
        if self.save.failed {
            self.save
                .fail_restore(RestoreFailureReason::FederateReportedFailureDuringRestore, out);
            return Ok(());
        }

        let Some(snapshot) = self.save.snapshot(&self.save.label).cloned() else {
            self.save
                .fail_restore(RestoreFailureReason::RtiDetectedFailureDuringRestore, out);
            return Ok(());
        };
        self.registry.restore_from(&snapshot.registry);
        self.objects.restore_from(&snapshot.objects);
        self.time.restore_from(&snapshot.time);
        self.ddm.restore_from(&snapshot.ddm);
        for member in self.save.restore_status.keys() {
            out.push(*member, Callback::FederationRestored);
        }
        log::info!("[save] federation restored to '{}'", snapshot.label);
        self.save.restore_status.clear();
        self.save.state = SaveRestoreState::RestoreComplete;
        Ok(())
    }

    pub(crate) fn abort_federation_restore(
        &mut self,
        federate: FederateHandle,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_member(federate)?;
        if !self.save.state.is_restoring() {
            return Err(RtiError::RestoreNotInProgress);
        }
        self.save.fail_restore(RestoreFailureReason::RestoreAborted, out);
        Ok(())
    }

    pub(crate) fn query_federation_restore_status(
        &self,
        federate: FederateHandle,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_member(federate)?;
        let statuses = self
            .registry
            .members()
            .into_iter()
            .map(|f| {
                let status = self
                    .save
                    .restore_status
                    .get(&f)
                    .copied()
                    .unwrap_or(RestoreStatus::NoRestoreInProgress);
                (f, status)
            })
            .collect();
        out.push(federate, Callback::FederationRestoreStatusResponse { statuses });
        Ok(())
    }

    pub(crate) fn save_restore_state(&self) -> SaveRestoreState {
        self.save.state()
    }
}
