// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Federation synchronization points.

use std::collections::BTreeMap;

use super::{FederationState, Outbox};
use crate::callback::Callback;
use crate::error::{Result, RtiError};
use crate::handle::{FederateHandle, FederateHandleSet};
use crate::time::LogicalTime;
use crate::types::{SynchronizationPointFailureReason, UserTag};

#[derive(Debug, Clone)]
struct SyncPoint {
    tag: UserTag,
    /// Announced to every member, including late joiners.
    federation_wide: bool,
    announced: FederateHandleSet,
    pending: FederateHandleSet,
    failed: FederateHandleSet,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SyncPoints {
    points: BTreeMap<String, SyncPoint>,
}

impl SyncPoints {
    fn complete_ready<T>(&mut self, out: &mut Outbox<T>) {
        let done: Vec<String> = self
            .points
            .iter()
            .filter(|(_, p)| p.pending.is_empty())
            .map(|(label, _)| label.clone())
            .collect();
        for label in done {
            let Some(point) = self.points.remove(&label) else {
                continue;
            };
            for member in &point.announced {
                out.push(
                    *member,
                    Callback::FederationSynchronized {
                        label: label.clone(),
                        failed: point.failed.clone(),
                    },
                );
            }
            log::debug!("[sync] '{}' synchronized ({} failed)", label, point.failed.len());
        }
    }

    /// Announce federation-wide points to a new member.
    pub(crate) fn on_join<T>(&mut self, federate: FederateHandle, out: &mut Outbox<T>) {
        for (label, point) in &mut self.points {
            if !point.federation_wide {
                continue;
            }
            point.announced.insert(federate);
            point.pending.insert(federate);
            out.push(
                federate,
                Callback::AnnounceSynchronizationPoint {
                    label: label.clone(),
                    tag: point.tag.clone(),
                },
            );
        }
    }

    /// Drop a resigning member; points it was the last one pending on complete.
    pub(crate) fn on_resign<T>(&mut self, federate: FederateHandle, out: &mut Outbox<T>) {
        for point in self.points.values_mut() {
            point.announced.remove(&federate);
            point.pending.remove(&federate);
            point.failed.remove(&federate);
        }
        self.complete_ready(out);
    }
}

impl<T: LogicalTime> FederationState<T> {
    pub(crate) fn register_federation_synchronization_point(
        &mut self,
        federate: FederateHandle,
        label: &str,
        tag: &[u8],
        synchronization_set: Option<&FederateHandleSet>,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        let failure = if self.sync.points.contains_key(label) {
            Some(SynchronizationPointFailureReason::SynchronizationPointLabelNotUnique)
        } else if synchronization_set.is_some_and(|set| !set.iter().all(|f| self.registry.contains(*f))) {
            Some(SynchronizationPointFailureReason::SynchronizationSetMemberNotJoined)
        } else {
            None
        };
        if let Some(reason) = failure {
            out.push(
                federate,
                Callback::SynchronizationPointRegistrationFailed {
                    label: label.to_string(),
                    reason,
                },
            );
            return Ok(());
        }

        let (members, federation_wide) = match synchronization_set {
            Some(set) if !set.is_empty() => (set.clone(), false),
            _ => (self.registry.members(), true),
        };
        out.push(
            federate,
            Callback::SynchronizationPointRegistrationSucceeded {
                label: label.to_string(),
            },
        );
        for member in &members {
            out.push(
                *member,
                Callback::AnnounceSynchronizationPoint {
                    label: label.to_string(),
                    tag: tag.to_vec(),
                },
            );
        }
        log::debug!(
            "[sync] {:?} registered '{}' for {} federates",
            federate,
            label,
            members.len()
        );
        self.sync.points.insert(
            label.to_string(),
            SyncPoint {
                tag: tag.to_vec(),
                federation_wide,
                announced: members.clone(),
                pending: members,
                failed: FederateHandleSet::new(),
            },
        );
        Ok(())
    }

    pub(crate) fn synchronization_point_achieved(
        &mut self,
        federate: FederateHandle,
        label: &str,
        success: bool,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        let point = self
            .sync
            .points
            .get_mut(label)
            .filter(|p| p.pending.contains(&federate))
            .ok_or_else(|| RtiError::SynchronizationPointLabelNotAnnounced(label.to_string()))?;
        point.pending.remove(&federate);
        if !success {
            point.failed.insert(federate);
        }
        self.sync.complete_ready(out);
        Ok(())
    }
}
