// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The RTI: a process-wide registry of named federation executions.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::ambassador::FederateAmbassador;
use crate::config::RtiConfig;
use crate::error::{Result, RtiError};
use crate::federation::Federation;
use crate::fom::ObjectModel;
use crate::rtiamb::RtiAmbassador;
use crate::time::LogicalTime;
use crate::types::CallbackModel;

/// One entry of [`Rti::list_federation_executions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationExecutionInfo {
    pub name: String,
    pub federate_count: usize,
}

struct RtiInner<T: LogicalTime> {
    config: Arc<RtiConfig>,
    federations: DashMap<String, Arc<Federation<T>>>,
}

/// Hosts federation executions and hands out federate sessions.
///
/// Cheap to clone; clones share the same executions.
///
/// ```
/// use hrti::{
///     CallbackModel, FederationManagement, Float64Time, NullFederateAmbassador, ObjectModel,
///     Rti, RtiConfig,
/// };
///
/// let rti = Rti::<Float64Time>::new(RtiConfig::default()).unwrap();
/// rti.create_federation_execution("demo", &ObjectModel::new("Demo")).unwrap();
///
/// let amb = rti.connect(NullFederateAmbassador, CallbackModel::Evoked).unwrap();
/// amb.join_federation_execution(Some("alpha"), "example", "demo").unwrap();
/// ```
pub struct Rti<T: LogicalTime> {
    inner: Arc<RtiInner<T>>,
}

impl<T: LogicalTime> Clone for Rti<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: LogicalTime> Rti<T> {
    /// Create an RTI with a validated configuration.
    pub fn new(config: RtiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(RtiInner {
                config: Arc::new(config),
                federations: DashMap::new(),
            }),
        })
    }

    pub fn config(&self) -> &RtiConfig {
        &self.inner.config
    }

    /// Create a federation execution from an object model.
    ///
    /// # Errors
    ///
    /// `FederationExecutionAlreadyExists`, or `ErrorReadingFdd` when the
    /// object model is inconsistent.
    pub fn create_federation_execution(&self, name: &str, model: &ObjectModel) -> Result<()> {
        if name.is_empty() {
            return Err(RtiError::IllegalName(name.to_string()));
        }
        let catalog = model.resolve()?;
        match self.inner.federations.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RtiError::FederationExecutionAlreadyExists(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Federation::new(
                    name,
                    catalog,
                    Arc::clone(&self.inner.config),
                )));
                log::info!("[rti] created federation execution '{}'", name);
                Ok(())
            }
        }
    }

    /// Destroy an execution nobody is joined to.
    pub fn destroy_federation_execution(&self, name: &str) -> Result<()> {
        let federation = self.federation(name)?;
        self.retire(name, &federation)
    }

    /// Remove `federation` under `name`, leaving alone any execution created
    /// under the same name since `federation` was looked up.
    fn retire(&self, name: &str, federation: &Arc<Federation<T>>) -> Result<()> {
        federation.mark_destroyed()?;
        self.inner
            .federations
            .remove_if(name, |_, current| Arc::ptr_eq(current, federation));
        log::info!("[rti] destroyed federation execution '{}'", name);
        Ok(())
    }

    pub fn list_federation_executions(&self) -> Vec<FederationExecutionInfo> {
        let mut list: Vec<_> = self
            .inner
            .federations
            .iter()
            .map(|entry| FederationExecutionInfo {
                name: entry.key().clone(),
                federate_count: entry.value().member_count(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Open a federate session. The session is not joined yet.
    ///
    /// # Errors
    ///
    /// `RtiInternalError` if the delivery thread of an
    /// [`CallbackModel::Immediate`] session cannot be started.
    pub fn connect(
        &self,
        ambassador: impl FederateAmbassador<T> + 'static,
        model: CallbackModel,
    ) -> Result<RtiAmbassador<T>> {
        RtiAmbassador::new(self.clone(), Box::new(ambassador), model)
    }

    pub(crate) fn federation(&self, name: &str) -> Result<Arc<Federation<T>>> {
        self.inner
            .federations
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RtiError::FederationExecutionDoesNotExist(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Integer64Time;

    #[test]
    fn test_create_destroy() {
        let rti = Rti::<Integer64Time>::new(RtiConfig::default()).unwrap();
        let model = ObjectModel::new("M");
        rti.create_federation_execution("b", &model).unwrap();
        rti.create_federation_execution("a", &model).unwrap();
        assert_eq!(
            rti.create_federation_execution("a", &model),
            Err(RtiError::FederationExecutionAlreadyExists("a".into()))
        );
        let names: Vec<_> = rti
            .list_federation_executions()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);

        rti.destroy_federation_execution("a").unwrap();
        assert_eq!(
            rti.destroy_federation_execution("a"),
            Err(RtiError::FederationExecutionDoesNotExist("a".into()))
        );
    }

    #[test]
    fn test_stale_destroy_keeps_recreated_execution() {
        let rti = Rti::<Integer64Time>::new(RtiConfig::default()).unwrap();
        let model = ObjectModel::new("M");
        rti.create_federation_execution("a", &model).unwrap();
        let stale = rti.federation("a").unwrap();
        rti.destroy_federation_execution("a").unwrap();
        rti.create_federation_execution("a", &model).unwrap();

        assert_eq!(
            rti.retire("a", &stale),
            Err(RtiError::FederationExecutionDoesNotExist("a".into()))
        );
        assert_eq!(rti.list_federation_executions().len(), 1);
        let fresh = rti.federation("a").unwrap();
        assert!(!Arc::ptr_eq(&fresh, &stale));
        rti.destroy_federation_execution("a").unwrap();
        assert!(rti.list_federation_executions().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RtiConfig {
            max_saved_snapshots: 0,
            ..RtiConfig::default()
        };
        assert!(matches!(
            Rti::<Integer64Time>::new(config),
            Err(RtiError::InvalidConfiguration(_))
        ));
    }
}
