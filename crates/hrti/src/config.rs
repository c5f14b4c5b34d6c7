// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTI runtime configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RtiError};

/// Settings shared by every federation execution hosted by an [`crate::Rti`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtiConfig {
    /// Require `reserve_object_instance_name` before registering with a name
    #[serde(default)]
    pub strict_name_reservation: bool,

    /// Number of completed saves kept for restore (oldest dropped first)
    #[serde(default = "default_max_saved_snapshots")]
    pub max_saved_snapshots: usize,

    /// How long the immediate-delivery thread waits per poll (milliseconds)
    #[serde(default = "default_immediate_poll_interval_ms")]
    pub immediate_poll_interval_ms: u64,

    /// Prefix of RTI-generated object instance names
    #[serde(default = "default_object_name_prefix")]
    pub object_name_prefix: String,
}

fn default_max_saved_snapshots() -> usize {
    4
}

fn default_immediate_poll_interval_ms() -> u64 {
    50
}

fn default_object_name_prefix() -> String {
    "HLAobject_".to_string()
}

impl Default for RtiConfig {
    fn default() -> Self {
        Self {
            strict_name_reservation: false,
            max_saved_snapshots: default_max_saved_snapshots(),
            immediate_poll_interval_ms: default_immediate_poll_interval_ms(),
            object_name_prefix: default_object_name_prefix(),
        }
    }
}

impl RtiConfig {
    /// Poll interval of the immediate-delivery thread.
    pub fn immediate_poll_interval(&self) -> Duration {
        Duration::from_millis(self.immediate_poll_interval_ms)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_saved_snapshots == 0 {
            return Err(RtiError::InvalidConfiguration(
                "max_saved_snapshots must be > 0".into(),
            ));
        }
        if self.immediate_poll_interval_ms == 0 || self.immediate_poll_interval_ms > 60_000 {
            return Err(RtiError::InvalidConfiguration(
                "immediate_poll_interval_ms must be within 1..=60000".into(),
            ));
        }
        if self.object_name_prefix.is_empty() {
            return Err(RtiError::InvalidConfiguration(
                "object_name_prefix cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
