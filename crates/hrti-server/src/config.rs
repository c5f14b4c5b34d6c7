// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTI server configuration.

use hrti::{ObjectModel, ResignAction, RtiConfig};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use thiserror::Error;

/// A federation execution created when the server starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationSeed {
    pub name: String,
    pub model: ObjectModel,
}

/// RTI server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0)
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// TCP port to listen on (default: 8989)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum number of connected federates
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Maximum frame size (bytes)
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Callbacks pushed per wake-up of a connection
    #[serde(default = "default_callback_batch_size")]
    pub callback_batch_size: usize,

    /// Resign action applied when a joined client disconnects
    #[serde(default)]
    pub disconnect_action: ResignAction,

    /// Settings of the hosted RTI
    #[serde(default)]
    pub rti: RtiConfig,

    /// Federation executions created at start-up
    #[serde(default)]
    pub federations: Vec<FederationSeed>,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8989
}

fn default_max_connections() -> usize {
    256
}

fn default_max_message_size() -> usize {
    4 * 1024 * 1024 // 4 MB
}

fn default_callback_batch_size() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_connections: default_max_connections(),
            max_message_size: default_max_message_size(),
            callback_batch_size: default_callback_batch_size(),
            disconnect_action: ResignAction::default(),
            rti: RtiConfig::default(),
            federations: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port cannot be 0".into()));
        }
        self.validate_limits()
    }

    /// Everything but the port, which an already bound listener supplies.
    pub(crate) fn validate_limits(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections cannot be 0".into()));
        }
        if self.max_message_size < 64 {
            return Err(ConfigError::InvalidValue(
                "max_message_size must be at least 64 bytes".into(),
            ));
        }
        if self.callback_batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "callback_batch_size cannot be 0".into(),
            ));
        }
        for (i, seed) in self.federations.iter().enumerate() {
            if seed.name.is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "federations[{}] has an empty name",
                    i
                )));
            }
            if self.federations[..i].iter().any(|s| s.name == seed.name) {
                return Err(ConfigError::InvalidValue(format!(
                    "federation '{}' declared twice",
                    seed.name
                )));
            }
        }
        self.rti
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrti::{AttributeDef, ObjectClassDef};

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8989);
        assert_eq!(config.disconnect_action, ResignAction::CancelThenDeleteThenDivest);
        assert!(config.federations.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ServerConfig = serde_json::from_str(
            r#"{
                "port": 9000,
                "disconnect_action": "NoAction",
                "rti": {"strict_name_reservation": true},
                "federations": [
                    {"name": "city", "model": {"name": "Traffic"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.disconnect_action, ResignAction::NoAction);
        assert!(config.rti.strict_name_reservation);
        assert_eq!(config.callback_batch_size, 64);
        assert_eq!(config.federations[0].name, "city");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.validate_limits().is_ok());

        let config = ServerConfig {
            callback_batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let seed = FederationSeed {
            name: "twice".into(),
            model: ObjectModel::new("M"),
        };
        let config = ServerConfig {
            federations: vec![seed.clone(), seed],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let mut config = ServerConfig::default();
        config.rti.max_saved_snapshots = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");
        let config = ServerConfig {
            port: 9100,
            federations: vec![FederationSeed {
                name: "city".into(),
                model: ObjectModel::new("Traffic").with_object_class(
                    ObjectClassDef::new("Car").with_attribute(AttributeDef::new("Speed")),
                ),
            }],
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        let loaded = ServerConfig::from_file(&path).unwrap();
        assert_eq!(loaded.port, 9100);
        assert_eq!(loaded.federations, config.federations);

        assert!(matches!(
            ServerConfig::from_file(&dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
