//! Port registry for already-generated services.
//!
//! A plain YAML map from service name to port, kept next to the template
//! workspace. A missing registry file is an empty registry, not an error;
//! `sprig new` records the new service's port after a successful run.

use crate::error::{Result, SprigError};
use crate::fs::atomic_write_file;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Ports claimed by existing services.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PortRegistry {
    services: BTreeMap<String, u16>,
}

impl PortRegistry {
    /// Load the registry from `path`. A nonexistent file yields an empty
    /// registry; unreadable YAML is a user error (the file is hand-editable).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SprigError::User(format!(
                "failed to read port registry '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            SprigError::User(format!(
                "failed to parse port registry '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Persist the registry atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(&self.services).map_err(|e| {
            SprigError::User(format!("failed to serialize port registry: {}", e))
        })?;
        atomic_write_file(path, &yaml)
    }

    /// Name of the service holding `port`, if any.
    pub fn owner_of(&self, port: u16) -> Option<&str> {
        self.services
            .iter()
            .find(|(_, p)| **p == port)
            .map(|(name, _)| name.as_str())
    }

    pub fn register(&mut self, name: &str, port: u16) {
        self.services.insert(name.to_string(), port);
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }
}
