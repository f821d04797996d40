//! Tool configuration for sprig.
//!
//! This module defines the Config struct that represents `sprig.yaml` in the
//! workspace the operator runs sprig from. It supports forward-compatible
//! YAML parsing (unknown fields are ignored), sensible defaults for optional
//! fields, and validation of config values.

use crate::error::{Result, SprigError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default glob patterns excluded from placeholder substitution.
///
/// Version-control internals are never part of the tree, and wrapper jars /
/// images are binary anyway; excluding them by pattern skips the content
/// sniff entirely.
pub fn default_substitution_excludes() -> Vec<String> {
    vec![
        ".git/**".to_string(),
        "gradle/wrapper/**".to_string(),
        "**/*.jar".to_string(),
        "**/*.png".to_string(),
        "**/*.ico".to_string(),
    ]
}

fn default_fragments_dir() -> String {
    "addons".to_string()
}

fn default_port_registry() -> String {
    "ports.yaml".to_string()
}

fn default_java_version() -> String {
    "21".to_string()
}

fn default_commons_version() -> String {
    "1.0.0".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_true() -> bool {
    true
}

/// Configuration for sprig, loaded from `sprig.yaml`.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template repository to clone for each new service. A git URL or a
    /// local path. Required; there is no sensible default.
    pub template_repo: String,

    /// Directory holding per-add-on fragment files, relative to the config
    /// file (or absolute).
    #[serde(default = "default_fragments_dir")]
    pub fragments_dir: String,

    /// Path of the YAML port registry, relative to the config file (or
    /// absolute).
    #[serde(default = "default_port_registry")]
    pub port_registry: String,

    /// Glob patterns of template paths to skip during substitution.
    #[serde(default = "default_substitution_excludes")]
    pub substitution_excludes: Vec<String>,

    /// Default Java toolchain version for generated services.
    #[serde(default = "default_java_version")]
    pub java_version: String,

    /// Default version of the shared commons library.
    #[serde(default = "default_commons_version")]
    pub commons_version: String,

    /// Whether to `git init` and commit the composed tree.
    #[serde(default = "default_true")]
    pub git_auto_commit: bool,

    /// Initial branch name for the generated repository.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Commands run inside the composed tree after generation, in order
    /// (e.g. `"./gradlew spotlessApply"`). Each is split shell-style.
    #[serde(default)]
    pub post_compose: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_repo: String::new(),
            fragments_dir: default_fragments_dir(),
            port_registry: default_port_registry(),
            substitution_excludes: default_substitution_excludes(),
            java_version: default_java_version(),
            commons_version: default_commons_version(),
            git_auto_commit: true,
            default_branch: default_branch(),
            post_compose: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// A nonexistent file yields the defaults (the CLI can still supply
    /// `--template`); a present-but-invalid file is a user error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SprigError::User(format!("failed to read config '{}': {}", path.display(), e))
        })?;

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            SprigError::User(format!("failed to parse config '{}': {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| SprigError::User(format!("failed to serialize config: {}", e)))
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<()> {
        if self.fragments_dir.trim().is_empty() {
            return Err(SprigError::User(
                "config error: fragments_dir must not be empty".to_string(),
            ));
        }
        if self.port_registry.trim().is_empty() {
            return Err(SprigError::User(
                "config error: port_registry must not be empty".to_string(),
            ));
        }
        if self.default_branch.trim().is_empty() {
            return Err(SprigError::User(
                "config error: default_branch must not be empty".to_string(),
            ));
        }
        for pattern in &self.substitution_excludes {
            if globset::Glob::new(pattern).is_err() {
                return Err(SprigError::User(format!(
                    "config error: invalid exclude glob '{}'",
                    pattern
                )));
            }
        }
        Ok(())
    }
}
