//! Add-on fragment discovery.
//!
//! Fragments are read-only input files under the fragments directory, one
//! subdirectory per add-on:
//!
//! ```text
//! addons/
//!   postgresql/
//!     libs.versions.toml            # appended to the dependency catalog
//!     build.gradle                  # inserted at the dependencies anchor
//!     dependency-management.gradle  # inserted at the dependency-management anchor
//!     application.yaml              # appended to the runtime configuration
//!     migrations/V001__init.sql     # copied into the migrations directory
//!     unexclude.txt                 # auto-configuration classes to stop excluding
//! ```
//!
//! Every file is optional; an add-on ships only the kinds it needs. The
//! composer never writes into the fragments directory.

use crate::addon::AddonId;
use crate::error::{Result, SprigError};
use std::fs;
use std::path::Path;

/// Kinds of fragment an add-on may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    DependencyCatalog,
    BuildDescriptor,
    DependencyManagement,
    RuntimeConfig,
    MigrationScript,
    SourcePatch,
}

impl FragmentKind {
    /// File (or directory) name of this kind inside an add-on's directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            FragmentKind::DependencyCatalog => "libs.versions.toml",
            FragmentKind::BuildDescriptor => "build.gradle",
            FragmentKind::DependencyManagement => "dependency-management.gradle",
            FragmentKind::RuntimeConfig => "application.yaml",
            FragmentKind::MigrationScript => "migrations",
            FragmentKind::SourcePatch => "unexclude.txt",
        }
    }
}

/// All fragments shipped by one add-on.
#[derive(Debug, Clone, Default)]
pub struct AddonFragments {
    pub catalog: Option<String>,
    pub build_descriptor: Option<String>,
    pub dependency_management: Option<String>,
    pub runtime_config: Option<String>,
    /// Migration scripts as (filename, content). The filename's version
    /// prefix encodes ordering and must be preserved verbatim.
    pub migrations: Vec<(String, String)>,
    /// Fully-qualified auto-configuration classes the entry point should no
    /// longer exclude.
    pub unexclude: Vec<String>,
}

impl AddonFragments {
    /// Number of individual fragments carried, for reporting.
    pub fn count(&self) -> usize {
        usize::from(self.catalog.is_some())
            + usize::from(self.build_descriptor.is_some())
            + usize::from(self.dependency_management.is_some())
            + usize::from(self.runtime_config.is_some())
            + self.migrations.len()
            + usize::from(!self.unexclude.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_none()
            && self.build_descriptor.is_none()
            && self.dependency_management.is_none()
            && self.runtime_config.is_none()
            && self.migrations.is_empty()
            && self.unexclude.is_empty()
    }
}

/// Load the fragments for one add-on. A missing add-on directory yields an
/// empty set (the merge step reports it as skipped).
pub fn load_fragments(fragments_dir: &Path, addon: AddonId) -> Result<AddonFragments> {
    let addon_dir = fragments_dir.join(addon.as_str());
    if !addon_dir.is_dir() {
        return Ok(AddonFragments::default());
    }

    let mut fragments = AddonFragments {
        catalog: read_optional(&addon_dir, FragmentKind::DependencyCatalog)?,
        build_descriptor: read_optional(&addon_dir, FragmentKind::BuildDescriptor)?,
        dependency_management: read_optional(&addon_dir, FragmentKind::DependencyManagement)?,
        runtime_config: read_optional(&addon_dir, FragmentKind::RuntimeConfig)?,
        migrations: Vec::new(),
        unexclude: Vec::new(),
    };

    let migrations_dir = addon_dir.join(FragmentKind::MigrationScript.file_name());
    if migrations_dir.is_dir() {
        let mut entries: Vec<_> = fs::read_dir(&migrations_dir)
            .map_err(|e| read_error(&migrations_dir, e))?
            .collect::<std::io::Result<_>>()
            .map_err(|e| read_error(&migrations_dir, e))?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let content =
                fs::read_to_string(&path).map_err(|e| read_error(&path, e))?;
            fragments.migrations.push((name, content));
        }
    }

    if let Some(listing) = read_optional(&addon_dir, FragmentKind::SourcePatch)? {
        fragments.unexclude = listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
    }

    Ok(fragments)
}

fn read_optional(addon_dir: &Path, kind: FragmentKind) -> Result<Option<String>> {
    let path = addon_dir.join(kind.file_name());
    if !path.is_file() {
        return Ok(None);
    }
    fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| read_error(&path, e))
}

fn read_error(path: &Path, e: std::io::Error) -> SprigError {
    SprigError::User(format!("failed to read fragment '{}': {}", path.display(), e))
}
