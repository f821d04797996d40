//! Add-on identifiers and selection validation.
//!
//! The add-on catalog is a closed set. A selection is an unordered,
//! deduplicated set of identifiers; fragments are always applied in the
//! declared order below, never in the order the user typed them.

use crate::error::{Result, SprigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An optional bundle of configuration/dependency/source fragments that can
/// be composed into a generated service.
///
/// The enum order is the application order during composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddonId {
    /// Servlet web stack; swaps the commons-core library for commons-web.
    Web,
    /// PostgreSQL datasource, migrations, and persistence auto-configuration.
    Postgresql,
    /// Redis cache client.
    Redis,
    /// RabbitMQ messaging.
    Rabbitmq,
    /// Reactive web stack.
    Webflux,
    /// Scheduled task support.
    Scheduling,
    /// Distributed scheduler locks (needs a PostgreSQL-backed lock table).
    Shedlock,
    /// OpenAPI documentation endpoint.
    Springdoc,
    /// Container-backed integration test dependencies.
    Testcontainers,
    /// Authentication/authorization starter.
    Security,
}

impl AddonId {
    /// All add-ons, in application order.
    pub const ALL: &'static [AddonId] = &[
        AddonId::Web,
        AddonId::Postgresql,
        AddonId::Redis,
        AddonId::Rabbitmq,
        AddonId::Webflux,
        AddonId::Scheduling,
        AddonId::Shedlock,
        AddonId::Springdoc,
        AddonId::Testcontainers,
        AddonId::Security,
    ];

    /// Parse an add-on identifier from its lowercase name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "web" => Some(Self::Web),
            "postgresql" => Some(Self::Postgresql),
            "redis" => Some(Self::Redis),
            "rabbitmq" => Some(Self::Rabbitmq),
            "webflux" => Some(Self::Webflux),
            "scheduling" => Some(Self::Scheduling),
            "shedlock" => Some(Self::Shedlock),
            "springdoc" => Some(Self::Springdoc),
            "testcontainers" => Some(Self::Testcontainers),
            "security" => Some(Self::Security),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Postgresql => "postgresql",
            Self::Redis => "redis",
            Self::Rabbitmq => "rabbitmq",
            Self::Webflux => "webflux",
            Self::Scheduling => "scheduling",
            Self::Shedlock => "shedlock",
            Self::Springdoc => "springdoc",
            Self::Testcontainers => "testcontainers",
            Self::Security => "security",
        }
    }

    /// One-line description for `sprig addons`.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Web => "servlet web stack (replaces commons-core with commons-web)",
            Self::Postgresql => "PostgreSQL datasource with Flyway migrations",
            Self::Redis => "Redis cache client",
            Self::Rabbitmq => "RabbitMQ messaging",
            Self::Webflux => "reactive web stack",
            Self::Scheduling => "scheduled task support",
            Self::Shedlock => "distributed scheduler locks (requires postgresql)",
            Self::Springdoc => "OpenAPI documentation endpoint",
            Self::Testcontainers => "container-backed integration test dependencies",
            Self::Security => "authentication/authorization starter",
        }
    }

    /// Add-ons that must be enabled alongside this one.
    pub fn requires(&self) -> &'static [AddonId] {
        match self {
            Self::Shedlock => &[AddonId::Postgresql],
            _ => &[],
        }
    }

    /// Whether this add-on brings up ephemeral infrastructure in the
    /// generated smoke test (database, cache, broker).
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Postgresql | Self::Redis | Self::Rabbitmq)
    }
}

impl fmt::Display for AddonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated set of enabled add-ons.
///
/// Iteration order is the declared application order regardless of how the
/// selection was entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonSelection {
    enabled: BTreeSet<AddonId>,
}

impl AddonSelection {
    /// Parse a raw list of identifiers. Duplicates collapse silently; an
    /// unknown identifier or a missing add-on requirement is a validation
    /// error.
    pub fn parse<S: AsRef<str>>(ids: &[S]) -> Result<Self> {
        let mut enabled = BTreeSet::new();
        for raw in ids {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let addon = AddonId::from_str(raw).ok_or_else(|| {
                SprigError::Validation(format!(
                    "unknown add-on '{}'. Known add-ons: {}",
                    raw,
                    AddonId::ALL
                        .iter()
                        .map(|a| a.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;
            enabled.insert(addon);
        }

        let selection = Self { enabled };
        selection.check_requirements()?;
        Ok(selection)
    }

    fn check_requirements(&self) -> Result<()> {
        for addon in &self.enabled {
            for required in addon.requires() {
                if !self.enabled.contains(required) {
                    return Err(SprigError::Validation(format!(
                        "add-on '{}' requires '{}' to be enabled as well",
                        addon, required
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, addon: AddonId) -> bool {
        self.enabled.contains(&addon)
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Enabled add-ons in application order.
    pub fn iter(&self) -> impl Iterator<Item = AddonId> + '_ {
        self.enabled.iter().copied()
    }

    /// The enabled infrastructure subset, in application order.
    pub fn infrastructure(&self) -> Vec<AddonId> {
        self.iter().filter(|a| a.is_infrastructure()).collect()
    }
}
