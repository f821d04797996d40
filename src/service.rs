//! Service configuration model and validation.
//!
//! `ServiceConfig` is constructed exactly once, from validated raw input,
//! before any filesystem mutation. Every rejection names the offending field
//! and the reason so the caller can fix the invocation and rerun.

use crate::error::{Result, SprigError};
use crate::ports::PortRegistry;
use crate::template::TokenMap;
use regex::Regex;
use std::sync::LazyLock;

/// Pattern a service name must match.
pub const NAME_PATTERN: &str = "^[a-z][a-z0-9-]*-service$";

/// Lowest port a service may claim; everything below is privileged.
pub const MIN_PORT: u32 = 1024;
/// Highest valid TCP port.
pub const MAX_PORT: u32 = 65535;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(NAME_PATTERN).unwrap());
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[a-z][a-z0-9]*$").unwrap());
static DATABASE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[a-z][a-z0-9_]*$").unwrap());

/// Raw, unvalidated input for a new service.
#[derive(Debug, Clone)]
pub struct ServiceInput {
    /// Requested service name (e.g. `currency-service`).
    pub name: String,
    /// Business domain, a single lowercase word (e.g. `currency`).
    pub domain: String,
    /// Requested port. Held as u32 so out-of-range values can be rejected
    /// with a proper message instead of failing at parse time.
    pub port: u32,
    /// Database name, when the service owns one.
    pub database: Option<String>,
    /// Java toolchain version for the generated build.
    pub java_version: String,
    /// Version of the shared commons library.
    pub commons_version: String,
}

/// A validated, immutable service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub name: String,
    pub domain: String,
    /// PascalCase class name derived from the domain (e.g. `Currency`).
    pub class_name: String,
    pub port: u16,
    pub database: Option<String>,
    pub java_version: String,
    pub commons_version: String,
}

impl ServiceConfig {
    /// Validate raw input against the port registry and produce a config.
    ///
    /// Checks run in field order and stop at the first failure; no
    /// filesystem state is touched here or before here.
    pub fn validate(input: &ServiceInput, registry: &PortRegistry) -> Result<ServiceConfig> {
        let name = input.name.trim();
        if !NAME_RE.is_match(name) {
            return Err(SprigError::Validation(format!(
                "service name '{}' does not match {} (lowercase, dash-separated, '-service' suffix)",
                name, NAME_PATTERN
            )));
        }

        let domain = input.domain.trim();
        if !DOMAIN_RE.is_match(domain) {
            return Err(SprigError::Validation(format!(
                "domain '{}' must be a single lowercase alphanumeric word",
                domain
            )));
        }

        if input.port < MIN_PORT || input.port > MAX_PORT {
            return Err(SprigError::Validation(format!(
                "port {} is out of range ({}..={})",
                input.port, MIN_PORT, MAX_PORT
            )));
        }
        let port = input.port as u16;
        if let Some(owner) = registry.owner_of(port) {
            return Err(SprigError::Validation(format!(
                "port {} is already registered to '{}'. Pick a free port or remove the stale entry from the registry.",
                port, owner
            )));
        }

        let database = match &input.database {
            Some(db) => {
                let db = db.trim();
                if !DATABASE_RE.is_match(db) {
                    return Err(SprigError::Validation(format!(
                        "database name '{}' must be lowercase alphanumeric with underscores",
                        db
                    )));
                }
                Some(db.to_string())
            }
            None => None,
        };

        let java_version = input.java_version.trim();
        if java_version.is_empty() || !java_version.chars().all(|c| c.is_ascii_digit()) {
            return Err(SprigError::Validation(format!(
                "java version '{}' must be a plain major version number",
                input.java_version
            )));
        }

        let commons_version = input.commons_version.trim();
        if commons_version.is_empty() {
            return Err(SprigError::Validation(
                "commons library version must not be empty".to_string(),
            ));
        }

        Ok(ServiceConfig {
            name: name.to_string(),
            domain: domain.to_string(),
            class_name: pascal_case(domain),
            port,
            database,
            java_version: java_version.to_string(),
            commons_version: commons_version.to_string(),
        })
    }

    /// The placeholder tokens this service substitutes into the template.
    ///
    /// `[[database]]` is only declared when a database name was given, so a
    /// template that references it without one fails the totality check
    /// instead of silently receiving an empty value.
    pub fn token_map(&self) -> TokenMap {
        let mut tokens = TokenMap::new();
        tokens.insert("service-name", &self.name);
        tokens.insert("domain", &self.domain);
        tokens.insert("DomainClass", &self.class_name);
        tokens.insert("port", self.port.to_string());
        if let Some(db) = &self.database {
            tokens.insert("database", db);
        }
        tokens.insert("java-version", &self.java_version);
        tokens.insert("commons-version", &self.commons_version);
        tokens
    }
}

/// Derive a PascalCase class name from a lowercase domain word.
fn pascal_case(domain: &str) -> String {
    let mut chars = domain.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
