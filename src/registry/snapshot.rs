//! Deserializable representation of a container registry snapshot.
//!
//! The types mirror `schema/registry_snapshot.schema.json`: a container block
//! plus the components, data formats, and languages currently provisioned.
//! Loading is strict (schema validation, duplicate-name rejection) because a
//! malformed snapshot means the dump side is broken; lookups are forgiving
//! because absence only means "not provisioned yet".

use crate::registry::identity::{CapabilityKind, CapabilityName, FeatureName, ResolvedCapability};
use crate::schema_loader::ContractSchema;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Schema version every snapshot must declare.
pub const SNAPSHOT_SCHEMA_VERSION: &str = "registry_snapshot_v1";

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Registry state as dumped by the container at a point in time.
pub struct RegistrySnapshot {
    pub schema_version: String,
    pub container: ContainerInfo,
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
    #[serde(default)]
    pub data_formats: Vec<DataFormatEntry>,
    #[serde(default)]
    pub languages: Vec<LanguageEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Identity and readiness of the container that produced the snapshot.
///
/// A snapshot with `ready: false` parses fine; the container dumps registry
/// state while bundles are still activating, and lookups against such a
/// snapshot fail as a retryable condition.
pub struct ContainerInfo {
    pub name: String,
    pub ready: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// A component registered under a name, optionally attributed to a feature.
pub struct ComponentEntry {
    pub name: CapabilityName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureName>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// A data format definition.
///
/// A definition is *registered* as soon as the entry exists, but only
/// *resolvable* once a resolver is bound. The two states are distinct on the
/// wire because the container registers definitions before the backing
/// factory finishes activating.
pub struct DataFormatEntry {
    pub name: CapabilityName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// A scripting/expression language registered under a name.
pub struct LanguageEntry {
    pub name: CapabilityName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureName>,
}

impl RegistrySnapshot {
    /// Look up a component by name.
    pub fn component(&self, name: &CapabilityName) -> Option<&ComponentEntry> {
        self.components.iter().find(|entry| &entry.name == name)
    }

    /// Look up a data format definition by name.
    ///
    /// This is only the first half of a data-format verification; callers
    /// resolve the definition with [`DataFormatEntry::resolve`].
    pub fn data_format_definition(&self, name: &CapabilityName) -> Option<&DataFormatEntry> {
        self.data_formats.iter().find(|entry| &entry.name == name)
    }

    /// Look up a language by name.
    pub fn language(&self, name: &CapabilityName) -> Option<&LanguageEntry> {
        self.languages.iter().find(|entry| &entry.name == name)
    }

    /// Fails while the container is still activating bundles.
    pub fn require_ready(&self) -> Result<()> {
        if !self.container.ready {
            bail!("container '{}' is not ready", self.container.name);
        }
        Ok(())
    }
}

impl ComponentEntry {
    /// Compact lookup result for this entry.
    pub fn resolved(&self) -> ResolvedCapability {
        ResolvedCapability {
            kind: CapabilityKind::Component,
            name: self.name.clone(),
            feature: self.feature.clone(),
        }
    }
}

impl DataFormatEntry {
    /// Second half of a data-format lookup: bind the definition against the
    /// snapshot that produced it.
    ///
    /// Returns `None` until a resolver is bound or while the container is not
    /// ready, mirroring a definition that exists but cannot yet produce a
    /// working data format.
    pub fn resolve(&self, snapshot: &RegistrySnapshot) -> Option<ResolvedCapability> {
        if !snapshot.container.ready {
            return None;
        }
        self.resolver.as_ref()?;
        Some(ResolvedCapability {
            kind: CapabilityKind::DataFormat,
            name: self.name.clone(),
            feature: self.feature.clone(),
        })
    }
}

impl LanguageEntry {
    /// Compact lookup result for this entry.
    pub fn resolved(&self) -> ResolvedCapability {
        ResolvedCapability {
            kind: CapabilityKind::Language,
            name: self.name.clone(),
            feature: self.feature.clone(),
        }
    }
}

/// Read, schema-validate, and parse a registry snapshot from disk.
///
/// Validation failures here are hard errors rather than retryable lookups:
/// the file existed and was readable, so a shape problem means the producer
/// and this crate disagree about the contract.
pub fn load_snapshot_from_path(path: &Path) -> Result<RegistrySnapshot> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;

    let schema = ContractSchema::load(
        &crate::default_snapshot_schema_path(),
        SNAPSHOT_SCHEMA_VERSION,
    )?;
    schema
        .validate(&value)
        .with_context(|| format!("snapshot {} failed schema validation", path.display()))?;

    let snapshot: RegistrySnapshot = serde_json::from_value(value)
        .with_context(|| format!("decoding snapshot {}", path.display()))?;
    if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
        bail!(
            "snapshot {} declares schema_version '{}', expected '{}'",
            path.display(),
            snapshot.schema_version,
            SNAPSHOT_SCHEMA_VERSION
        );
    }
    validate_entries(&snapshot)?;
    Ok(snapshot)
}

fn validate_entries(snapshot: &RegistrySnapshot) -> Result<()> {
    check_unique(
        "component",
        snapshot.components.iter().map(|entry| &entry.name),
    )?;
    check_unique(
        "data format",
        snapshot.data_formats.iter().map(|entry| &entry.name),
    )?;
    check_unique(
        "language",
        snapshot.languages.iter().map(|entry| &entry.name),
    )
}

fn check_unique<'a>(
    kind: &str,
    names: impl Iterator<Item = &'a CapabilityName>,
) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if name.0.trim().is_empty() {
            bail!("encountered {kind} entry with an empty name");
        }
        if !seen.insert(name) {
            bail!("duplicate {kind} entry '{}'", name.0);
        }
    }
    Ok(())
}
