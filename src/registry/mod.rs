//! Container registry model and acquisition.
//!
//! This module wraps the registry snapshots the container dumps as it
//! provisions features. Types mirror `schema/registry_snapshot.schema.json`;
//! the verifier obtains snapshots through [`RegistrySource`] so a fresh
//! handle backs every polling attempt.

pub mod identity;
pub mod snapshot;
pub mod source;

pub use identity::{CapabilityKind, CapabilityName, FeatureName, ResolvedCapability};
pub use snapshot::{
    ComponentEntry, ContainerInfo, DataFormatEntry, LanguageEntry, RegistrySnapshot,
    SNAPSHOT_SCHEMA_VERSION, load_snapshot_from_path,
};
pub use source::{RegistrySource, SnapshotFile};
