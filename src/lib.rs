//! Shared library for the featureprobe harness.
//!
//! featureprobe verifies that a container has finished provisioning named
//! capabilities (components, data formats, and languages) by polling
//! registry snapshots with a bounded retry loop. The crate exposes the
//! registry model, the verifier, the verification-record surface the
//! reporting binaries consume, and the declarative provisioning options used
//! to boot a throwaway container. Public functions here form the contract the
//! helper binaries depend on.

use std::path::PathBuf;

pub mod naming;
pub mod options;
pub mod registry;
pub mod report;
mod schema_loader;
pub mod verify;

pub use naming::{camel_to_kebab, extract_feature_name};
pub use options::{
    ContainerOption, FeatureRepository, LogLevel, ProvisionSpec, provision_options,
};
pub use registry::{
    CapabilityKind, CapabilityName, ComponentEntry, ContainerInfo, DataFormatEntry, FeatureName,
    LanguageEntry, RegistrySnapshot, RegistrySource, ResolvedCapability, SNAPSHOT_SCHEMA_VERSION,
    SnapshotFile, load_snapshot_from_path,
};
pub use report::{
    Outcome, RECORD_SCHEMA_VERSION, RecordReadError, RecordSummary, VerificationRecord,
    read_verification_records, summarize,
};
pub use schema_loader::ContractSchema;
pub use verify::{
    DEFAULT_INTERVAL, DEFAULT_TIMEOUT, Verification, VerifyOptions, lookup_capability,
    poll_until, verify,
};

/// Returns the registry snapshot schema bundled with the crate.
pub fn default_snapshot_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schema/registry_snapshot.schema.json")
}

/// Returns the verification-record schema bundled with the crate.
pub fn default_record_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schema/verification_record.schema.json")
}

/// Split comma- or whitespace-delimited configuration lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
