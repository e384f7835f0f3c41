//! Registry acquisition seam.
//!
//! The verifier never holds on to a registry handle: every attempt asks the
//! source for a fresh snapshot, so a container that is still starting up
//! simply produces transient failures until it settles. Keeping the seam a
//! trait lets the test suite substitute sources that fail a fixed number of
//! times before succeeding.

use crate::registry::snapshot::{RegistrySnapshot, load_snapshot_from_path};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Produces a fresh registry handle for each verification attempt.
///
/// Implementations may fail transiently (file not written yet, container
/// still activating); the verifier treats any `open` failure as retryable.
pub trait RegistrySource {
    fn open(&self) -> Result<RegistrySnapshot>;
}

/// Registry source backed by a snapshot file the container rewrites as it
/// provisions features.
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistrySource for SnapshotFile {
    fn open(&self) -> Result<RegistrySnapshot> {
        load_snapshot_from_path(&self.path)
            .with_context(|| format!("opening registry snapshot {}", self.path.display()))
    }
}
