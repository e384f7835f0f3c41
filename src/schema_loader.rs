//! Shared JSON Schema loading for the snapshot and record contracts.
//!
//! Keeps the two schema surfaces aligned: callers load a schema file, the
//! loader enforces the embedded `schema_version` const, and the compiled
//! validator stays alive alongside the source document it borrows from.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

const SCHEMA_VERSION_POINTER: &str = "/properties/schema_version/const";

/// Compiled contract schema plus the source document backing it.
#[derive(Debug)]
pub struct ContractSchema {
    pub schema_version: String,
    compiled: JSONSchema,
    // The compiled validator borrows from this document; field order keeps it
    // alive until the validator is dropped.
    _raw: Arc<Value>,
}

impl ContractSchema {
    /// Load and compile a schema file, enforcing the expected version const.
    pub fn load(path: &Path, expected_version: &str) -> Result<Self> {
        let value: Value = serde_json::from_reader(
            File::open(path).with_context(|| format!("opening schema {}", path.display()))?,
        )
        .with_context(|| format!("parsing schema {}", path.display()))?;

        let schema_version = value
            .pointer(SCHEMA_VERSION_POINTER)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow!("schema {} missing schema_version const", path.display())
            })?;
        if schema_version != expected_version {
            bail!(
                "schema {} declares version '{}', expected '{}'",
                path.display(),
                schema_version,
                expected_version
            );
        }

        let raw = Arc::new(value);
        let raw_static: &'static Value = unsafe { &*(Arc::as_ptr(&raw)) };
        let compiled = JSONSchema::compile(raw_static)
            .with_context(|| format!("compiling schema {}", path.display()))?;

        Ok(Self {
            schema_version,
            compiled,
            _raw: raw,
        })
    }

    /// Validate a document, joining every violation into one error.
    pub fn validate(&self, document: &Value) -> Result<()> {
        if let Err(errors) = self.compiled.validate(document) {
            let details = errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            bail!("document failed schema validation:\n{details}");
        }
        Ok(())
    }
}
