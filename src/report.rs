//! Verification records emitted by the harness.
//!
//! Shared between `verify-capability` and `feature-report`. One record is
//! printed per verification; the structures mirror
//! `schema/verification_record.schema.json` so consumers can round-trip the
//! NDJSON stream without ad-hoc JSON handling.

use crate::registry::{CapabilityKind, CapabilityName, FeatureName, ResolvedCapability};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::BufRead;
use std::time::Duration;

/// Schema version stamped on every record.
pub const RECORD_SCHEMA_VERSION: &str = "fpvr-v1";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// Final state of one verification.
pub enum Outcome {
    Verified,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Verified => "verified",
            Outcome::Failed => "failed",
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            "verified" => Ok(Outcome::Verified),
            "failed" => Ok(Outcome::Failed),
            other => Err(serde::de::Error::custom(format!(
                "unknown verification outcome: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// One capability verification, success or failure.
///
/// Failed records keep the capability identity the caller asked about plus
/// the final attempt's error text, so a report over a whole feature run can
/// name exactly what never appeared.
pub struct VerificationRecord {
    pub schema_version: String,
    pub kind: CapabilityKind,
    pub capability: CapabilityName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureName>,
    pub outcome: Outcome,
    pub attempts: u32,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationRecord {
    /// Record for a capability that was found.
    pub fn verified(capability: &ResolvedCapability, attempts: u32, elapsed: Duration) -> Self {
        Self {
            schema_version: RECORD_SCHEMA_VERSION.to_string(),
            kind: capability.kind,
            capability: capability.name.clone(),
            feature: capability.feature.clone(),
            outcome: Outcome::Verified,
            attempts,
            elapsed_ms: elapsed.as_millis() as u64,
            error: None,
        }
    }

    /// Record for a verification that exhausted its deadline.
    pub fn failed(
        kind: CapabilityKind,
        name: &CapabilityName,
        attempts: u32,
        elapsed: Duration,
        error: &anyhow::Error,
    ) -> Self {
        Self {
            schema_version: RECORD_SCHEMA_VERSION.to_string(),
            kind,
            capability: name.clone(),
            feature: None,
            outcome: Outcome::Failed,
            attempts,
            elapsed_ms: elapsed.as_millis() as u64,
            error: Some(format!("{error:#}")),
        }
    }
}

/// Errors that can occur while reading NDJSON record streams.
#[derive(Debug)]
pub enum RecordReadError {
    Io(std::io::Error),
    Parse {
        line: usize,
        error: serde_json::Error,
    },
}

impl fmt::Display for RecordReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordReadError::Io(err) => write!(f, "failed to read NDJSON stream: {err}"),
            RecordReadError::Parse { line, error } => {
                write!(f, "line {line}: unable to parse verification record ({error})")
            }
        }
    }
}

impl std::error::Error for RecordReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordReadError::Io(err) => Some(err),
            RecordReadError::Parse { error, .. } => Some(error),
        }
    }
}

/// Read verification records from an NDJSON stream.
///
/// Lines containing only whitespace are skipped. Errors include the 1-based
/// line number where parsing failed to simplify diagnostics for callers.
pub fn read_verification_records<R: BufRead>(
    reader: R,
) -> Result<Vec<VerificationRecord>, RecordReadError> {
    let mut records = Vec::new();
    let mut line_buf = String::new();
    let mut reader = reader;
    let mut line_number = 0usize;

    loop {
        line_buf.clear();
        let bytes = reader
            .read_line(&mut line_buf)
            .map_err(RecordReadError::Io)?;
        if bytes == 0 {
            break;
        }
        line_number += 1;
        let trimmed = line_buf.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<VerificationRecord>(trimmed).map_err(|error| {
            RecordReadError::Parse {
                line: line_number,
                error,
            }
        })?;
        records.push(record);
    }

    Ok(records)
}

#[derive(Debug, Clone, Serialize)]
/// Aggregate view over a record stream.
pub struct RecordSummary {
    pub total: usize,
    pub verified: usize,
    pub failed: usize,
    pub failed_capabilities: Vec<String>,
}

/// Count outcomes and collect the capabilities that never appeared.
///
/// Failed entries are reported as `kind:name` in stream order so a report
/// stays readable when one feature contributes several capabilities.
pub fn summarize(records: &[VerificationRecord]) -> RecordSummary {
    let mut verified = 0usize;
    let mut failed_capabilities = Vec::new();
    for record in records {
        match record.outcome {
            Outcome::Verified => verified += 1,
            Outcome::Failed => failed_capabilities.push(format!(
                "{}:{}",
                record.kind.as_str(),
                record.capability.0
            )),
        }
    }
    RecordSummary {
        total: records.len(),
        verified,
        failed: failed_capabilities.len(),
        failed_capabilities,
    }
}
