use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};

pub const VERIFY_CAPABILITY_BIN: &str = env!("CARGO_BIN_EXE_verify-capability");
pub const EMIT_OPTIONS_BIN: &str = env!("CARGO_BIN_EXE_emit-options");
pub const FEATURE_NAME_BIN: &str = env!("CARGO_BIN_EXE_feature-name");
pub const FEATURE_REPORT_BIN: &str = env!("CARGO_BIN_EXE_feature-report");

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Run without checking the exit status, for tests that assert failure codes.
pub fn run_command_unchecked(mut cmd: Command) -> Result<Output> {
    cmd.output()
        .with_context(|| format!("failed to run command: {:?}", cmd))
}

pub fn write_snapshot(path: &Path, value: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("rendering snapshot fixture")?;
    std::fs::write(path, rendered)
        .with_context(|| format!("writing snapshot fixture {}", path.display()))
}
