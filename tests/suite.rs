// Centralized integration suite for the featureprobe harness; exercises
// snapshot loading rules, the verifier's retry contract, record emission, and
// the helper binaries so changes surface in one place.
mod support;

use anyhow::{Context, Result, bail};
use featureprobe::{
    CapabilityKind, CapabilityName, ContractSchema, Outcome, RECORD_SCHEMA_VERSION,
    SNAPSHOT_SCHEMA_VERSION, SnapshotFile, VerificationRecord, VerifyOptions,
    default_record_schema_path, default_snapshot_schema_path, load_snapshot_from_path, verify,
};
use serde_json::{Value, json};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use support::{
    EMIT_OPTIONS_BIN, FEATURE_NAME_BIN, FEATURE_REPORT_BIN, VERIFY_CAPABILITY_BIN, run_command,
    run_command_unchecked, write_snapshot,
};
use tempfile::TempDir;

fn sample_snapshot() -> Value {
    json!({
        "schema_version": "registry_snapshot_v1",
        "container": {"name": "itest", "ready": true},
        "components": [
            {"name": "ftp", "feature": "camel-ftp"},
            {"name": "jms", "feature": "camel-jms"}
        ],
        "data_formats": [
            {"name": "zipfile", "feature": "camel-zipfile", "resolver": "zipfile-factory"},
            {"name": "syslog", "feature": "camel-syslog"}
        ],
        "languages": [
            {"name": "groovy", "feature": "camel-groovy"}
        ]
    })
}

fn parse_record(stdout: &[u8]) -> Result<(VerificationRecord, Value)> {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .context("no record on stdout")?;
    let value: Value = serde_json::from_str(line).context("record is not valid JSON")?;
    let record: VerificationRecord =
        serde_json::from_value(value.clone()).context("record does not match the model")?;
    Ok((record, value))
}

fn record_schema() -> Result<ContractSchema> {
    ContractSchema::load(&default_record_schema_path(), RECORD_SCHEMA_VERSION)
}

// Confirms the snapshot loader accepts the documented shape and exposes the
// three lookup paths.
#[test]
fn snapshot_file_round_trips_through_the_loader() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("registry.json");
    write_snapshot(&path, &sample_snapshot())?;

    let snapshot = load_snapshot_from_path(&path)?;
    assert_eq!(snapshot.schema_version, SNAPSHOT_SCHEMA_VERSION);
    assert!(snapshot.component(&CapabilityName("ftp".into())).is_some());
    assert!(
        snapshot
            .data_format_definition(&CapabilityName("zipfile".into()))
            .is_some()
    );
    assert!(
        snapshot
            .language(&CapabilityName("groovy".into()))
            .is_some()
    );
    Ok(())
}

#[test]
fn snapshot_loader_rejects_schema_violations() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("registry.json");
    // Missing the required container block.
    write_snapshot(
        &path,
        &json!({"schema_version": "registry_snapshot_v1", "components": []}),
    )?;

    let err = load_snapshot_from_path(&path).expect_err("shape violation should fail");
    assert!(
        format!("{err:#}").contains("schema validation"),
        "unexpected error: {err:#}"
    );
    Ok(())
}

#[test]
fn snapshot_loader_rejects_unknown_schema_versions() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("registry.json");
    let mut snapshot = sample_snapshot();
    snapshot["schema_version"] = json!("registry_snapshot_v2");
    write_snapshot(&path, &snapshot)?;

    assert!(load_snapshot_from_path(&path).is_err());
    Ok(())
}

#[test]
fn snapshot_loader_rejects_duplicate_entries() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("registry.json");
    write_snapshot(
        &path,
        &json!({
            "schema_version": "registry_snapshot_v1",
            "container": {"name": "itest", "ready": true},
            "languages": [{"name": "groovy"}, {"name": "groovy"}]
        }),
    )?;

    let err = load_snapshot_from_path(&path).expect_err("duplicates should fail");
    assert!(format!("{err:#}").contains("duplicate language entry 'groovy'"));
    Ok(())
}

// A snapshot file that appears while the verifier is polling must still lead
// to success; this is the normal startup sequence for the container.
#[test]
fn verifier_picks_up_a_late_appearing_snapshot() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("registry.json");
    let source = SnapshotFile::new(&path);

    let writer_path = path.clone();
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        write_snapshot(&writer_path, &sample_snapshot())
    });

    let options = VerifyOptions::new(Duration::from_secs(5), Duration::from_millis(20));
    let outcome = verify(
        &source,
        CapabilityKind::Component,
        &CapabilityName("ftp".into()),
        &options,
    )?;
    assert!(outcome.attempts >= 2, "first attempts should have failed");

    writer.join().expect("writer thread")?;
    Ok(())
}

#[test]
fn verify_capability_emits_a_schema_valid_record() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("registry.json");
    write_snapshot(&path, &sample_snapshot())?;

    let mut cmd = Command::new(VERIFY_CAPABILITY_BIN);
    cmd.arg("--kind")
        .arg("component")
        .arg("--name")
        .arg("ftp")
        .arg("--snapshot")
        .arg(&path)
        .arg("--timeout-secs")
        .arg("2")
        .arg("--interval-ms")
        .arg("50");
    let output = run_command(cmd)?;

    let (record, value) = parse_record(&output.stdout)?;
    record_schema()?.validate(&value)?;
    assert_eq!(record.outcome, Outcome::Verified);
    assert_eq!(record.attempts, 1);
    assert_eq!(record.capability.0, "ftp");
    assert_eq!(record.feature.as_ref().map(|f| f.0.as_str()), Some("camel-ftp"));
    assert!(record.error.is_none());
    Ok(())
}

#[test]
fn verify_capability_failure_still_prints_a_valid_record() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("registry.json");
    write_snapshot(&path, &sample_snapshot())?;

    let mut cmd = Command::new(VERIFY_CAPABILITY_BIN);
    cmd.arg("--kind")
        .arg("data-format")
        .arg("--name")
        .arg("syslog")
        .arg("--snapshot")
        .arg(&path)
        .arg("--timeout-secs")
        .arg("0");
    let output = run_command_unchecked(cmd)?;
    assert_eq!(output.status.code(), Some(2), "verification failure exits 2");

    let (record, value) = parse_record(&output.stdout)?;
    record_schema()?.validate(&value)?;
    assert_eq!(record.outcome, Outcome::Failed);
    assert_eq!(
        record.error.as_deref(),
        Some("data format 'syslog' has no resolver bound yet")
    );
    Ok(())
}

#[test]
fn verify_capability_reads_the_snapshot_path_from_the_environment() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("registry.json");
    write_snapshot(&path, &sample_snapshot())?;

    let mut cmd = Command::new(VERIFY_CAPABILITY_BIN);
    cmd.arg("--kind")
        .arg("language")
        .arg("--name")
        .arg("groovy")
        .env("FEATUREPROBE_SNAPSHOT", &path)
        .env("FEATUREPROBE_TIMEOUT_SECS", "2")
        .env("FEATUREPROBE_INTERVAL_MS", "50");
    let output = run_command(cmd)?;

    let (record, _) = parse_record(&output.stdout)?;
    assert_eq!(record.kind, CapabilityKind::Language);
    assert_eq!(record.outcome, Outcome::Verified);
    Ok(())
}

#[test]
fn verify_capability_rejects_unknown_kinds() -> Result<()> {
    let mut cmd = Command::new(VERIFY_CAPABILITY_BIN);
    cmd.arg("--kind").arg("processor").arg("--name").arg("ftp");
    let output = run_command_unchecked(cmd)?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown capability kind"));
    Ok(())
}

#[test]
fn emit_options_lists_the_provisioning_plan() -> Result<()> {
    let mut cmd = Command::new(EMIT_OPTIONS_BIN);
    cmd.arg("--feature")
        .arg("ftp")
        .arg("--container-version")
        .arg("2.4.0");
    let output = run_command(cmd)?;

    let options: Value = serde_json::from_slice(&output.stdout).context("options parse")?;
    let list = options.as_array().context("options are an array")?;
    assert_eq!(list[0]["option"], "distribution");
    assert_eq!(list[0]["version"], "2.4.0");

    let provision = list.last().context("non-empty option list")?;
    assert_eq!(provision["option"], "provision_features");
    let features: Vec<&str> = provision["features"]
        .as_array()
        .context("features array")?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(features.contains(&"camel-core"));
    assert!(features.contains(&"camel-ftp"));
    Ok(())
}

#[test]
fn emit_options_derives_the_feature_from_a_qualified_name() -> Result<()> {
    let mut cmd = Command::new(EMIT_OPTIONS_BIN);
    cmd.arg("--from-name")
        .arg("org.apache.camel.itest.karaf.CamelAhcWsTest");
    let output = run_command(cmd)?;

    let options: Value = serde_json::from_slice(&output.stdout).context("options parse")?;
    let rendered = options.to_string();
    assert!(rendered.contains("camel-ahc-ws"));
    Ok(())
}

#[test]
fn emit_options_refuses_underivable_names() -> Result<()> {
    let mut cmd = Command::new(EMIT_OPTIONS_BIN);
    cmd.arg("--from-name").arg("org.example.FtpSuite");
    let output = run_command_unchecked(cmd)?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unable to derive"));
    Ok(())
}

#[test]
fn feature_name_prints_the_kebab_case_name() -> Result<()> {
    let mut cmd = Command::new(FEATURE_NAME_BIN);
    cmd.arg("org.apache.camel.itest.karaf.CamelFtpTest");
    let output = run_command(cmd)?;
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ftp");
    Ok(())
}

#[test]
fn feature_name_fails_loudly_when_markers_are_missing() -> Result<()> {
    let mut cmd = Command::new(FEATURE_NAME_BIN);
    cmd.arg("org.example.FtpSuite");
    let output = run_command_unchecked(cmd)?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no feature name found"));
    Ok(())
}

#[test]
fn feature_report_summarizes_a_record_stream() -> Result<()> {
    let verified = serde_json::to_string(&json!({
        "schema_version": "fpvr-v1",
        "kind": "component",
        "capability": "ftp",
        "feature": "camel-ftp",
        "outcome": "verified",
        "attempts": 1,
        "elapsed_ms": 4
    }))?;
    let failed = serde_json::to_string(&json!({
        "schema_version": "fpvr-v1",
        "kind": "language",
        "capability": "groovy",
        "outcome": "failed",
        "attempts": 11,
        "elapsed_ms": 10032,
        "error": "no language registered under 'groovy'"
    }))?;
    let ndjson = format!("{verified}\n\n{failed}\n");

    let mut child = Command::new(FEATURE_REPORT_BIN)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("spawning feature-report")?;
    child
        .stdin
        .as_mut()
        .context("stdin handle")?
        .write_all(ndjson.as_bytes())?;
    let output = child.wait_with_output()?;

    assert_eq!(output.status.code(), Some(2), "failures gate the exit code");
    let summary: Value = serde_json::from_slice(&output.stdout).context("summary parse")?;
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["verified"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["failed_capabilities"][0], "language:groovy");
    Ok(())
}

#[test]
fn feature_report_rejects_an_empty_stream() -> Result<()> {
    let mut child = Command::new(FEATURE_REPORT_BIN)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("spawning feature-report")?;
    drop(child.stdin.take());
    let output = child.wait_with_output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no verification records"));
    Ok(())
}

// Guards the bundled contracts themselves: both schemas must load, and a
// record produced by the library must satisfy the record schema.
#[test]
fn bundled_schemas_compile_and_accept_library_output() -> Result<()> {
    ContractSchema::load(&default_snapshot_schema_path(), SNAPSHOT_SCHEMA_VERSION)?;
    let schema = record_schema()?;

    let dir = TempDir::new()?;
    let path = dir.path().join("registry.json");
    write_snapshot(&path, &sample_snapshot())?;
    let source = SnapshotFile::new(&path);
    let options = VerifyOptions::new(Duration::from_secs(2), Duration::from_millis(50));
    let outcome = verify(
        &source,
        CapabilityKind::DataFormat,
        &CapabilityName("zipfile".into()),
        &options,
    )?;

    let record =
        VerificationRecord::verified(&outcome.capability, outcome.attempts, outcome.elapsed);
    schema.validate(&serde_json::to_value(&record)?)?;
    Ok(())
}

// The snapshot schema must also reject what the loader rejects, so the two
// stay aligned.
#[test]
fn snapshot_schema_rejects_extra_keys() -> Result<()> {
    let schema = ContractSchema::load(&default_snapshot_schema_path(), SNAPSHOT_SCHEMA_VERSION)?;
    let mut snapshot = sample_snapshot();
    snapshot["bundles"] = json!([]);
    if schema.validate(&snapshot).is_ok() {
        bail!("unexpected key should fail schema validation");
    }
    Ok(())
}
