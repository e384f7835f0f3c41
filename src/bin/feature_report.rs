//! Summarizes a verification-record stream.
//!
//! Reads NDJSON records from stdin (the output of repeated `verify-capability`
//! runs) and prints a JSON summary on stdout so CI pipelines can gate on the
//! failure count without parsing every record themselves.
//!
//! Exit codes:
//! - 0: every record verified
//! - 1: invalid arguments or an unreadable stream
//! - 2: at least one record failed

use anyhow::{Context, Result, bail};
use featureprobe::{read_verification_records, summarize};
use std::env;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(failed) if failed > 0 => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<usize> {
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                eprintln!("Usage: feature-report < records.ndjson");
                return Ok(0);
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    let stdin = io::stdin();
    let records =
        read_verification_records(stdin.lock()).context("reading verification records")?;
    if records.is_empty() {
        bail!("no verification records provided on stdin");
    }

    let summary = summarize(&records);
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serializing summary")?
    );
    Ok(summary.failed)
}
