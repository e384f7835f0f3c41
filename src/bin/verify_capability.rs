//! Capability verification CLI backing `verify-capability`.
//!
//! Polls a registry snapshot file until the requested capability appears or
//! the deadline passes, then prints exactly one verification record on
//! stdout. Diagnostics go to stderr so the record stream stays parseable.
//!
//! Exit codes:
//! - 0: capability verified
//! - 1: invalid arguments
//! - 2: verification failed (a `failed` record is still printed)

use anyhow::{Context, Result, anyhow, bail};
use featureprobe::{
    CapabilityKind, CapabilityName, FeatureName, SnapshotFile, VerificationRecord, VerifyOptions,
    lookup_capability, poll_until,
};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse()?;
    let source = SnapshotFile::new(&cli.snapshot);
    let options = VerifyOptions::new(cli.timeout, cli.interval);

    let started = Instant::now();
    let mut attempts = 0u32;
    let outcome = poll_until(&options, || {
        attempts += 1;
        lookup_capability(&source, cli.kind, &cli.name)
    });
    let elapsed = started.elapsed();

    let mut record = match &outcome {
        Ok(capability) => VerificationRecord::verified(capability, attempts, elapsed),
        Err(err) => VerificationRecord::failed(cli.kind, &cli.name, attempts, elapsed, err),
    };
    if record.feature.is_none() {
        record.feature = cli.feature;
    }

    println!(
        "{}",
        serde_json::to_string(&record).context("serializing verification record")?
    );
    Ok(outcome.is_ok())
}

struct Cli {
    kind: CapabilityKind,
    name: CapabilityName,
    snapshot: PathBuf,
    timeout: Duration,
    interval: Duration,
    feature: Option<FeatureName>,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os();
        let _program = args.next();

        let mut kind: Option<CapabilityKind> = None;
        let mut name: Option<String> = None;
        let mut snapshot: Option<PathBuf> = None;
        let mut timeout_secs: Option<u64> = None;
        let mut interval_ms: Option<u64> = None;
        let mut feature: Option<String> = None;

        while let Some(arg) = args.next() {
            let arg_str = arg
                .to_str()
                .ok_or_else(|| anyhow!("invalid UTF-8 in argument"))?;
            match arg_str {
                "--kind" => {
                    let value = next_value("--kind", &mut args)?;
                    kind = Some(CapabilityKind::try_from(value.as_str())?);
                }
                "--name" => {
                    let value = next_value("--name", &mut args)?;
                    name = Some(normalize_token(value, "--name")?);
                }
                "--snapshot" => {
                    let value = next_value("--snapshot", &mut args)?;
                    snapshot = Some(PathBuf::from(value));
                }
                "--timeout-secs" => {
                    let value = next_value("--timeout-secs", &mut args)?;
                    timeout_secs =
                        Some(value.parse().context("--timeout-secs expects an integer")?);
                }
                "--interval-ms" => {
                    let value = next_value("--interval-ms", &mut args)?;
                    interval_ms =
                        Some(value.parse().context("--interval-ms expects an integer")?);
                }
                "--feature" => {
                    let value = next_value("--feature", &mut args)?;
                    feature = Some(normalize_token(value, "--feature")?);
                }
                "--help" | "-h" => usage(0),
                other => {
                    bail!("unknown argument: {other}");
                }
            }
        }

        let kind = kind.ok_or_else(|| anyhow!("--kind is required"))?;
        let name = name.ok_or_else(|| anyhow!("--name is required"))?;
        let snapshot = match snapshot {
            Some(path) => path,
            None => env::var_os("FEATUREPROBE_SNAPSHOT")
                .map(PathBuf::from)
                .ok_or_else(|| {
                    anyhow!("--snapshot is required (or set FEATUREPROBE_SNAPSHOT)")
                })?,
        };

        let timeout_secs = match timeout_secs {
            Some(value) => value,
            None => env_u64("FEATUREPROBE_TIMEOUT_SECS")?.unwrap_or(10),
        };
        let interval_ms = match interval_ms {
            Some(value) => value,
            None => env_u64("FEATUREPROBE_INTERVAL_MS")?.unwrap_or(1000),
        };

        Ok(Self {
            kind,
            name: CapabilityName(name),
            snapshot,
            // A zero timeout performs exactly one attempt before giving up.
            timeout: Duration::from_secs(timeout_secs),
            interval: Duration::from_millis(interval_ms),
            feature: feature.map(FeatureName),
        })
    }
}

fn env_u64(var: &str) -> Result<Option<u64>> {
    match env::var(var) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse()
                .with_context(|| format!("{var} expects an integer, got '{raw}'"))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

fn next_value(flag: &str, args: &mut env::ArgsOs) -> Result<String> {
    let value = args
        .next()
        .ok_or_else(|| anyhow!("{flag} requires a value"))?;
    value
        .into_string()
        .map_err(|_| anyhow!("{flag} value must be valid UTF-8"))
}

fn normalize_token(raw: String, flag: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("{flag} value must not be empty");
    }
    Ok(trimmed.to_string())
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: verify-capability --kind <component|data-format|language> --name <id> [options]\n\nOptions:\n      --kind <kind>         Which registry lookup to perform.\n      --name <id>           Capability name to wait for.\n      --snapshot <path>     Registry snapshot file (or set FEATUREPROBE_SNAPSHOT).\n      --timeout-secs <n>    Deadline in seconds; 0 tries exactly once (default: 10).\n      --interval-ms <n>     Pause between attempts (default: 1000).\n      --feature <name>      Annotate the record with the feature under test.\n      --help                Show this help text.\n"
    );
    std::process::exit(code);
}
