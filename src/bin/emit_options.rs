//! Prints the declarative container provisioning options for a feature.
//!
//! The output is a JSON array the surrounding harness feeds to its container
//! bootstrap; this binary never touches a container itself. The feature can
//! be named directly or derived from a qualified test-class identifier with
//! `--from-name`.

use anyhow::{Context, Result, anyhow, bail};
use featureprobe::{
    FeatureName, LogLevel, ProvisionSpec, extract_feature_name, provision_options, split_list,
};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let cli = Cli::parse()?;
    let options = provision_options(&cli.feature, &cli.spec);
    println!(
        "{}",
        serde_json::to_string_pretty(&options).context("serializing provisioning options")?
    );
    Ok(())
}

struct Cli {
    feature: FeatureName,
    spec: ProvisionSpec,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os();
        let _program = args.next();

        let mut feature: Option<String> = None;
        let mut from_name: Option<String> = None;
        let mut container_version: Option<String> = None;
        let mut log_level: Option<LogLevel> = None;
        let mut extra_features: Vec<FeatureName> = Vec::new();

        while let Some(arg) = args.next() {
            let arg_str = arg
                .to_str()
                .ok_or_else(|| anyhow!("invalid UTF-8 in argument"))?;
            match arg_str {
                "--feature" => {
                    let value = next_value("--feature", &mut args)?;
                    feature = Some(normalize_token(value, "--feature")?);
                }
                "--from-name" => {
                    let value = next_value("--from-name", &mut args)?;
                    from_name = Some(normalize_token(value, "--from-name")?);
                }
                "--container-version" => {
                    let value = next_value("--container-version", &mut args)?;
                    container_version = Some(normalize_token(value, "--container-version")?);
                }
                "--log-level" => {
                    let value = next_value("--log-level", &mut args)?;
                    log_level = Some(LogLevel::try_from(value.as_str())?);
                }
                "--features" => {
                    let value = next_value("--features", &mut args)?;
                    extra_features.extend(split_list(&value).into_iter().map(FeatureName));
                }
                "--help" | "-h" => usage(0),
                other => {
                    bail!("unknown argument: {other}");
                }
            }
        }

        let feature = match (feature, from_name) {
            (Some(name), None) => FeatureName(name),
            (None, Some(qualified)) => {
                let derived = extract_feature_name(&qualified);
                if derived.is_empty() {
                    bail!("unable to derive a feature name from '{qualified}'");
                }
                FeatureName(derived)
            }
            (Some(_), Some(_)) => bail!("specify exactly one of --feature or --from-name"),
            (None, None) => bail!("--feature or --from-name is required"),
        };

        let container_version = match container_version {
            Some(version) => Some(version),
            None => env::var("FEATUREPROBE_CONTAINER_VERSION").ok(),
        };

        let mut spec = ProvisionSpec::default();
        spec.container_version = container_version;
        if let Some(level) = log_level {
            spec.log_level = level;
        }
        spec.extra_features = extra_features;

        Ok(Self { feature, spec })
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
        "Usage: emit-options (--feature <name> | --from-name <qualified-class>) [options]\n\nOptions:\n      --feature <name>            Feature under test (provisioned as camel-<name>).\n      --from-name <qualified>     Derive the feature from a test-class identifier.\n      --container-version <v>     Container distribution version\n                                  (or set FEATUREPROBE_CONTAINER_VERSION).\n      --log-level <level>         Container log threshold (default: info).\n      --features <list>           Extra features to provision (comma/space separated).\n      --help                      Show this help text.\n"
    );
    std::process::exit(code);
}
