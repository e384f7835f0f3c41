//! Derives the feature name from a qualified test-class identifier.
//!
//! Prints the kebab-case feature name for identifiers following the
//! `...Camel<Segments>Test` convention. The library extractor fails soft with
//! an empty string; this binary turns that into a hard failure so shell
//! pipelines do not silently consume nothing.
//!
//! Exit codes:
//! - 0: name printed
//! - 1: invalid arguments
//! - 2: no feature name found in the input

use featureprobe::extract_feature_name;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut positional: Vec<String> = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            other if other.starts_with('-') => {
                eprintln!("feature-name: unrecognized flag {other}");
                return ExitCode::from(1);
            }
            other => positional.push(other.to_string()),
        }
    }

    let [qualified] = positional.as_slice() else {
        eprintln!("feature-name: expected exactly one qualified identifier");
        print_usage();
        return ExitCode::from(1);
    };

    let name = extract_feature_name(qualified);
    if name.is_empty() {
        eprintln!("feature-name: no feature name found in '{qualified}'");
        return ExitCode::from(2);
    }

    println!("{name}");
    ExitCode::SUCCESS
}

fn print_usage() {
    eprintln!(
        "Usage: feature-name <qualified-class>\n\nExample:\n  feature-name org.apache.camel.itest.karaf.CamelAhcWsTest  # prints ahc-ws"
    );
}
