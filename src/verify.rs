//! Bounded-retry capability verification.
//!
//! The container provisions capabilities asynchronously and bundle activation
//! order is not guaranteed, so the verifier treats "registry not ready" and
//! "capability not registered yet" identically: both retry until the deadline.
//! Only the final attempt's failure is surfaced to the caller; intermediate
//! failures are expected noise while the container settles.

use crate::registry::{CapabilityKind, CapabilityName, RegistrySource, ResolvedCapability};
use anyhow::{Result, anyhow};
use std::thread;
use std::time::{Duration, Instant};

/// Default deadline for one verification.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default pause between attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug)]
/// Deadline and pacing for one verification.
pub struct VerifyOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl VerifyOptions {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

#[derive(Clone, Debug)]
/// Successful verification outcome.
pub struct Verification {
    pub capability: ResolvedCapability,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Retry `attempt` until it succeeds or the deadline passes.
///
/// The deadline is wall-clock based: a slow attempt consumes retry budget
/// rather than being preempted mid-attempt. Once the deadline has passed, the
/// failure from the final attempt is returned unchanged: callers see exactly
/// the error that occurred last, not a synthesized timeout.
pub fn poll_until<T>(
    options: &VerifyOptions,
    mut attempt: impl FnMut() -> Result<T>,
) -> Result<T> {
    let deadline = Instant::now() + options.timeout;
    loop {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if Instant::now() < deadline {
                    thread::sleep(options.interval);
                } else {
                    return Err(err);
                }
            }
        }
    }
}

/// Perform one kind-dispatched lookup against a fresh registry handle.
///
/// A data-format lookup is two steps: the definition must be registered and
/// it must resolve against the snapshot that produced it. Component and
/// language lookups are single-step.
pub fn lookup_capability(
    source: &dyn RegistrySource,
    kind: CapabilityKind,
    name: &CapabilityName,
) -> Result<ResolvedCapability> {
    let snapshot = source.open()?;
    snapshot.require_ready()?;
    match kind {
        CapabilityKind::Component => snapshot
            .component(name)
            .map(|entry| entry.resolved())
            .ok_or_else(|| anyhow!("no component registered under '{}'", name.0)),
        CapabilityKind::DataFormat => {
            let definition = snapshot.data_format_definition(name).ok_or_else(|| {
                anyhow!("no data format definition registered under '{}'", name.0)
            })?;
            definition
                .resolve(&snapshot)
                .ok_or_else(|| anyhow!("data format '{}' has no resolver bound yet", name.0))
        }
        CapabilityKind::Language => snapshot
            .language(name)
            .map(|entry| entry.resolved())
            .ok_or_else(|| anyhow!("no language registered under '{}'", name.0)),
    }
}

/// Verify that the container has provisioned `name` for the given kind.
///
/// Every attempt opens a fresh handle via `source`, so a source that fails
/// while the container starts up is tolerated. Returns immediately without
/// sleeping when the capability is already present; verification is
/// idempotent and safe to call repeatedly.
pub fn verify(
    source: &dyn RegistrySource,
    kind: CapabilityKind,
    name: &CapabilityName,
    options: &VerifyOptions,
) -> Result<Verification> {
    let started = Instant::now();
    let mut attempts = 0u32;
    let capability = poll_until(options, || {
        attempts += 1;
        lookup_capability(source, kind, name)
    })?;
    Ok(Verification {
        capability,
        attempts,
        elapsed: started.elapsed(),
    })
}
