//! Feature-name derivation from qualified test-class identifiers.
//!
//! Harness convention: integration tests are named `...Camel<Segments>Test`,
//! and the feature under test is the marker-delimited middle converted to
//! kebab-case (`CamelAhcWsTest` becomes `ahc-ws`). Extraction fails soft:
//! missing markers produce an empty string, never a panic, so callers that
//! need a hard failure check for emptiness at their own edge.

const START_MARKER: &str = "Camel";
const END_MARKER: &str = "Test";

/// Derive the feature name from a qualified identifier.
///
/// Takes the substring between the first `Camel` marker and the following
/// `Test` marker and kebab-cases it. Returns an empty string when either
/// marker is missing.
pub fn extract_feature_name(qualified: &str) -> String {
    let Some(start) = qualified.find(START_MARKER) else {
        return String::new();
    };
    let start = start + START_MARKER.len();
    let Some(length) = qualified[start..].find(END_MARKER) else {
        return String::new();
    };
    camel_to_kebab(&qualified[start..start + length])
}

/// Convert a camel-case segment to kebab-case.
///
/// A hyphen is inserted before every upper-case letter except the first
/// character; everything is lower-cased.
pub fn camel_to_kebab(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    for c in segment.chars() {
        if c.is_uppercase() && !out.is_empty() {
            out.push('-');
        }
        out.extend(c.to_lowercase());
    }
    out
}
