use anyhow::bail;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name of a capability to look up in the container registry (e.g. `ftp`).
///
/// No format validation is performed beyond non-emptiness at the CLI edge;
/// the registry either knows the name or it does not.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityName(pub String);

/// Name of a feature bundle that provisions capabilities (e.g. `camel-ftp`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureName(pub String);

/// Which registry lookup a verification performs.
///
/// The set is closed: the registry exposes exactly three lookup paths, so
/// unknown kind strings are rejected at parse time instead of being carried
/// through as opaque values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CapabilityKind {
    Component,
    DataFormat,
    Language,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Component => "component",
            CapabilityKind::DataFormat => "data-format",
            CapabilityKind::Language => "language",
        }
    }
}

impl TryFrom<&str> for CapabilityKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "component" => Ok(CapabilityKind::Component),
            "data-format" => Ok(CapabilityKind::DataFormat),
            "language" => Ok(CapabilityKind::Language),
            other => bail!("unknown capability kind: {other}"),
        }
    }
}

impl Serialize for CapabilityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CapabilityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::try_from(value.as_str()).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
/// Compact result of a successful registry lookup.
///
/// Resolved capabilities denormalize the owning feature out of the snapshot
/// entry so verification records remain self-describing after the snapshot
/// has moved on.
pub struct ResolvedCapability {
    pub kind: CapabilityKind,
    pub name: CapabilityName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureName>,
}
