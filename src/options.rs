//! Declarative startup options for the throwaway container.
//!
//! Nothing here talks to a container: the builders produce the option list as
//! plain data so the surrounding harness can hand it to whatever bootstrap
//! mechanism hosts the run. Values mirror the container configuration the
//! integration harness boots with: distribution coordinates, config file
//! replacements, the repository list, and the feature set to provision.

use crate::registry::FeatureName;
use anyhow::bail;
use serde::{Serialize, Serializer};

const CONTAINER_NAME: &str = "Apache Karaf";
const DEFAULT_CONTAINER_VERSION: &str = "2.3.3";
const UNPACK_DIR: &str = "target/container/unpack";

// Features provisioned before the feature under test; the container needs the
// core routing features up before any capability can register.
const BOOT_FEATURES: &[&str] = &["cxf-jaxb", "camel-core", "camel-spring"];

const REPOSITORY_LIST: &str = "http://repo1.maven.org/maven2@id=central, \
     http://svn.apache.org/repos/asf/servicemix/m2-repo@id=servicemix, \
     http://repository.springsource.com/maven/bundles/release@id=springsource.release, \
     http://repository.springsource.com/maven/bundles/external@id=springsource.external, \
     http://oss.sonatype.org/content/repositories/releases/@id=sonatype, \
     http://repository.apache.org/content/groups/snapshots-group@snapshots@noreleases@id=apache";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// Container log threshold.
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl TryFrom<&str> for LogLevel {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, anyhow::Error> {
        match value {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => bail!("unknown log level: {other}"),
        }
    }
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// Maven-style coordinates for a feature repository descriptor.
///
/// `version: None` leaves resolution to the provisioning host (rendered as an
/// empty version segment in the reference URL).
pub struct FeatureRepository {
    pub group: String,
    pub artifact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl FeatureRepository {
    /// Repository descriptor for the messaging framework's feature set.
    pub fn camel_features() -> Self {
        Self {
            group: "org.apache.camel.karaf".to_string(),
            artifact: "apache-camel".to_string(),
            version: None,
            kind: "xml".to_string(),
            classifier: Some("features".to_string()),
        }
    }

    /// Repository descriptor for the container's standard feature set.
    pub fn standard_features(version: &str) -> Self {
        Self {
            group: "org.apache.karaf.assemblies.features".to_string(),
            artifact: "standard".to_string(),
            version: Some(version.to_string()),
            kind: "xml/features".to_string(),
            classifier: None,
        }
    }

    /// Render the `mvn:` reference string the provisioning host consumes.
    pub fn url(&self) -> String {
        let mut url = format!(
            "mvn:{}/{}/{}/{}",
            self.group,
            self.artifact,
            self.version.as_deref().unwrap_or(""),
            self.kind
        );
        if let Some(classifier) = &self.classifier {
            url.push('/');
            url.push_str(classifier);
        }
        url
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "option", rename_all = "snake_case")]
/// One declarative startup option for the container.
pub enum ContainerOption {
    Distribution {
        framework_url: String,
        version: String,
        name: String,
        unpack_dir: String,
    },
    KeepRuntimeFolder,
    ReplaceConfigFile {
        target: String,
        source: String,
    },
    EditConfigProperty {
        file: String,
        key: String,
        value: String,
    },
    LogLevel {
        level: LogLevel,
    },
    ProvisionFeatures {
        repository: String,
        features: Vec<FeatureName>,
    },
}

#[derive(Clone, Debug)]
/// Knobs for building a provisioning plan.
pub struct ProvisionSpec {
    pub container_version: Option<String>,
    pub log_level: LogLevel,
    pub extra_features: Vec<FeatureName>,
}

impl Default for ProvisionSpec {
    fn default() -> Self {
        Self {
            container_version: None,
            // INFO is the floor: quieter levels hide the bundle activation
            // lines the harness greps when a run goes sideways.
            log_level: LogLevel::Info,
            extra_features: Vec::new(),
        }
    }
}

/// Build the full startup option list for verifying one feature.
///
/// The feature under test is provisioned as `camel-<feature>` after the boot
/// features; extra features from `spec` are appended last in the order
/// given.
pub fn provision_options(feature: &FeatureName, spec: &ProvisionSpec) -> Vec<ContainerOption> {
    let version = spec
        .container_version
        .as_deref()
        .unwrap_or(DEFAULT_CONTAINER_VERSION);

    let mut features: Vec<FeatureName> = BOOT_FEATURES
        .iter()
        .map(|name| FeatureName((*name).to_string()))
        .collect();
    features.push(FeatureName(format!("camel-{}", feature.0)));
    features.extend(spec.extra_features.iter().cloned());

    vec![
        ContainerOption::Distribution {
            framework_url: format!("mvn:org.apache.karaf/apache-karaf/{version}/tar.gz"),
            version: version.to_string(),
            name: CONTAINER_NAME.to_string(),
            unpack_dir: UNPACK_DIR.to_string(),
        },
        ContainerOption::KeepRuntimeFolder,
        ContainerOption::ReplaceConfigFile {
            target: "etc/config.properties".to_string(),
            source: "fixtures/container/config.properties".to_string(),
        },
        ContainerOption::ReplaceConfigFile {
            target: "etc/custom.properties".to_string(),
            source: "fixtures/container/custom.properties".to_string(),
        },
        ContainerOption::ReplaceConfigFile {
            target: "etc/jre.properties".to_string(),
            source: "fixtures/container/jre.properties".to_string(),
        },
        ContainerOption::EditConfigProperty {
            file: "etc/org.ops4j.pax.url.mvn.cfg".to_string(),
            key: "org.ops4j.pax.url.mvn.repositories".to_string(),
            value: REPOSITORY_LIST.to_string(),
        },
        ContainerOption::LogLevel {
            level: spec.log_level,
        },
        ContainerOption::ProvisionFeatures {
            repository: FeatureRepository::camel_features().url(),
            features,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_url_renders_all_segments() {
        let repo = FeatureRepository::standard_features("2.3.3");
        assert_eq!(
            repo.url(),
            "mvn:org.apache.karaf.assemblies.features/standard/2.3.3/xml/features"
        );
    }

    #[test]
    fn repository_url_leaves_version_to_the_host_when_absent() {
        let repo = FeatureRepository::camel_features();
        assert_eq!(
            repo.url(),
            "mvn:org.apache.camel.karaf/apache-camel//xml/features"
        );
    }

    #[test]
    fn provision_options_end_with_the_feature_under_test() {
        let options = provision_options(&FeatureName("ftp".into()), &ProvisionSpec::default());
        let Some(ContainerOption::ProvisionFeatures { features, .. }) = options.last() else {
            panic!("last option should provision features");
        };
        let names: Vec<&str> = features.iter().map(|f| f.0.as_str()).collect();
        assert_eq!(names, vec!["cxf-jaxb", "camel-core", "camel-spring", "camel-ftp"]);
    }

    #[test]
    fn provision_options_respect_the_spec() {
        let spec = ProvisionSpec {
            container_version: Some("2.4.0".to_string()),
            log_level: LogLevel::Debug,
            extra_features: vec![FeatureName("camel-blueprint".into())],
        };
        let options = provision_options(&FeatureName("ahc-ws".into()), &spec);

        let Some(ContainerOption::Distribution { version, .. }) = options.first() else {
            panic!("first option should be the distribution block");
        };
        assert_eq!(version, "2.4.0");

        assert!(options.iter().any(|option| matches!(
            option,
            ContainerOption::LogLevel { level: LogLevel::Debug }
        )));

        let Some(ContainerOption::ProvisionFeatures { features, .. }) = options.last() else {
            panic!("last option should provision features");
        };
        assert!(features.contains(&FeatureName("camel-ahc-ws".into())));
        assert_eq!(
            features.last(),
            Some(&FeatureName("camel-blueprint".into()))
        );
    }

    #[test]
    fn options_serialize_with_stable_tags() {
        let options = provision_options(&FeatureName("ftp".into()), &ProvisionSpec::default());
        let value = serde_json::to_value(&options).expect("serializes");
        assert_eq!(value[0]["option"], "distribution");
        assert_eq!(value[1]["option"], "keep_runtime_folder");
        assert_eq!(value[6]["option"], "log_level");
        assert_eq!(value[6]["level"], "info");
        assert_eq!(value[7]["option"], "provision_features");
    }
}
