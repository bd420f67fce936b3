//! Cloud targets and lookup parameters.

use serde::{Deserialize, Serialize};

use crate::error::{StreamsError, StreamsResult};

/// A concrete deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CloudSpec {
    pub region: String,
    pub endpoint: String,
}

impl CloudSpec {
    pub fn new(region: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl std::fmt::Display for CloudSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.region, self.endpoint)
    }
}

/// Cloud attributes as they appear on catalog records.
///
/// Each field is independently optional: an absent field is inherited from the
/// enclosing record during denormalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl CloudFields {
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.endpoint.is_none()
    }

    /// Fill absent fields from `parent`. Present fields are never replaced.
    pub fn inherit(&mut self, parent: &CloudFields) {
        if self.region.is_none() {
            self.region = parent.region.clone();
        }
        if self.endpoint.is_none() {
            self.endpoint = parent.endpoint.clone();
        }
    }

    /// Overwrite with every field `other` defines.
    pub fn overlay(&mut self, other: &CloudFields) {
        if other.region.is_some() {
            self.region = other.region.clone();
        }
        if other.endpoint.is_some() {
            self.endpoint = other.endpoint.clone();
        }
    }

    /// Resolve to a concrete spec for the item named `item`.
    pub fn resolve(&self, item: &str) -> StreamsResult<CloudSpec> {
        let region = self
            .region
            .clone()
            .ok_or_else(|| StreamsError::IncompleteMetadata {
                item: item.to_string(),
                attribute: "region".to_string(),
            })?;
        let endpoint = self
            .endpoint
            .clone()
            .ok_or_else(|| StreamsError::IncompleteMetadata {
                item: item.to_string(),
                attribute: "endpoint".to_string(),
            })?;
        Ok(CloudSpec { region, endpoint })
    }
}

impl From<CloudSpec> for CloudFields {
    fn from(spec: CloudSpec) -> Self {
        Self {
            region: Some(spec.region),
            endpoint: Some(spec.endpoint),
        }
    }
}

/// Caller's search constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupParams {
    pub cloud: CloudSpec,
    pub series: String,
    /// Ordered preference list; earlier entries sort first in results.
    pub arches: Vec<String>,
    /// Content version to require, if any.
    pub version: Option<String>,
}

impl LookupParams {
    pub fn new(cloud: CloudSpec, series: impl Into<String>, arches: Vec<String>) -> Self {
        Self {
            cloud,
            series: series.into(),
            arches,
            version: None,
        }
    }

    /// Require a specific content version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Position of `arch` in the preference list.
    pub fn arch_rank(&self, arch: &str) -> Option<usize> {
        self.arches.iter().position(|a| a == arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(region: Option<&str>, endpoint: Option<&str>) -> CloudFields {
        CloudFields {
            region: region.map(String::from),
            endpoint: endpoint.map(String::from),
        }
    }

    #[test]
    fn test_inherit_is_per_field() {
        let mut child = fields(Some("us-east-1"), None);
        child.inherit(&fields(Some("au-east-1"), Some("https://somewhere")));
        assert_eq!(child, fields(Some("us-east-1"), Some("https://somewhere")));
    }

    #[test]
    fn test_overlay_replaces_defined_fields_only() {
        let mut target = fields(Some("a"), Some("https://a"));
        target.overlay(&fields(Some("b"), None));
        assert_eq!(target, fields(Some("b"), Some("https://a")));
    }

    #[test]
    fn test_resolve_reports_missing_attribute() {
        let err = fields(Some("us-east-1"), None).resolve("ami-1").unwrap_err();
        match err {
            StreamsError::IncompleteMetadata { item, attribute } => {
                assert_eq!(item, "ami-1");
                assert_eq!(attribute, "endpoint");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_arch_rank() {
        let params = LookupParams::new(
            CloudSpec::new("r", "e"),
            "precise",
            vec!["amd64".to_string(), "arm".to_string()],
        );
        assert_eq!(params.arch_rank("arm"), Some(1));
        assert_eq!(params.arch_rank("i386"), None);
    }
}
