//! Tools tarball metadata (`content-download`).
//!
//! Tools are cloud-agnostic: the catalog usually carries no region or
//! endpoint, so the requested cloud is supplied as the inheritance default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use simplestreams::{CloudFields, Item, LookupConstraint, LookupParams, StreamsResult};

use crate::series::series_version;

/// Index data type for tools metadata.
pub const TOOLS_DATA_TYPE: &str = "content-download";

/// One tools tarball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsMetadata {
    /// Key of the item in its collection.
    #[serde(skip)]
    pub key: String,

    #[serde(default)]
    pub release: String,

    /// Tools version, e.g. `1.13.0`.
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub arch: String,

    #[serde(default)]
    pub size: u64,

    /// Tarball path relative to the base URL.
    #[serde(default)]
    pub path: String,

    #[serde(default, rename = "ftype")]
    pub file_type: String,

    #[serde(default, rename = "sha256")]
    pub sha256: String,

    #[serde(flatten)]
    pub cloud: CloudFields,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ToolsMetadata {
    /// `<version>-<series>-<arch>`, e.g. `1.13.0-precise-amd64`.
    pub fn binary_version(&self) -> String {
        format!("{}-{}-{}", self.version, self.release, self.arch)
    }
}

impl Item for ToolsMetadata {
    fn set_key(&mut self, key: &str) {
        self.key = key.to_string();
    }

    fn id(&self) -> &str {
        &self.key
    }

    fn cloud(&self) -> &CloudFields {
        &self.cloud
    }

    fn cloud_mut(&mut self) -> &mut CloudFields {
        &mut self.cloud
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    fn version(&self) -> Option<&str> {
        (!self.version.is_empty()).then_some(self.version.as_str())
    }

    fn inherit_product(&mut self, series: &str, arch: &str) {
        if self.release.is_empty() {
            self.release = series.to_string();
        }
        if self.arch.is_empty() {
            self.arch = arch.to_string();
        }
    }
}

/// Lookup of tools for a series and architectures, optionally one version.
#[derive(Debug, Clone)]
pub struct ToolsConstraint {
    params: LookupParams,
}

impl ToolsConstraint {
    /// `version` of `None` matches any tools version.
    pub fn new(version: Option<&str>, params: LookupParams) -> Self {
        let params = match version {
            Some(v) => params.with_version(v),
            None => params,
        };
        Self { params }
    }
}

impl LookupConstraint for ToolsConstraint {
    fn data_type(&self) -> &str {
        TOOLS_DATA_TYPE
    }

    fn params(&self) -> &LookupParams {
        &self.params
    }

    fn product_ids(&self) -> StreamsResult<Vec<String>> {
        let version = series_version(&self.params.series)?;
        Ok(self
            .params
            .arches
            .iter()
            .map(|arch| format!("com.ubuntu.juju:{version}:{arch}"))
            .collect())
    }

    fn default_cloud(&self) -> Option<CloudFields> {
        Some(CloudFields::from(self.params.cloud.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplestreams::CloudSpec;

    fn params() -> LookupParams {
        LookupParams::new(
            CloudSpec::new("us-east-1", "https://ec2.us-east-1.amazonaws.com"),
            "precise",
            vec!["amd64".to_string()],
        )
    }

    #[test]
    fn test_product_ids() {
        let constraint = ToolsConstraint::new(Some("1.13.0"), params());
        assert_eq!(
            constraint.product_ids().unwrap(),
            vec!["com.ubuntu.juju:12.04:amd64"]
        );
        assert_eq!(constraint.params().version.as_deref(), Some("1.13.0"));
    }

    #[test]
    fn test_default_cloud_is_requested_cloud() {
        let constraint = ToolsConstraint::new(None, params());
        let defaults = constraint.default_cloud().unwrap();
        assert_eq!(defaults.region.as_deref(), Some("us-east-1"));
        assert_eq!(
            defaults.endpoint.as_deref(),
            Some("https://ec2.us-east-1.amazonaws.com")
        );
        assert_eq!(constraint.params().version, None);
    }

    #[test]
    fn test_inherits_series_and_arch() {
        let mut tools: ToolsMetadata = serde_json::from_str(
            r#"{"version": "1.13.0", "size": 2973595, "ftype": "tar.gz",
                "path": "tools/releases/juju-1.13.0-precise-amd64.tgz"}"#,
        )
        .unwrap();
        tools.set_key("1130preciseamd64");
        tools.inherit_product("precise", "amd64");

        assert_eq!(tools.id(), "1130preciseamd64");
        assert_eq!(tools.size, 2973595);
        assert_eq!(tools.file_type, "tar.gz");
        assert_eq!(tools.binary_version(), "1.13.0-precise-amd64");
    }

    #[test]
    fn test_explicit_release_kept() {
        let mut tools: ToolsMetadata =
            serde_json::from_str(r#"{"version": "1.13.0", "release": "raring", "arch": "arm"}"#)
                .unwrap();
        tools.inherit_product("precise", "amd64");
        assert_eq!(tools.binary_version(), "1.13.0-raring-arm");
    }
}
