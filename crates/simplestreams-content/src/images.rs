//! Machine image metadata (`image-ids`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use simplestreams::{CloudFields, Item, LookupConstraint, LookupParams, StreamsResult};

use crate::series::series_version;

/// Index data type for image metadata.
pub const IMAGE_DATA_TYPE: &str = "image-ids";

/// Stream published without a product id qualifier.
pub const RELEASED_STREAM: &str = "released";

/// One machine image in one cloud region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Provider image id, e.g. `ami-442ea674`.
    #[serde(default)]
    pub id: String,

    /// Root storage type, e.g. `ebs`.
    #[serde(default, rename = "root_store")]
    pub storage: String,

    /// Virtualisation type, e.g. `pv` or `hvm`.
    #[serde(default, rename = "virt")]
    pub virt_type: String,

    #[serde(flatten)]
    pub cloud: CloudFields,

    /// Any other item attributes, including alias references.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Item for ImageMetadata {
    fn id(&self) -> &str {
        &self.id
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
}

/// Lookup of images for a series, cloud and architectures.
#[derive(Debug, Clone)]
pub struct ImageConstraint {
    params: LookupParams,
    stream: String,
}

impl ImageConstraint {
    pub fn new(params: LookupParams) -> Self {
        Self {
            params,
            stream: RELEASED_STREAM.to_string(),
        }
    }

    /// Select a non-default stream such as `daily`.
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = stream.into();
        self
    }

    fn product_prefix(&self) -> String {
        if self.stream.is_empty() || self.stream == RELEASED_STREAM {
            "com.ubuntu.cloud".to_string()
        } else {
            format!("com.ubuntu.cloud.{}", self.stream)
        }
    }
}

impl LookupConstraint for ImageConstraint {
    fn data_type(&self) -> &str {
        IMAGE_DATA_TYPE
    }

    fn params(&self) -> &LookupParams {
        &self.params
    }

    fn product_ids(&self) -> StreamsResult<Vec<String>> {
        let version = series_version(&self.params.series)?;
        let prefix = self.product_prefix();
        Ok(self
            .params
            .arches
            .iter()
            .map(|arch| format!("{prefix}:server:{version}:{arch}"))
            .collect())
    }
}
