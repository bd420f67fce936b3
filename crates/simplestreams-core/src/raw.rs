//! Wire records as deserialized from JSON documents.
//!
//! Everything is optional here; [`crate::model`] validates and builds the tree.
//! Nested objects stay as `serde_json::Map` so document order survives and
//! errors can name the exact path that failed.

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct RawIndex {
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub updated: Option<String>,

    #[serde(default)]
    pub index: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIndexEntry {
    #[serde(default)]
    pub updated: Option<String>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub datatype: Option<String>,

    #[serde(default)]
    pub cloudname: Option<String>,

    #[serde(default)]
    pub clouds: Option<Vec<RawCloud>>,

    /// Products document path, relative to the base URL.
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub products: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCloud {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProducts {
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub content_id: Option<String>,

    #[serde(default)]
    pub datatype: Option<String>,

    #[serde(default)]
    pub updated: Option<String>,

    #[serde(default)]
    pub products: Map<String, Value>,

    #[serde(default, rename = "_aliases")]
    pub aliases: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub release: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub arch: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub versions: Map<String, Value>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawItemCollection {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub items: Map<String, Value>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}
