//! Catalog data model.
//!
//! ```text
//! Index ──entries──▶ IndexEntry ──path──▶ ProductsCatalog
//!                                           ├── aliases: group → key → AliasTarget
//!                                           └── products: id → ProductCatalog
//!                                                 └── versions: key → ItemCollection
//!                                                       └── items: key → Item
//! ```
//!
//! Records are validated while being built from [`crate::raw`]; nothing here
//! applies aliases or inheritance (see [`crate::alias`] and [`crate::denormalize`]).

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::cloud::{CloudFields, CloudSpec};
use crate::error::{StreamsError, StreamsResult};
use crate::raw::{RawIndex, RawIndexEntry, RawItemCollection, RawProduct, RawProducts};

/// Supported index document format.
pub const INDEX_FORMAT: &str = "index:1.0";

/// Supported products document format.
pub const PRODUCTS_FORMAT: &str = "products:1.0";

/// What an alias key expands to.
pub type AliasTarget = CloudFields;

/// Alias table: group (attribute name) → alias key → target.
pub type Aliases = BTreeMap<String, BTreeMap<String, AliasTarget>>;

/// A concrete item record (image, tools tarball, ...).
///
/// Denormalization and matching only go through this trait, so each content
/// kind can carry whatever extra fields it needs.
pub trait Item: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Called once after deserialization with the item's key in its collection.
    fn set_key(&mut self, _key: &str) {}

    /// Identifier used for ordering and error messages.
    fn id(&self) -> &str;

    fn cloud(&self) -> &CloudFields;

    fn cloud_mut(&mut self) -> &mut CloudFields;

    /// String attribute by wire name; used to find alias references.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Content version carried by the item itself, if any.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Called during denormalization with the owning product's series and arch.
    fn inherit_product(&mut self, _series: &str, _arch: &str) {}
}

/// Top-level index document.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub format: String,
    pub updated: Option<String>,
    /// Entries in document order.
    pub entries: Vec<(String, IndexEntry)>,
}

impl Index {
    pub fn entry(&self, name: &str) -> Option<&IndexEntry> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, entry)| entry)
    }
}

/// One row of the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub format: String,
    pub data_type: String,
    pub cloud_name: Option<String>,
    /// Clouds this entry is usable for; `None` means any cloud.
    pub clouds: Option<Vec<CloudSpec>>,
    pub products_file_path: String,
    pub product_ids: Vec<String>,
    pub updated: Option<String>,
}

impl IndexEntry {
    pub fn supports_cloud(&self, cloud: &CloudSpec) -> bool {
        match &self.clouds {
            Some(clouds) if !clouds.is_empty() => clouds.contains(cloud),
            _ => true,
        }
    }

    /// Whether any of `ids` is listed. Entries without a product list match anything.
    pub fn lists_any_product(&self, ids: &[String]) -> bool {
        self.product_ids.is_empty() || ids.iter().any(|id| self.product_ids.contains(id))
    }
}

/// Root of a products document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductsCatalog<I> {
    pub format: String,
    pub content_id: String,
    pub data_type: Option<String>,
    pub updated: Option<String>,
    pub products: BTreeMap<String, ProductCatalog<I>>,
    pub aliases: Aliases,
}

/// One product: a series/arch combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCatalog<I> {
    pub cloud: CloudFields,
    pub series: String,
    pub version: Option<String>,
    pub arch: String,
    /// Remaining wire attributes, passed through unmodified.
    pub attributes: Map<String, Value>,
    pub item_collections: BTreeMap<String, ItemCollection<I>>,
}

impl<I> ProductCatalog<I> {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// Items published together (typically one build date).
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCollection<I> {
    pub cloud: CloudFields,
    pub attributes: Map<String, Value>,
    pub items: BTreeMap<String, I>,
}

impl<I> ItemCollection<I> {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// Parse an index document.
pub fn parse_index(data: &[u8]) -> StreamsResult<Index> {
    let raw: RawIndex = decode("document", data)?;

    let format = check_format(raw.format, INDEX_FORMAT)?;

    let mut entries = Vec::with_capacity(raw.index.len());
    for (name, value) in raw.index {
        let field = format!("index.{name}");
        if name.is_empty() {
            return Err(StreamsError::malformed("index", "empty entry name"));
        }
        let entry: RawIndexEntry = from_value(&field, value)?;
        entries.push((name, build_index_entry(&field, entry)?));
    }

    Ok(Index {
        format,
        updated: raw.updated,
        entries,
    })
}

fn build_index_entry(field: &str, raw: RawIndexEntry) -> StreamsResult<IndexEntry> {
    let clouds = match raw.clouds {
        Some(clouds) => {
            let mut specs = Vec::with_capacity(clouds.len());
            for (i, cloud) in clouds.into_iter().enumerate() {
                let cloud_field = format!("{field}.clouds[{i}]");
                let region = cloud
                    .region
                    .ok_or_else(|| StreamsError::malformed(&cloud_field, "missing region"))?;
                let endpoint = cloud
                    .endpoint
                    .ok_or_else(|| StreamsError::malformed(&cloud_field, "missing endpoint"))?;
                specs.push(CloudSpec { region, endpoint });
            }
            Some(specs)
        }
        None => None,
    };

    Ok(IndexEntry {
        format: required(field, "format", raw.format)?,
        data_type: required(field, "datatype", raw.datatype)?,
        cloud_name: raw.cloudname,
        clouds,
        products_file_path: required(field, "path", raw.path)?,
        product_ids: raw.products.unwrap_or_default(),
        updated: raw.updated,
    })
}

/// Parse a products document into typed items.
pub fn parse_products<I: Item>(data: &[u8]) -> StreamsResult<ProductsCatalog<I>> {
    let raw: RawProducts = decode("document", data)?;

    let format = check_format(raw.format, PRODUCTS_FORMAT)?;

    let mut aliases = Aliases::new();
    for (group, value) in raw.aliases {
        let field = format!("_aliases.{group}");
        let targets: BTreeMap<String, AliasTarget> = from_value(&field, value)?;
        aliases.insert(group, targets);
    }

    let mut products = BTreeMap::new();
    for (product_id, value) in raw.products {
        let field = format!("products.{product_id}");
        if product_id.is_empty() {
            return Err(StreamsError::malformed("products", "empty product id"));
        }
        let product: RawProduct = from_value(&field, value)?;
        products.insert(product_id, build_product(&field, product)?);
    }

    Ok(ProductsCatalog {
        format,
        content_id: raw.content_id.unwrap_or_default(),
        data_type: raw.datatype,
        updated: raw.updated,
        products,
        aliases,
    })
}

fn build_product<I: Item>(field: &str, raw: RawProduct) -> StreamsResult<ProductCatalog<I>> {
    let mut item_collections = BTreeMap::new();
    for (key, value) in raw.versions {
        if key.is_empty() {
            return Err(StreamsError::malformed(
                format!("{field}.versions"),
                "empty collection key",
            ));
        }
        let coll_field = format!("{field}.versions.{key}");
        let collection: RawItemCollection = from_value(&coll_field, value)?;
        item_collections.insert(key, build_collection(&coll_field, collection)?);
    }

    Ok(ProductCatalog {
        cloud: CloudFields {
            region: raw.region,
            endpoint: raw.endpoint,
        },
        series: required(field, "release", raw.release)?,
        version: raw.version,
        arch: required(field, "arch", raw.arch)?,
        attributes: raw.attributes,
        item_collections,
    })
}

fn build_collection<I: Item>(field: &str, raw: RawItemCollection) -> StreamsResult<ItemCollection<I>> {
    let mut items = BTreeMap::new();
    for (key, value) in raw.items {
        if key.is_empty() {
            return Err(StreamsError::malformed(
                format!("{field}.items"),
                "empty item key",
            ));
        }
        let item_field = format!("{field}.items.{key}");
        let mut item: I = from_value(&item_field, value)?;
        item.set_key(&key);
        if item.id().is_empty() {
            return Err(StreamsError::malformed(
                format!("{item_field}.id"),
                "missing item id",
            ));
        }
        items.insert(key, item);
    }

    Ok(ItemCollection {
        cloud: CloudFields {
            region: raw.region,
            endpoint: raw.endpoint,
        },
        attributes: raw.attributes,
        items,
    })
}

fn decode<T: DeserializeOwned>(field: &str, data: &[u8]) -> StreamsResult<T> {
    serde_json::from_slice(data).map_err(|e| StreamsError::malformed(field, e.to_string()))
}

fn from_value<T: DeserializeOwned>(field: &str, value: Value) -> StreamsResult<T> {
    serde_json::from_value(value).map_err(|e| StreamsError::malformed(field, e.to_string()))
}

fn required(field: &str, name: &str, value: Option<String>) -> StreamsResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StreamsError::malformed(format!("{field}.{name}"), "missing")),
    }
}

fn check_format(format: Option<String>, expected: &str) -> StreamsResult<String> {
    match format {
        Some(f) if f == expected => Ok(f),
        Some(f) => Err(StreamsError::malformed(
            "format",
            format!("unexpected format {f:?}, expected {expected:?}"),
        )),
        None => Err(StreamsError::malformed("format", "missing")),
    }
}
