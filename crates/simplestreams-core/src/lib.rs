//! Simplestreams metadata resolution.
//!
//! Simplestreams publishes versioned cloud artifacts (machine images, tool
//! bundles) as a two-level tree of JSON documents: an index pointing at
//! products catalogs, each catalog nesting products → item collections → items.
//! This crate provides:
//!
//! - Index and products document parsing into a typed model
//! - Clearsign envelope verification against an Ed25519 key
//! - Alias expansion and top-down inheritance of cloud fields
//! - Constraint matching ordered by architecture preference
//! - HTTP and filesystem fetchers with base-URL fallback
//!
//! # Quick Start
//!
//! ```no_run
//! use simplestreams::{fetch_metadata, StreamsConfig};
//! # use simplestreams::{Item, LookupConstraint};
//!
//! # async fn example<I: Item, C: LookupConstraint>(constraint: C) -> anyhow::Result<()> {
//! let config = StreamsConfig::from_env()
//!     .with_base_urls(["https://cloud-images.ubuntu.com/releases"]);
//! let fetcher = config.fetcher()?;
//! let verifier = config.load_verifier()?;
//!
//! let items: Vec<I> = fetch_metadata(&fetcher, &config, &constraint, &verifier).await?;
//! println!("{} matching items", items.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SIMPLESTREAMS_BASE_URLS` | Comma-separated base URLs, tried in order |
//! | `SIMPLESTREAMS_INDEX_PATH` | Index path without suffix (default: `streams/v1/index`) |
//! | `SIMPLESTREAMS_REQUIRE_SIGNED` | Reject unsigned documents |
//! | `SIMPLESTREAMS_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `SIMPLESTREAMS_SIGNING_KEY` | PEM public key used for verification |

pub mod alias;
pub mod cloud;
pub mod config;
pub mod denormalize;
pub mod error;
pub mod fetch;
pub mod index;
pub mod matcher;
pub mod model;
mod raw;
pub mod signing;
pub mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export main types
pub use alias::{apply_aliases, resolve_alias};
pub use cloud::{CloudFields, CloudSpec, LookupParams};
pub use config::{StreamsConfig, DEFAULT_INDEX_PATH};
pub use denormalize::denormalize;
pub use error::{StreamsError, StreamsResult};
pub use fetch::{decode_document, fetch_metadata, SIGNED_SUFFIX, UNSIGNED_SUFFIX};
pub use index::{resolve_products_path, LookupConstraint};
pub use matcher::filter;
pub use model::{
    parse_index, parse_products, AliasTarget, Aliases, Index, IndexEntry, Item, ItemCollection,
    ProductCatalog, ProductsCatalog, INDEX_FORMAT, PRODUCTS_FORMAT,
};
pub use signing::{override_signing_key, set_signing_key, signing_key, KeyOverride, Verifier};
pub use source::{
    fetch_from_sources, FileFetcher, Fetcher, HttpFetcher, SchemeFetcher, StaticFetcher,
};
