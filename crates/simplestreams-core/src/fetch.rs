//! End-to-end metadata lookup.
//!
//! For each base URL in turn: fetch the index (signed variant first), select the
//! products document for the constraint, fetch it, then expand aliases,
//! denormalize and filter. The first base URL that yields matches wins.

use tracing::{debug, info, warn};

use crate::alias::apply_aliases;
use crate::config::StreamsConfig;
use crate::denormalize::denormalize;
use crate::error::{StreamsError, StreamsResult};
use crate::index::{resolve_products_path, LookupConstraint};
use crate::matcher::filter;
use crate::model::{parse_index, parse_products, Item, ProductsCatalog};
use crate::signing::Verifier;
use crate::source::{join_url, Fetcher};

/// Suffix of clearsigned documents.
pub const SIGNED_SUFFIX: &str = ".sjson";

/// Suffix of plain documents.
pub const UNSIGNED_SUFFIX: &str = ".json";

/// Look up items matching `constraint` across the configured base URLs.
///
/// A base URL that lacks the documents, has no index entry for the request or
/// yields no matches is skipped. Returns an empty list when every reachable
/// source came back empty, otherwise the last error.
pub async fn fetch_metadata<I, C, F>(
    fetcher: &F,
    config: &StreamsConfig,
    constraint: &C,
    verifier: &Verifier,
) -> StreamsResult<Vec<I>>
where
    I: Item,
    C: LookupConstraint + ?Sized,
    F: Fetcher + ?Sized,
{
    if config.base_urls.is_empty() {
        return Err(StreamsError::Config {
            message: "no base URLs configured".to_string(),
        });
    }

    let mut last_err = None;
    let mut any_empty = false;
    for base_url in &config.base_urls {
        match fetch_from_base::<I, C, F>(fetcher, base_url, config, constraint, verifier).await {
            Ok(items) if !items.is_empty() => {
                info!(
                    base_url = %base_url,
                    data_type = constraint.data_type(),
                    matches = items.len(),
                    "resolved metadata"
                );
                return Ok(items);
            }
            Ok(_) => {
                debug!(base_url = %base_url, "no matching items, trying next source");
                any_empty = true;
            }
            Err(e) if skips_source(&e) => {
                debug!(base_url = %base_url, error = %e, "source unusable, trying next");
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    match last_err {
        Some(e) if !any_empty => Err(e),
        _ => Ok(Vec::new()),
    }
}

fn skips_source(err: &StreamsError) -> bool {
    matches!(
        err,
        StreamsError::NotFound { .. } | StreamsError::NoMatchingIndexEntry { .. }
    )
}

/// Run the whole lookup against one base URL.
pub async fn fetch_from_base<I, C, F>(
    fetcher: &F,
    base_url: &str,
    config: &StreamsConfig,
    constraint: &C,
    verifier: &Verifier,
) -> StreamsResult<Vec<I>>
where
    I: Item,
    C: LookupConstraint + ?Sized,
    F: Fetcher + ?Sized,
{
    let (index_data, signed) = fetch_index_document(
        fetcher,
        base_url,
        &config.index_path,
        config.require_signed,
        verifier,
    )
    .await?;
    let index = parse_index(&index_data)?;

    let products_path = resolve_products_path(&index, constraint)?;
    let products_path = if signed {
        signed_variant(products_path)
    } else {
        products_path.to_string()
    };

    let raw = fetcher.fetch(base_url, &products_path).await?;
    let location = join_url(base_url, &products_path);
    let data = decode_document(&raw, config.require_signed, verifier, &location)?;

    let catalog: ProductsCatalog<I> = parse_products(&data)?;
    debug!(
        location = %location,
        content_id = %catalog.content_id,
        products = catalog.products.len(),
        "parsed products document"
    );

    let catalog = apply_aliases(catalog)?;
    let defaults = constraint.default_cloud();
    let catalog = denormalize(catalog, defaults.as_ref());
    filter(&catalog, constraint.params())
}

/// Fetch the index, returning its body and whether its signature verified.
///
/// The `.sjson` variant is preferred. The `.json` variant is only consulted
/// when signatures are optional. An `.sjson` index without an envelope is
/// accepted as plain JSON under the same condition.
pub async fn fetch_index_document<F>(
    fetcher: &F,
    base_url: &str,
    index_path: &str,
    require_signed: bool,
    verifier: &Verifier,
) -> StreamsResult<(Vec<u8>, bool)>
where
    F: Fetcher + ?Sized,
{
    let signed_path = format!("{index_path}{SIGNED_SUFFIX}");
    match fetcher.fetch(base_url, &signed_path).await {
        Ok(raw) => {
            let location = join_url(base_url, &signed_path);
            return unwrap_envelope(raw, require_signed, verifier, &location);
        }
        Err(e) if e.is_not_found() && !require_signed => {
            debug!(base_url = %base_url, "no signed index, trying unsigned");
        }
        Err(e) => return Err(e),
    }

    let unsigned_path = format!("{index_path}{UNSIGNED_SUFFIX}");
    let raw = fetcher.fetch(base_url, &unsigned_path).await?;
    let location = join_url(base_url, &unsigned_path);
    let (data, signed) = unwrap_envelope(raw, false, verifier, &location)?;
    Ok((data, signed))
}

/// Unwrap a possibly clearsigned document.
///
/// Unsigned input is passed through unless `require_signed` is set. An
/// envelope that fails verification is always an error.
pub fn decode_document(
    raw: &[u8],
    require_signed: bool,
    verifier: &Verifier,
    location: &str,
) -> StreamsResult<Vec<u8>> {
    unwrap_envelope(raw.to_vec(), require_signed, verifier, location).map(|(data, _)| data)
}

fn unwrap_envelope(
    raw: Vec<u8>,
    require_signed: bool,
    verifier: &Verifier,
    location: &str,
) -> StreamsResult<(Vec<u8>, bool)> {
    match verifier.verify(&raw) {
        Ok(data) => Ok((data, true)),
        Err(StreamsError::NotSigned) if !require_signed => {
            warn!(location = %location, "accepting unsigned metadata");
            Ok((raw, false))
        }
        Err(e) => Err(e),
    }
}

/// `.json` path rewritten to its `.sjson` counterpart.
pub fn signed_variant(path: &str) -> String {
    match path.strip_suffix(UNSIGNED_SUFFIX) {
        Some(stem) => format!("{stem}{SIGNED_SUFFIX}"),
        None => path.to_string(),
    }
}
