//! Alias expansion.
//!
//! A products document may declare `_aliases`: a table keyed by attribute name
//! (the alias group, e.g. `crsn`) mapping short keys to cloud fields. Any record
//! carrying that attribute is alias-sourced: its value is looked up in the group
//! and the target's fields are written onto the record. Lookup is one level deep.

use tracing::trace;

use crate::cloud::CloudFields;
use crate::error::{StreamsError, StreamsResult};
use crate::model::{Aliases, Item, ProductsCatalog};

/// Resolve one alias reference.
pub fn resolve_alias<'a>(
    aliases: &'a Aliases,
    group: &str,
    key: &str,
) -> StreamsResult<&'a CloudFields> {
    aliases
        .get(group)
        .and_then(|targets| targets.get(key))
        .ok_or_else(|| StreamsError::UnknownAlias {
            group: group.to_string(),
            key: key.to_string(),
        })
}

/// Expand every alias reference in the catalog, at every level.
///
/// Expanded fields replace values on the same record; inheritance from outer
/// records is left to [`crate::denormalize`].
pub fn apply_aliases<I: Item>(mut catalog: ProductsCatalog<I>) -> StreamsResult<ProductsCatalog<I>> {
    if catalog.aliases.is_empty() {
        return Ok(catalog);
    }

    let aliases = &catalog.aliases;
    for product in catalog.products.values_mut() {
        let expanded = expand(aliases, |name| product.attribute(name).map(String::from))?;
        product.cloud.overlay(&expanded);

        for collection in product.item_collections.values_mut() {
            let expanded = expand(aliases, |name| collection.attribute(name).map(String::from))?;
            collection.cloud.overlay(&expanded);

            for item in collection.items.values_mut() {
                let expanded = expand(aliases, |name| item.attribute(name).map(String::from))?;
                if !expanded.is_empty() {
                    trace!(item = item.id(), "expanded alias reference");
                }
                item.cloud_mut().overlay(&expanded);
            }
        }
    }

    Ok(catalog)
}

/// Cloud fields contributed by all alias references on one record.
fn expand<F>(aliases: &Aliases, attribute: F) -> StreamsResult<CloudFields>
where
    F: Fn(&str) -> Option<String>,
{
    let mut fields = CloudFields::default();
    for group in aliases.keys() {
        if let Some(key) = attribute(group) {
            fields.overlay(resolve_alias(aliases, group, &key)?);
        }
    }
    Ok(fields)
}
