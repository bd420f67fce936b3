//! Top-down inheritance of cloud fields.
//!
//! Precedence per field, highest first: item, item collection, product, caller
//! default. Fields present on a record are never replaced, so running the pass
//! twice is the same as running it once.

use crate::cloud::CloudFields;
use crate::model::{Item, ProductsCatalog};

/// Fill every record's absent cloud fields from its parent.
pub fn denormalize<I: Item>(
    mut catalog: ProductsCatalog<I>,
    defaults: Option<&CloudFields>,
) -> ProductsCatalog<I> {
    for product in catalog.products.values_mut() {
        if let Some(defaults) = defaults {
            product.cloud.inherit(defaults);
        }

        for collection in product.item_collections.values_mut() {
            collection.cloud.inherit(&product.cloud);

            for item in collection.items.values_mut() {
                item.cloud_mut().inherit(&collection.cloud);
                item.inherit_product(&product.series, &product.arch);
            }
        }
    }
    catalog
}
