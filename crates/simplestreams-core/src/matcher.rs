//! Constraint matching over a denormalized catalog.

use crate::cloud::LookupParams;
use crate::error::StreamsResult;
use crate::model::{Item, ProductsCatalog};

/// Items matching `params`, ordered by architecture preference then identifier.
///
/// Products are selected by exact series and an architecture from the
/// preference list; items by exact cloud and, when requested, content version.
/// An empty result is not an error here.
pub fn filter<I: Item>(catalog: &ProductsCatalog<I>, params: &LookupParams) -> StreamsResult<Vec<I>> {
    let mut matches: Vec<(usize, I)> = Vec::new();

    for product in catalog.products.values() {
        if product.series != params.series {
            continue;
        }
        let Some(rank) = params.arch_rank(&product.arch) else {
            continue;
        };

        for collection in product.item_collections.values() {
            for item in collection.items.values() {
                let cloud = item.cloud().resolve(item.id())?;
                if cloud != params.cloud {
                    continue;
                }
                if let Some(wanted) = &params.version {
                    let version = item.version().or(product.version.as_deref());
                    if version != Some(wanted.as_str()) {
                        continue;
                    }
                }
                matches.push((rank, item.clone()));
            }
        }
    }

    matches.sort_by(|(rank_a, a), (rank_b, b)| rank_a.cmp(rank_b).then_with(|| a.id().cmp(b.id())));
    Ok(matches.into_iter().map(|(_, item)| item).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::apply_aliases;
    use crate::cloud::CloudSpec;
    use crate::denormalize::denormalize;
    use crate::error::StreamsError;
    use crate::model::parse_products;
    use crate::testing::{TestItem, IMAGE_METADATA_V1};
    use pretty_assertions::assert_eq;

    fn catalog() -> ProductsCatalog<TestItem> {
        let catalog = parse_products(IMAGE_METADATA_V1.as_bytes()).unwrap();
        denormalize(apply_aliases(catalog).unwrap(), None)
    }

    fn params(arches: &[&str]) -> LookupParams {
        LookupParams::new(
            CloudSpec::new("us-east-1", "https://ec2.us-east-1.amazonaws.com"),
            "precise",
            arches.iter().map(|a| a.to_string()).collect(),
        )
    }

    fn ids(items: &[TestItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_filter_orders_by_arch_then_id() {
        let items = filter(&catalog(), &params(&["amd64", "arm"])).unwrap();
        assert_eq!(ids(&items), vec!["ami-442ea674", "ami-442ea684", "ami-442ea699"]);
    }

    #[test]
    fn test_arch_preference_order_respected() {
        let items = filter(&catalog(), &params(&["arm", "amd64"])).unwrap();
        assert_eq!(ids(&items), vec!["ami-442ea699", "ami-442ea674", "ami-442ea684"]);
    }

    #[test]
    fn test_arch_not_requested() {
        let items = filter(&catalog(), &params(&["arm"])).unwrap();
        assert_eq!(ids(&items), vec!["ami-442ea699"]);
    }

    #[test]
    fn test_series_is_exact() {
        let mut p = params(&["amd64"]);
        p.series = "Precise".to_string();
        assert!(filter(&catalog(), &p).unwrap().is_empty());
    }

    #[test]
    fn test_cloud_is_exact() {
        let mut p = params(&["amd64"]);
        p.cloud = CloudSpec::new("us-west-3", "https://ec2.us-west-3.amazonaws.com");
        let items = filter(&catalog(), &p).unwrap();
        assert_eq!(ids(&items), vec!["ami-442ea675"]);

        p.cloud = CloudSpec::new("us-east", "https://ec2.us-east-1.amazonaws.com");
        assert!(filter(&catalog(), &p).unwrap().is_empty());
    }

    #[test]
    fn test_version_constraint() {
        let p = params(&["amd64", "arm"]).with_version("12.04");
        assert_eq!(filter(&catalog(), &p).unwrap().len(), 3);

        let p = params(&["amd64", "arm"]).with_version("13.04");
        assert!(filter(&catalog(), &p).unwrap().is_empty());
    }

    #[test]
    fn test_incomplete_item_in_candidate_product_is_error() {
        let doc = r#"{
          "format": "products:1.0",
          "products": {"p1": {
            "release": "precise", "arch": "amd64", "region": "us-east-1",
            "versions": {"v1": {"items": {"i1": {"id": "ami-1"}}}}}}
        }"#;
        let catalog: ProductsCatalog<TestItem> = parse_products(doc.as_bytes()).unwrap();
        let catalog = denormalize(catalog, None);

        let err = filter(&catalog, &params(&["amd64"])).unwrap_err();
        assert!(matches!(err, StreamsError::IncompleteMetadata { .. }));

        // Products that are not candidates are never inspected.
        assert!(filter(&catalog, &params(&["arm"])).unwrap().is_empty());
    }
}
