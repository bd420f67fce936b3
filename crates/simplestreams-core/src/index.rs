//! Index entry selection.

use crate::cloud::{CloudFields, LookupParams};
use crate::error::{StreamsError, StreamsResult};
use crate::model::Index;

/// A content-kind specific lookup.
pub trait LookupConstraint: Send + Sync {
    /// Index `datatype` served by this kind (e.g. `image-ids`).
    fn data_type(&self) -> &str;

    fn params(&self) -> &LookupParams;

    /// Product ids the request may be satisfied by. Empty means "don't filter".
    fn product_ids(&self) -> StreamsResult<Vec<String>>;

    /// Cloud fields to use where the catalog defines none.
    fn default_cloud(&self) -> Option<CloudFields> {
        None
    }
}

/// Path of the products document for `constraint`.
///
/// The first entry in document order wins when several match.
pub fn resolve_products_path<'a, C>(index: &'a Index, constraint: &C) -> StreamsResult<&'a str>
where
    C: LookupConstraint + ?Sized,
{
    let params = constraint.params();
    let product_ids = constraint.product_ids()?;

    index
        .entries
        .iter()
        .map(|(_, entry)| entry)
        .find(|entry| {
            entry.data_type == constraint.data_type()
                && entry.supports_cloud(&params.cloud)
                && entry.lists_any_product(&product_ids)
        })
        .map(|entry| entry.products_file_path.as_str())
        .ok_or_else(|| StreamsError::NoMatchingIndexEntry {
            data_type: constraint.data_type().to_string(),
            cloud: params.cloud.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::CloudSpec;
    use crate::model::parse_index;
    use crate::testing::{TestConstraint, INDEX_V1};

    fn constraint() -> TestConstraint {
        TestConstraint::new(LookupParams::new(
            CloudSpec::new("us-east-1", "https://ec2.us-east-1.amazonaws.com"),
            "precise",
            vec!["amd64".to_string(), "arm".to_string()],
        ))
    }

    #[test]
    fn test_get_products_path() {
        let index = parse_index(INDEX_V1.as_bytes()).unwrap();
        let path = resolve_products_path(&index, &constraint()).unwrap();
        assert_eq!(path, "streams/v1/image_metadata.json");
    }

    #[test]
    fn test_product_ids_select_entry() {
        let index = parse_index(INDEX_V1.as_bytes()).unwrap();
        let mut c = constraint();
        c.product_ids = vec!["com.ubuntu.cloud:server:13.04:amd64".to_string()];
        let path = resolve_products_path(&index, &c).unwrap();
        assert_eq!(path, "streams/v1/raring_metadata.json");
    }

    #[test]
    fn test_first_entry_in_document_order_wins() {
        let index = parse_index(INDEX_V1.as_bytes()).unwrap();
        let mut c = constraint();
        c.product_ids.clear();
        let path = resolve_products_path(&index, &c).unwrap();
        assert_eq!(path, "streams/v1/image_metadata.json");
    }

    #[test]
    fn test_unknown_cloud() {
        let index = parse_index(INDEX_V1.as_bytes()).unwrap();
        let mut c = constraint();
        c.params.cloud = CloudSpec::new("us-east-1", "https://elsewhere");
        match resolve_products_path(&index, &c) {
            Err(StreamsError::NoMatchingIndexEntry { data_type, cloud }) => {
                assert_eq!(data_type, "image-ids");
                assert_eq!(cloud.endpoint, "https://elsewhere");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_entry_without_clouds_serves_any_cloud() {
        let doc = r#"{"format": "index:1.0", "index": {
            "a": {"format": "products:1.0", "datatype": "image-ids", "path": "streams/v1/any.json"}}}"#;
        let index = parse_index(doc.as_bytes()).unwrap();
        let mut c = constraint();
        c.params.cloud = CloudSpec::new("anywhere", "https://anywhere");
        assert_eq!(
            resolve_products_path(&index, &c).unwrap(),
            "streams/v1/any.json"
        );
    }
}
