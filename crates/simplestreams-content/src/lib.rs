//! Content kinds published over simplestreams.
//!
//! - [`images`]: machine images (`image-ids`)
//! - [`tools`]: tools tarballs (`content-download`)
//! - [`validation`]: checks that a cloud has usable metadata

pub mod images;
pub mod series;
pub mod tools;
pub mod validation;

pub use images::{ImageConstraint, ImageMetadata, IMAGE_DATA_TYPE};
pub use series::series_version;
pub use tools::{ToolsConstraint, ToolsMetadata, TOOLS_DATA_TYPE};
pub use validation::{
    validate_image_metadata, validate_tools_metadata, MetadataLookupParams, ValidationError,
    ValidationResult,
};
