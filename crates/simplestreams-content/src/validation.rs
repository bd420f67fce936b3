//! Check that usable metadata exists for a cloud.

use simplestreams::{
    fetch_metadata, CloudSpec, Fetcher, LookupConstraint, LookupParams, StreamsConfig,
    StreamsError, Verifier,
};
use tracing::info;

use crate::images::{ImageConstraint, ImageMetadata};
use crate::tools::{ToolsConstraint, ToolsMetadata};

/// Validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A required lookup parameter is empty.
    #[error("required parameter {name} not specified")]
    MissingParameter { name: &'static str },

    /// Lookup succeeded but nothing matched.
    #[error("no matching {kind} found for {constraint}")]
    NoMatches {
        kind: &'static str,
        constraint: String,
    },

    #[error(transparent)]
    Streams(#[from] StreamsError),
}

impl ValidationError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingParameter { .. } => 2,
            Self::NoMatches { .. } => 1,
            Self::Streams(e) => e.exit_code(),
        }
    }
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Cloud, series and architectures to validate, plus where to look.
#[derive(Debug, Clone, Default)]
pub struct MetadataLookupParams {
    pub region: String,
    pub endpoint: String,
    pub series: String,
    pub architectures: Vec<String>,
    pub config: StreamsConfig,
}

impl MetadataLookupParams {
    fn check(&self) -> ValidationResult<()> {
        if self.region.is_empty() {
            return Err(ValidationError::MissingParameter { name: "region" });
        }
        if self.endpoint.is_empty() {
            return Err(ValidationError::MissingParameter { name: "endpoint" });
        }
        if self.series.is_empty() {
            return Err(ValidationError::MissingParameter { name: "series" });
        }
        if self.architectures.is_empty() {
            return Err(ValidationError::MissingParameter { name: "arches" });
        }
        if self.config.base_urls.is_empty() {
            return Err(ValidationError::MissingParameter { name: "baseURLs" });
        }
        Ok(())
    }

    fn lookup_params(&self) -> LookupParams {
        LookupParams::new(
            CloudSpec::new(&self.region, &self.endpoint),
            &self.series,
            self.architectures.clone(),
        )
    }
}

/// Image ids usable for `params`.
pub async fn validate_image_metadata<F>(
    fetcher: &F,
    params: &MetadataLookupParams,
    verifier: &Verifier,
) -> ValidationResult<Vec<String>>
where
    F: Fetcher + ?Sized,
{
    params.check()?;

    let constraint = ImageConstraint::new(params.lookup_params());
    let images: Vec<ImageMetadata> =
        fetch_metadata(fetcher, &params.config, &constraint, verifier).await?;
    if images.is_empty() {
        return Err(no_matches("images", &constraint));
    }

    info!(count = images.len(), "image metadata validated");
    Ok(images.into_iter().map(|image| image.id).collect())
}

/// Tools versions usable for `params`, as `<version>-<series>-<arch>`.
///
/// A `version` of `None` accepts any tools version.
pub async fn validate_tools_metadata<F>(
    fetcher: &F,
    params: &MetadataLookupParams,
    version: Option<&str>,
    verifier: &Verifier,
) -> ValidationResult<Vec<String>>
where
    F: Fetcher + ?Sized,
{
    params.check()?;

    let constraint = ToolsConstraint::new(version, params.lookup_params());
    let tools: Vec<ToolsMetadata> =
        fetch_metadata(fetcher, &params.config, &constraint, verifier).await?;
    if tools.is_empty() {
        return Err(no_matches("tools", &constraint));
    }

    info!(count = tools.len(), "tools metadata validated");
    Ok(tools.iter().map(ToolsMetadata::binary_version).collect())
}

fn no_matches<C: LookupConstraint>(kind: &'static str, constraint: &C) -> ValidationError {
    let params = constraint.params();
    let mut description = format!(
        "series {} arches [{}] cloud {}",
        params.series,
        params.arches.join(", "),
        params.cloud
    );
    if let Some(version) = &params.version {
        description.push_str(&format!(" version {version}"));
    }
    ValidationError::NoMatches {
        kind,
        constraint: description,
    }
}
