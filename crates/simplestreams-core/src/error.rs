//! Error types for metadata resolution.

use crate::cloud::CloudSpec;

/// Resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum StreamsError {
    /// Document carries no clearsign envelope.
    #[error("no PGP signature embedded in plain text data")]
    NotSigned,

    /// Envelope present but the signature does not check out.
    #[error("signature verification failed: {reason}")]
    SignatureInvalid { reason: String },

    /// Structural or schema violation while parsing a document.
    #[error("malformed metadata: {field}: {reason}")]
    MalformedMetadata { field: String, reason: String },

    /// Alias reference does not resolve.
    #[error("unknown alias {group}/{key}")]
    UnknownAlias { group: String, key: String },

    /// Item lacks an attribute after full denormalization.
    #[error("incomplete metadata: item {item} has no {attribute}")]
    IncompleteMetadata { item: String, attribute: String },

    /// Index has no entry usable for the request.
    #[error("no index entry with data type {data_type} for cloud {cloud}")]
    NoMatchingIndexEntry { data_type: String, cloud: CloudSpec },

    /// Document does not exist at the requested location.
    #[error("document not found: {url}")]
    NotFound { url: String },

    /// Transport failure other than not-found.
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Lookup constraint cannot be expressed against the metadata.
    #[error("invalid constraint: {message}")]
    InvalidConstraint { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl StreamsError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Nothing usable found
            Self::NotFound { .. } => 1,
            Self::NoMatchingIndexEntry { .. } => 1,

            // Caller input
            Self::Config { .. } => 2,
            Self::InvalidConstraint { .. } => 2,

            // Security issues
            Self::NotSigned => 4,
            Self::SignatureInvalid { .. } => 4,

            // Bad metadata
            Self::MalformedMetadata { .. } => 5,
            Self::UnknownAlias { .. } => 5,
            Self::IncompleteMetadata { .. } => 5,

            // Transport
            Self::Fetch { .. } => 6,
        }
    }

    /// Whether the error means "try the next location".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_signature(reason: impl Into<String>) -> Self {
        Self::SignatureInvalid {
            reason: reason.into(),
        }
    }
}

/// Result type for resolution operations.
pub type StreamsResult<T> = Result<T, StreamsError>;
