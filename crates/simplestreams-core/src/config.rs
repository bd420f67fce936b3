//! Resolution settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StreamsError, StreamsResult};
use crate::signing::{load_public_key_pem, Verifier};
use crate::source::SchemeFetcher;

/// Index location relative to a base URL, without suffix.
pub const DEFAULT_INDEX_PATH: &str = "streams/v1/index";

/// Where and how to look up metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamsConfig {
    /// Base URLs tried in order.
    #[serde(default)]
    pub base_urls: Vec<String>,

    /// Index path relative to each base URL, without `.json`/`.sjson`.
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Reject documents that are not clearsigned.
    #[serde(default)]
    pub require_signed: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// PEM public key used to verify signed documents.
    #[serde(default)]
    pub signing_key_path: Option<PathBuf>,
}

fn default_index_path() -> String {
    DEFAULT_INDEX_PATH.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for StreamsConfig {
    fn default() -> Self {
        Self {
            base_urls: Vec::new(),
            index_path: default_index_path(),
            require_signed: false,
            timeout_secs: default_timeout(),
            signing_key_path: None,
        }
    }
}

impl StreamsConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `SIMPLESTREAMS_BASE_URLS` | Comma-separated base URLs |
    /// | `SIMPLESTREAMS_INDEX_PATH` | Index path without suffix |
    /// | `SIMPLESTREAMS_REQUIRE_SIGNED` | Reject unsigned documents |
    /// | `SIMPLESTREAMS_TIMEOUT` | Request timeout in seconds |
    /// | `SIMPLESTREAMS_SIGNING_KEY` | PEM public key path |
    pub fn from_env() -> Self {
        Self {
            base_urls: std::env::var("SIMPLESTREAMS_BASE_URLS")
                .map(|v| split_urls(&v))
                .unwrap_or_default(),
            index_path: std::env::var("SIMPLESTREAMS_INDEX_PATH")
                .unwrap_or_else(|_| default_index_path()),
            require_signed: std::env::var("SIMPLESTREAMS_REQUIRE_SIGNED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            timeout_secs: std::env::var("SIMPLESTREAMS_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            signing_key_path: std::env::var_os("SIMPLESTREAMS_SIGNING_KEY").map(PathBuf::from),
        }
    }

    /// Load config from a YAML file. Missing keys take their defaults.
    pub fn from_yaml_file(path: &Path) -> StreamsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StreamsError::Config {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        serde_yaml::from_str(&content).map_err(|e| StreamsError::Config {
            message: format!("invalid config {}: {e}", path.display()),
        })
    }

    pub fn with_base_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_index_path(mut self, path: impl Into<String>) -> Self {
        self.index_path = path.into();
        self
    }

    pub fn with_require_signed(mut self, require: bool) -> Self {
        self.require_signed = require;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_signing_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.signing_key_path = Some(path.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Verifier for the configured key, falling back to the process-wide key.
    pub fn load_verifier(&self) -> StreamsResult<Verifier> {
        match &self.signing_key_path {
            Some(path) => Ok(Verifier::new(load_public_key_pem(path)?)),
            None => Ok(Verifier::from_process_key()),
        }
    }

    /// Default fetcher honouring the configured timeout.
    pub fn fetcher(&self) -> StreamsResult<SchemeFetcher> {
        SchemeFetcher::new(self.timeout())
    }
}

fn split_urls(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
