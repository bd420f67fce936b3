//! Document fetching.
//!
//! [`Fetcher`] is the transport seam: given a base URL and a relative path it
//! returns the raw bytes, [`StreamsError::NotFound`] when the document does not
//! exist, or [`StreamsError::Fetch`] for anything else. No retries happen here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{StreamsError, StreamsResult};

const USER_AGENT_VALUE: &str = concat!("simplestreams/", env!("CARGO_PKG_VERSION"));

/// Retrieves raw documents.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, base_url: &str, path: &str) -> StreamsResult<Vec<u8>>;
}

/// Join a base URL and a document-relative path.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Fetch `path` from the first base URL that has it.
///
/// Only [`StreamsError::NotFound`] moves on to the next base URL; any other
/// error is returned immediately. Returns the base URL used with the bytes.
///
/// Meant for callers after a single document. [`crate::fetch_metadata`] keeps
/// its own loop since it also skips sources with no index entry or no matches.
pub async fn fetch_from_sources<'a, F>(
    fetcher: &F,
    base_urls: &'a [String],
    path: &str,
) -> StreamsResult<(&'a str, Vec<u8>)>
where
    F: Fetcher + ?Sized,
{
    let mut last_err = None;
    for base_url in base_urls {
        match fetcher.fetch(base_url, path).await {
            Ok(data) => return Ok((base_url.as_str(), data)),
            Err(e) if e.is_not_found() => {
                debug!(base_url = %base_url, path = %path, "document not found, trying next source");
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| StreamsError::Config {
        message: "no base URLs configured".to_string(),
    }))
}

/// HTTP(S) fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> StreamsResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| StreamsError::Config {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, base_url: &str, path: &str) -> StreamsResult<Vec<u8>> {
        let url = join_url(base_url, path);
        debug!(url = %url, "fetching document");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StreamsError::Fetch {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StreamsError::NotFound { url });
        }
        if !status.is_success() {
            return Err(StreamsError::Fetch {
                url,
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.bytes().await.map_err(|e| StreamsError::Fetch {
            url: url.clone(),
            message: format!("failed to read response body: {e}"),
        })?;
        Ok(body.to_vec())
    }
}

/// Local filesystem fetcher for `file://` URLs and plain directory paths.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

impl FileFetcher {
    fn local_path(location: &str) -> StreamsResult<PathBuf> {
        match url::Url::parse(location) {
            Ok(url) if url.scheme() == "file" => {
                url.to_file_path().map_err(|()| StreamsError::Config {
                    message: format!("not a local file URL: {location}"),
                })
            }
            Ok(url) => Err(StreamsError::Config {
                message: format!("unsupported URL scheme for file source: {}", url.scheme()),
            }),
            Err(_) => Ok(PathBuf::from(location)),
        }
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, base_url: &str, path: &str) -> StreamsResult<Vec<u8>> {
        let location = join_url(base_url, path);
        let file_path = Self::local_path(&location)?;
        debug!(path = %file_path.display(), "reading document");

        match tokio::fs::read(&file_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StreamsError::NotFound { url: location })
            }
            Err(e) => Err(StreamsError::Fetch {
                url: location,
                message: e.to_string(),
            }),
        }
    }
}

/// Routes `http(s)://` base URLs to HTTP and everything else to the filesystem.
#[derive(Debug, Clone)]
pub struct SchemeFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SchemeFetcher {
    pub fn new(timeout: Duration) -> StreamsResult<Self> {
        Ok(Self {
            http: HttpFetcher::new(timeout)?,
            file: FileFetcher,
        })
    }
}

#[async_trait]
impl Fetcher for SchemeFetcher {
    async fn fetch(&self, base_url: &str, path: &str) -> StreamsResult<Vec<u8>> {
        if base_url.starts_with("http://") || base_url.starts_with("https://") {
            self.http.fetch(base_url, path).await
        } else {
            self.file.fetch(base_url, path).await
        }
    }
}

/// In-memory documents keyed by full URL.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document at `base_url` + `path`.
    pub fn with_document(
        mut self,
        base_url: &str,
        path: &str,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.documents.insert(join_url(base_url, path), data.into());
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, base_url: &str, path: &str) -> StreamsResult<Vec<u8>> {
        let url = join_url(base_url, path);
        self.documents
            .get(&url)
            .cloned()
            .ok_or(StreamsError::NotFound { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5)).expect("failed to create fetcher")
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://a/b/", "/streams/v1/index.json"), "http://a/b/streams/v1/index.json");
        assert_eq!(join_url("file:///srv", "x.json"), "file:///srv/x.json");
    }

    #[tokio::test]
    async fn test_http_fetch_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/streams/v1/index.json"))
            .and(header("user-agent", USER_AGENT_VALUE))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&mock_server)
            .await;

        let data = http()
            .fetch(&mock_server.uri(), "streams/v1/index.json")
            .await
            .expect("fetch failed");
        assert_eq!(data, b"{}");
    }

    #[tokio::test]
    async fn test_http_404_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/streams/v1/index.sjson"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = http().fetch(&mock_server.uri(), "streams/v1/index.sjson").await;
        assert!(matches!(result, Err(StreamsError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_http_5xx_is_fetch_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/streams/v1/index.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        match http().fetch(&mock_server.uri(), "streams/v1/index.json").await {
            Err(StreamsError::Fetch { message, .. }) => assert_eq!(message, "HTTP 503"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_fetcher_plain_dir_and_file_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("streams/v1")).unwrap();
        std::fs::write(dir.path().join("streams/v1/index.json"), b"data").unwrap();

        let plain = dir.path().to_str().unwrap().to_string();
        let data = FileFetcher.fetch(&plain, "streams/v1/index.json").await.unwrap();
        assert_eq!(data, b"data");

        let file_url = url::Url::from_directory_path(dir.path()).unwrap().to_string();
        let data = FileFetcher.fetch(&file_url, "streams/v1/index.json").await.unwrap();
        assert_eq!(data, b"data");

        let missing = FileFetcher.fetch(&plain, "streams/v1/missing.json").await;
        assert!(matches!(missing, Err(StreamsError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_fetch_from_sources_falls_through_not_found() {
        let fetcher = StaticFetcher::new().with_document("mem://second", "doc.json", "second");
        let bases = vec!["mem://first".to_string(), "mem://second".to_string()];

        let (base, data) = fetch_from_sources(&fetcher, &bases, "doc.json").await.unwrap();
        assert_eq!(base, "mem://second");
        assert_eq!(data, b"second");
    }

    #[tokio::test]
    async fn test_fetch_from_sources_surfaces_last_not_found() {
        let fetcher = StaticFetcher::new();
        let bases = vec!["mem://first".to_string(), "mem://second".to_string()];

        match fetch_from_sources(&fetcher, &bases, "doc.json").await {
            Err(StreamsError::NotFound { url }) => assert_eq!(url, "mem://second/doc.json"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_from_sources_stops_on_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = SchemeFetcher::new(Duration::from_secs(5)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.json"), b"local").unwrap();
        let bases = vec![mock_server.uri(), dir.path().to_str().unwrap().to_string()];

        let result = fetch_from_sources(&fetcher, &bases, "doc.json").await;
        assert!(matches!(result, Err(StreamsError::Fetch { .. })));
    }

    #[tokio::test]
    async fn test_no_base_urls() {
        let result = fetch_from_sources(&StaticFetcher::new(), &[], "doc.json").await;
        assert!(matches!(result, Err(StreamsError::Config { .. })));
    }
}
