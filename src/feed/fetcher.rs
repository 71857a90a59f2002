use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::StreamExt;
use thiserror::Error;

use crate::config::FetchConfig;
use crate::util::{validate_url, UrlValidationError};

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while downloading a feed into the cache.
///
/// None of these stop a build: [`Fetcher::fetch`] logs them and the
/// pipeline falls back to the previously cached copy.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed URL is not an absolute http(s) URL
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request plus body download exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response body is not valid UTF-8
    #[error("Response is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    /// Writing the cache file failed
    #[error("Failed to write cache file: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads feed documents into the local cache directory.
///
/// One attempt per feed, no retries. A failed download leaves the previous
/// cache file in place so the build can keep using stale data.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    enabled: bool,
    timeout: Duration,
}

impl Fetcher {
    /// Builds a fetcher from the `[fetch]` configuration section.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            enabled: config.enabled,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Overrides the total request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Downloads `url` to `destination`, returning whether the cache was
    /// refreshed.
    ///
    /// With fetching disabled this returns `false` without any I/O. On
    /// failure the error is logged and `destination` is left untouched.
    pub async fn fetch(&self, url: &str, destination: &Path) -> bool {
        if !self.enabled {
            tracing::info!(url = %url, "Fetching disabled, using cached copy");
            return false;
        }

        tracing::info!(url = %url, "Downloading feed");
        match self.try_fetch(url, destination).await {
            Ok(bytes) => {
                tracing::info!(
                    path = %destination.display(),
                    bytes = bytes,
                    "Saved feed"
                );
                true
            }
            Err(e) => {
                let cached = destination.exists();
                tracing::warn!(
                    url = %url,
                    error = %e,
                    cached = cached,
                    "Download failed, keeping previous cache"
                );
                false
            }
        }
    }

    /// Downloads `url` and atomically replaces `destination` with the body.
    ///
    /// Ignores the `enabled` flag; callers wanting the configured behaviour
    /// use [`Fetcher::fetch`].
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] - URL is not http(s)
    /// - [`FetchError::Timeout`] - request and body took longer than the timeout
    /// - [`FetchError::Network`] - connection, DNS or TLS errors
    /// - [`FetchError::HttpStatus`] - non-2xx HTTP response
    /// - [`FetchError::ResponseTooLarge`] - body exceeded 10MB
    /// - [`FetchError::Decode`] - body is not UTF-8
    /// - [`FetchError::Io`] - cache file could not be written
    pub async fn try_fetch(&self, url: &str, destination: &Path) -> Result<usize, FetchError> {
        let url = validate_url(url)?;

        let bytes = tokio::time::timeout(self.timeout, self.download(url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        // Feeds are consumed as text; reject bodies that would fail later
        let body = String::from_utf8(bytes)?;

        write_atomic(destination, body.as_bytes()).await?;
        Ok(body.len())
    }

    async fn download(&self, url: url::Url) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        read_limited_bytes(response, MAX_FEED_SIZE).await
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Writes `content` to a temporary sibling and renames it over `path`, so
/// readers never observe a partially written cache file.
async fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    if let Err(e) = tokio::fs::write(&temp_path, content).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>Test</title></item>
</channel></rss>"#;

    const PREVIOUS: &str = "<?xml version=\"1.0\"?><rss><channel/></rss>";

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_overwrites_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed/"))
            .and(header("user-agent", FetchConfig::default().user_agent.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("feeds").join("feed-general.xml");
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&dest, PREVIOUS).unwrap();

        let ok = fetcher()
            .fetch(&format!("{}/feed/", mock_server.uri()), &dest)
            .await;
        assert!(ok);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), VALID_RSS);
    }

    #[tokio::test]
    async fn test_fetch_creates_parent_directories() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a").join("b").join("feed.xml");
        assert!(fetcher().fetch(&mock_server.uri(), &dest).await);
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_timeout_keeps_previous_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("feed.xml");
        std::fs::write(&dest, PREVIOUS).unwrap();

        let fetcher = fetcher().with_timeout(Duration::from_millis(200));
        let err = fetcher.try_fetch(&mock_server.uri(), &dest).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));

        assert!(!fetcher.fetch(&mock_server.uri(), &dest).await);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), PREVIOUS);
    }

    #[tokio::test]
    async fn test_oversized_body_keeps_previous_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a'; 11 * 1024 * 1024]))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("feed.xml");
        std::fs::write(&dest, PREVIOUS).unwrap();

        let err = fetcher().try_fetch(&mock_server.uri(), &dest).await.unwrap_err();
        assert!(matches!(err, FetchError::ResponseTooLarge));
        assert!(!fetcher().fetch(&mock_server.uri(), &dest).await);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), PREVIOUS);
    }

    #[tokio::test]
    async fn test_http_error_keeps_previous_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1) // No retries
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("feed.xml");
        std::fs::write(&dest, PREVIOUS).unwrap();

        let err = fetcher().try_fetch(&mock_server.uri(), &dest).await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(503)));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), PREVIOUS);
    }

    #[tokio::test]
    async fn test_non_utf8_body_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x3c, 0xff, 0xfe, 0x3e]))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("feed.xml");

        let err = fetcher().try_fetch(&mock_server.uri(), &dest).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_disabled_fetcher_does_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(0)
            .mount(&mock_server)
            .await;

        let config = FetchConfig {
            enabled: false,
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(&config).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("feed.xml");

        assert!(!fetcher.fetch(&mock_server.uri(), &dest).await);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("feed.xml");
        let err = fetcher().try_fetch("ftp://example.com/feed", &dest).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
