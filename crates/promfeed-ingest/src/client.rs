//! Feed fetcher: raw XML bytes from a remote endpoint or a local directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use promfeed_core::{AppConfig, FeedSourceConfig};
use reqwest::Client;

use crate::document::FeedDocument;
use crate::error::FeedError;
use crate::retry::retry_with_backoff;

/// Fetches feed documents by id.
///
/// Remote feeds are requested as `GET <base_url>/<feed_id>.xml`; any non-2xx
/// status is a per-feed failure. Rate limiting (429) and network errors are
/// retried with exponential backoff. Local feeds are read from
/// `<dir>/<feed_id>.xml`.
pub struct FeedClient {
    client: Client,
    source: FeedSourceConfig,
    /// When set, fetched remote bytes are saved as `raw_feed_<id>.xml` here.
    cache_dir: Option<PathBuf>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl FeedClient {
    /// Creates a `FeedClient` with the given timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        source: FeedSourceConfig,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            source,
            cache_dir: None,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from the run configuration.
    ///
    /// # Errors
    ///
    /// See [`FeedClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, FeedError> {
        let client = Self::new(
            config.feed_source.clone(),
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )?;
        Ok(match &config.cache_dir {
            Some(dir) => client.with_cache_dir(dir.clone()),
            None => client,
        })
    }

    #[must_use]
    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    /// Fetches and parses one feed.
    ///
    /// # Errors
    ///
    /// Any [`FeedError`]: fetch failures from [`Self::fetch_bytes`] or parse
    /// failures from [`FeedDocument::parse`].
    pub async fn fetch_document(&self, feed_id: &str) -> Result<FeedDocument, FeedError> {
        let bytes = self.fetch_bytes(feed_id).await?;
        FeedDocument::parse(&bytes)
    }

    /// Fetches the raw bytes of one feed.
    ///
    /// # Errors
    ///
    /// - [`FeedError::NotFound`]: HTTP 404 or missing local file.
    /// - [`FeedError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`FeedError::RateLimited`]: HTTP 429 after all retries.
    /// - [`FeedError::Http`]: network failure or timeout after all retries.
    /// - [`FeedError::Io`]: local file could not be read.
    pub async fn fetch_bytes(&self, feed_id: &str) -> Result<Vec<u8>, FeedError> {
        match &self.source {
            FeedSourceConfig::Remote { base_url } => {
                let url = feed_url(base_url, feed_id);
                tracing::info!(feed_id, %url, "fetching feed");
                let bytes = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
                    self.get_once(&url, feed_id)
                })
                .await?;
                self.save_raw(feed_id, &bytes).await;
                Ok(bytes)
            }
            FeedSourceConfig::Local { dir } => {
                let path = feed_path(dir, feed_id);
                tracing::info!(feed_id, path = %path.display(), "reading local feed");
                read_local(&path).await
            }
        }
    }

    async fn get_once(&self, url: &str, feed_id: &str) -> Result<Vec<u8>, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FeedError::RateLimited {
                feed_id: feed_id.to_string(),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FeedError::NotFound {
                location: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Best effort: a cache write failure is logged and otherwise ignored.
    async fn save_raw(&self, feed_id: &str, bytes: &[u8]) {
        let Some(dir) = &self.cache_dir else {
            return;
        };
        let path = dir.join(format!("raw_feed_{feed_id}.xml"));
        let result = match tokio::fs::create_dir_all(dir).await {
            Ok(()) => tokio::fs::write(&path, bytes).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => tracing::debug!(feed_id, path = %path.display(), "cached raw feed"),
            Err(e) => {
                tracing::warn!(feed_id, path = %path.display(), error = %e, "failed to cache raw feed");
            }
        }
    }
}

pub(crate) fn feed_url(base_url: &str, feed_id: &str) -> String {
    format!("{}/{feed_id}.xml", base_url.trim_end_matches('/'))
}

pub(crate) fn feed_path(dir: &Path, feed_id: &str) -> PathBuf {
    dir.join(format!("{feed_id}.xml"))
}

async fn read_local(path: &Path) -> Result<Vec<u8>, FeedError> {
    tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FeedError::NotFound {
                location: path.display().to_string(),
            }
        } else {
            FeedError::Io {
                path: path.display().to_string(),
                source: e,
            }
        }
    })
}
