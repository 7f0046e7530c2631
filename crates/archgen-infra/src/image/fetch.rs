//! Image byte fetching.
//!
//! Metrics operate on URLs; this trait turns a URL into bytes. The HTTP
//! implementation serves production, the in-memory one serves tests and
//! local pipelines that address renders as `mem://` keys.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use archgen_types::error::MetricsError;

/// Resolves an image URL to its raw encoded bytes.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ImageFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, MetricsError>> + Send;
}

/// HTTP image fetcher.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, MetricsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MetricsError::Fetch {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MetricsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MetricsError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::Fetch {
                url: url.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| MetricsError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

/// In-memory fetcher keyed by URL. Cheap to clone; clones share the map.
#[derive(Clone, Default)]
pub struct InMemoryImageFetcher {
    images: Arc<DashMap<String, Vec<u8>>>,
}

impl InMemoryImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(url.into(), bytes);
    }
}

impl ImageFetcher for InMemoryImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MetricsError> {
        self.images
            .get(url)
            .map(|b| b.clone())
            .ok_or_else(|| MetricsError::Fetch {
                url: url.to_string(),
                message: "no image registered under this url".to_string(),
            })
    }
}
