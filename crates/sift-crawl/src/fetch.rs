//! Page sources.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use parking_lot::RwLock;
use sift_config::CrawlSettings;
use url::Url;

use crate::error::FetchError;

/// Something that can return the body of a URL.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches `url` and returns its body as text.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Fetches pages over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// Shared client, carrying the timeout and user agent.
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher using the timeout and user agent from `settings`.
    pub fn new(settings: &CrawlSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(request_error)
    }
}

/// Serves pages from memory, keyed by absolute URL.
///
/// Unknown URLs answer with a 404 status error. Pages can be changed while the source
/// is shared, so later crawls see the new content.
#[derive(Debug, Default)]
pub struct MemorySource {
    /// Page bodies by URL.
    pages: RwLock<HashMap<String, String>>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page.
    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.insert(url, body);
        self
    }

    /// Adds or replaces a page.
    pub fn insert(&self, url: &str, body: &str) {
        self.pages.write().insert(url.to_string(), body.to_string());
    }

    /// Removes a page, so that fetching it answers 404.
    pub fn remove(&self, url: &str) {
        self.pages.write().remove(url);
    }
}

#[async_trait]
impl PageSource for MemorySource {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.pages
            .read()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
