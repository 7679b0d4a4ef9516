//! The sitemap-driven crawl pipeline.

use std::sync::Arc;

use futures::{StreamExt, stream};
use sift_config::{CrawlSettings, Selectors};
use sift_document::Document;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::CrawlError,
    extract::Extractor,
    fetch::PageSource,
    sitemap::{Sitemap, parse_sitemap},
};

/// Outcome of fetching and extracting one page.
enum PageOutcome {
    /// The page is a post with content.
    Document(Document),
    /// The page was fetched but is not an indexable post.
    Skipped,
    /// The page could not be fetched.
    Failed,
}

/// Crawls sites through a [`PageSource`].
pub struct Crawler {
    /// Where pages come from.
    source: Arc<dyn PageSource>,
    /// Compiled selectors.
    extractor: Extractor,
    /// Sitemap path, relative to the site URL.
    sitemap: String,
    /// Maximum concurrent page fetches.
    concurrency: usize,
}

impl Crawler {
    /// Creates a crawler.
    pub fn new(
        source: Arc<dyn PageSource>,
        settings: &CrawlSettings,
        selectors: &Selectors,
    ) -> Result<Self, CrawlError> {
        Ok(Self {
            source,
            extractor: Extractor::new(selectors)?,
            sitemap: settings.sitemap.clone(),
            concurrency: settings.concurrency.max(1),
        })
    }

    /// Crawls the site at `base_url` and returns its documents in sitemap order.
    ///
    /// Pages that fail to fetch are logged and skipped, as are pages that are not posts
    /// or have no content. The crawl fails as a whole only when the sitemap cannot be
    /// read or when every listed page fails.
    pub async fn crawl(&self, base_url: &Url) -> Result<Vec<Document>, CrawlError> {
        let sitemap_url = base_url
            .join(&self.sitemap)
            .map_err(|source| CrawlError::SitemapUrl {
                sitemap: self.sitemap.clone(),
                source,
            })?;

        let pages = self.page_urls(base_url, &sitemap_url).await?;
        info!(site = %base_url, pages = pages.len(), "crawling sitemap");

        let total = pages.len();
        let outcomes: Vec<PageOutcome> = stream::iter(pages)
            .map(|url| self.page(url))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, PageOutcome::Failed))
            .count();
        if total > 0 && failed == total {
            return Err(CrawlError::AllPagesFailed {
                url: sitemap_url.to_string(),
                count: failed,
            });
        }

        let documents: Vec<Document> = outcomes
            .into_iter()
            .filter_map(|o| match o {
                PageOutcome::Document(doc) => Some(doc),
                PageOutcome::Skipped | PageOutcome::Failed => None,
            })
            .collect();

        info!(
            site = %base_url,
            documents = documents.len(),
            failed,
            "crawl finished"
        );
        Ok(documents)
    }

    /// Lists page URLs from the sitemap, following a sitemap index one level deep.
    async fn page_urls(&self, base_url: &Url, sitemap_url: &Url) -> Result<Vec<Url>, CrawlError> {
        let sitemap = self.fetch_sitemap(sitemap_url).await?;
        let locations = match sitemap {
            Sitemap::UrlSet(locations) => locations,
            Sitemap::Index(children) => {
                let mut locations = Vec::new();
                for child in resolve_all(base_url, &children) {
                    match self.fetch_sitemap(&child).await {
                        Ok(Sitemap::UrlSet(locs)) => locations.extend(locs),
                        Ok(Sitemap::Index(_)) => {
                            debug!(sitemap = %child, "ignoring nested sitemap index");
                        }
                        Err(e) => warn!("skipping sitemap: {e}"),
                    }
                }
                locations
            }
        };
        Ok(resolve_all(base_url, &locations))
    }

    /// Fetches and parses one sitemap document.
    async fn fetch_sitemap(&self, url: &Url) -> Result<Sitemap, CrawlError> {
        let xml = self
            .source
            .fetch(url)
            .await
            .map_err(|source| CrawlError::Sitemap {
                url: url.to_string(),
                source,
            })?;
        parse_sitemap(&xml).map_err(|message| CrawlError::SitemapParse {
            url: url.to_string(),
            message,
        })
    }

    /// Fetches one page and turns it into a document.
    ///
    /// The URL is owned: per-item borrows would make the crawl future non-`Send`.
    async fn page(&self, url: Url) -> PageOutcome {
        let html = match self.source.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("skipping page: {e}");
                return PageOutcome::Failed;
            }
        };

        match self
            .extractor
            .extract(&html, &url)
            .and_then(Document::from_raw)
        {
            Some(doc) => PageOutcome::Document(doc),
            None => {
                debug!(page = %url, "not an indexable post");
                PageOutcome::Skipped
            }
        }
    }
}

/// Resolves sitemap locations against the site URL, dropping invalid ones.
fn resolve_all(base_url: &Url, locations: &[String]) -> Vec<Url> {
    locations
        .iter()
        .filter_map(|loc| match base_url.join(loc) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(location = %loc, "skipping invalid sitemap location: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_handles_relative_and_absolute() {
        let base = Url::parse("http://localhost:1313/en/").unwrap();
        let urls = resolve_all(&base, &[
            "posts/a/".to_string(),
            "/cs/posts/b/".to_string(),
            "http://other/c".to_string(),
            "http://[broken".to_string(),
        ]);
        let urls: Vec<&str> = urls.iter().map(Url::as_str).collect();
        assert_eq!(urls, vec![
            "http://localhost:1313/en/posts/a/",
            "http://localhost:1313/cs/posts/b/",
            "http://other/c",
        ]);
    }
}
