//! Site instances and their current indices.

use std::{sync::Arc, time::Instant};

use parking_lot::RwLock;
use sift_config::Site;
use sift_crawl::Crawler;
use sift_document::Document;
use sift_index::SiteIndex;
use tracing::info;
use url::Url;

use crate::error::RebuildError;

/// One configured site and the index currently serving it.
#[derive(Debug)]
pub struct SiteInstance {
    /// Key clients use to select the site.
    id: String,
    /// Root URL; the sitemap and relative page links resolve against it.
    base_url: Url,
    /// Current index. `None` until the first build completes.
    index: RwLock<Option<Arc<SiteIndex>>>,
}

impl SiteInstance {
    /// Creates an instance with no index.
    pub fn new(id: &str, base_url: Url) -> Self {
        Self {
            id: id.to_string(),
            base_url,
            index: RwLock::new(None),
        }
    }

    /// Returns the site id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the site URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns a snapshot of the current index, if one has been built.
    ///
    /// The snapshot stays valid for as long as the caller holds it, even if a rebuild
    /// publishes a newer index meanwhile.
    pub fn index(&self) -> Option<Arc<SiteIndex>> {
        self.index.read().clone()
    }

    /// Builds an index over `documents` and publishes it, returning the document count.
    pub fn publish(&self, documents: Vec<Document>) -> usize {
        let index = Arc::new(SiteIndex::build(documents));
        let count = index.len();
        *self.index.write() = Some(index);
        count
    }
}

/// Every configured site instance, in configuration order.
#[derive(Debug, Default)]
pub struct SiteRegistry {
    /// Instances, unique by id.
    sites: Vec<SiteInstance>,
}

impl SiteRegistry {
    /// Creates a registry with one empty instance per site.
    pub fn new(sites: &[Site]) -> Self {
        Self {
            sites: sites
                .iter()
                .map(|site| SiteInstance::new(&site.id, site.url.clone()))
                .collect(),
        }
    }

    /// Looks up an instance by id.
    pub fn get(&self, id: &str) -> Option<&SiteInstance> {
        self.sites.iter().find(|site| site.id == id)
    }

    /// Iterates over all instances.
    pub fn sites(&self) -> impl Iterator<Item = &SiteInstance> {
        self.sites.iter()
    }

    /// Returns the site ids in configuration order.
    pub fn ids(&self) -> Vec<String> {
        self.sites.iter().map(|site| site.id.clone()).collect()
    }

    /// Crawls a site and replaces its index, returning the new document count.
    ///
    /// The new index is built before anything is published, so on failure the previous
    /// index, if any, keeps serving queries.
    pub async fn rebuild(&self, id: &str, crawler: &Crawler) -> Result<usize, RebuildError> {
        let site = self
            .get(id)
            .ok_or_else(|| RebuildError::UnknownSite(id.to_string()))?;

        let started = Instant::now();
        let documents = crawler.crawl(site.base_url()).await?;
        let count = site.publish(documents);
        info!(
            site = id,
            documents = count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index published"
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use sift_config::{CrawlSettings, Selectors};
    use sift_crawl::MemorySource;

    use super::*;

    fn registry() -> SiteRegistry {
        SiteRegistry::new(&[
            Site {
                id: "lang-en".into(),
                url: Url::parse("http://localhost:1313/en/").unwrap(),
            },
            Site {
                id: "lang-cs".into(),
                url: Url::parse("http://localhost:1313/cs/").unwrap(),
            },
        ])
    }

    fn crawler(source: MemorySource) -> Crawler {
        Crawler::new(
            Arc::new(source),
            &CrawlSettings::default(),
            &Selectors::default(),
        )
        .unwrap()
    }

    fn site_source(title: &str) -> MemorySource {
        MemorySource::new()
            .with_page(
                "http://localhost:1313/en/sitemap.xml",
                "<urlset><url><loc>posts/a/</loc></url></urlset>",
            )
            .with_page(
                "http://localhost:1313/en/posts/a/",
                &format!(
                    r#"<div class="post-single"><h1 class="post-title">{title}</h1>
<div class="post-content">Body text.</div></div>"#
                ),
            )
    }

    #[test]
    fn instances_start_without_index() {
        let registry = registry();
        assert_eq!(registry.ids(), vec!["lang-en", "lang-cs"]);
        assert!(registry.get("lang-en").unwrap().index().is_none());
        assert!(registry.get("lang-de").is_none());
    }

    #[tokio::test]
    async fn rebuild_publishes_index() {
        let registry = registry();
        let count = registry
            .rebuild("lang-en", &crawler(site_source("First")))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let index = registry.get("lang-en").unwrap().index().unwrap();
        assert_eq!(index.documents()[0].title, "First");
        assert!(registry.get("lang-cs").unwrap().index().is_none());
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_index() {
        let registry = registry();
        registry
            .rebuild("lang-en", &crawler(site_source("First")))
            .await
            .unwrap();

        let result = registry
            .rebuild("lang-en", &crawler(MemorySource::new()))
            .await;
        assert!(matches!(result, Err(RebuildError::Crawl(_))));

        let index = registry.get("lang-en").unwrap().index().unwrap();
        assert_eq!(index.documents()[0].title, "First");
    }

    #[tokio::test]
    async fn snapshots_survive_republish() {
        let registry = registry();
        registry
            .rebuild("lang-en", &crawler(site_source("First")))
            .await
            .unwrap();
        let snapshot = registry.get("lang-en").unwrap().index().unwrap();

        registry
            .rebuild("lang-en", &crawler(site_source("Second")))
            .await
            .unwrap();

        assert_eq!(snapshot.documents()[0].title, "First");
        let current = registry.get("lang-en").unwrap().index().unwrap();
        assert_eq!(current.documents()[0].title, "Second");
    }

    #[tokio::test]
    async fn unknown_site_is_rejected() {
        let result = registry()
            .rebuild("lang-de", &crawler(MemorySource::new()))
            .await;
        assert!(matches!(result, Err(RebuildError::UnknownSite(id)) if id == "lang-de"));
    }
}
