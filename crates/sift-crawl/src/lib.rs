//! Crawling for sift.
//!
//! A site is crawled by fetching its sitemap, fetching every listed page with bounded
//! concurrency, and extracting posts with CSS selectors:
//!
//! ```text
//! sitemap.xml -> <loc> URLs -> page HTML -> RawPage -> Document
//! ```
//!
//! Fetching goes through the [`PageSource`] trait. [`HttpFetcher`] is the production
//! source; [`MemorySource`] serves fixed pages.

#![warn(missing_docs)]

mod crawl;
mod error;
mod extract;
mod fetch;
mod sitemap;

pub use crawl::Crawler;
pub use error::{CrawlError, FetchError};
pub use extract::Extractor;
pub use fetch::{HttpFetcher, MemorySource, PageSource};
pub use sitemap::{Sitemap, parse_sitemap};
