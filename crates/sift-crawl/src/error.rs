//! Error types for crawling.

use thiserror::Error;

/// Errors fetching a single resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed before a response was received, or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code received.
        status: u16,
    },
}

/// Errors that abort a site crawl.
///
/// Individual page failures are logged and skipped; only failures that leave nothing to
/// index surface here.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A configured CSS selector does not parse.
    #[error("invalid {name} selector '{selector}': {message}")]
    InvalidSelector {
        /// Which selector (post, title, content or tags).
        name: &'static str,
        /// The selector text.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// The sitemap location could not be resolved against the site URL.
    #[error("invalid sitemap location '{sitemap}': {source}")]
    SitemapUrl {
        /// Configured sitemap path.
        sitemap: String,
        /// Underlying error.
        #[source]
        source: url::ParseError,
    },

    /// The sitemap could not be fetched.
    #[error("failed to fetch sitemap {url}: {source}")]
    Sitemap {
        /// Sitemap URL.
        url: String,
        /// Underlying error.
        #[source]
        source: FetchError,
    },

    /// The sitemap is not well-formed XML.
    #[error("failed to parse sitemap {url}: {message}")]
    SitemapParse {
        /// Sitemap URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// Every page listed in the sitemap failed to fetch.
    #[error("all {count} pages listed in {url} failed to fetch")]
    AllPagesFailed {
        /// Sitemap URL.
        url: String,
        /// Number of pages attempted.
        count: usize,
    },
}
