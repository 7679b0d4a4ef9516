//! Configuration system for sift.
//!
//! sift reads a single TOML file (conventionally `sift.toml`) at process start. Every section
//! is optional: missing values fall back to the defaults documented on each settings struct,
//! so an empty file is a valid (if useless) configuration. Sites are declared as
//! `[site.<id>]` tables with a `url` key.

#![warn(missing_docs)]

mod error;
mod parse;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
};

pub use error::ConfigError;
pub use parse::{RawConfig, RawServer, RawSite, parse_config_file, parse_config_str};
use serde::{Deserialize, Serialize};
pub use templates::{CONFIG_FILENAME, config_template};
use url::Url;
pub use validate::{ConfigWarning, MAX_PATTERN_LENGTH};
use validate::validate_config;

/// Default listening port for the query endpoint.
pub const DEFAULT_PORT: u16 = 3000;

/// Fully resolved configuration for sift.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Per-client request rate limiting.
    pub rate_limit: RateLimitSettings,
    /// Fuzzy matching and query handling settings.
    pub search: SearchSettings,
    /// Relative weight of each searchable field.
    pub weights: FieldWeights,
    /// Crawler settings.
    pub crawl: CrawlSettings,
    /// CSS selectors used to extract posts from fetched pages.
    pub selectors: Selectors,
    /// Configured sites, ordered by id.
    pub sites: Vec<Site>,
}

impl Config {
    /// Loads and resolves the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_file(path)?;
        Self::resolve(raw)
    }

    /// Parses and resolves configuration from a TOML string.
    ///
    /// The `path` parameter is used for error reporting.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_str(contents, path)?;
        Self::resolve(raw)
    }

    /// Resolves a raw configuration into typed settings.
    ///
    /// Site URLs and the bind address are parsed here; everything else was already
    /// defaulted during deserialization.
    pub fn resolve(raw: RawConfig) -> Result<Self, ConfigError> {
        let server = match raw.server.bind {
            Some(bind) => ServerSettings {
                bind: bind
                    .parse()
                    .map_err(|source| ConfigError::InvalidBindAddress {
                        value: bind.clone(),
                        source,
                    })?,
            },
            None => ServerSettings::default(),
        };

        let sites = raw
            .site
            .into_iter()
            .map(|(id, site)| {
                let url = Url::parse(&site.url).map_err(|source| ConfigError::InvalidSiteUrl {
                    site: id.clone(),
                    url: site.url.clone(),
                    source,
                })?;
                Ok::<_, ConfigError>(Site { id, url })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            server,
            rate_limit: raw.rate_limit,
            search: raw.search,
            weights: raw.weights,
            crawl: raw.crawl,
            selectors: raw.selectors,
            sites,
        })
    }

    /// Returns the site with the given id, if configured.
    pub fn site(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|site| site.id == id)
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - An empty site list
    /// - Site URLs that will not resolve `sitemap.xml` beneath themselves
    /// - Thresholds and weights outside `[0, 1]`
    /// - Pattern lengths beyond the matcher's bit-vector width
    /// - Inconsistent limits and zero crawl concurrency
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// Sites are not included; they are reported separately by `sift check`.
    pub fn settings_to_toml(&self) -> String {
        let serializable = SerializableSettings {
            server: SerializableServer {
                bind: self.server.bind.to_string(),
            },
            rate_limit: self.rate_limit.clone(),
            search: self.search.clone(),
            weights: self.weights.clone(),
            crawl: self.crawl.clone(),
            selectors: self.selectors.clone(),
        };
        toml::to_string_pretty(&serializable).unwrap_or_default()
    }
}

/// A configured site (one locale).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Identifier clients pass as `id`.
    pub id: String,
    /// Base URL that `sitemap.xml` and page links are resolved against.
    pub url: Url,
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Socket address the query endpoint listens on.
    pub bind: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
        }
    }
}

/// Fixed-window rate limiting, applied per client address.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Window length in seconds.
    pub window_secs: u64,
    /// Requests allowed per client per window. Zero disables limiting.
    pub max_requests: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 100,
        }
    }
}

/// Fuzzy matching parameters and query handling limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum score accepted (0.0 exact only, 1.0 match anything).
    pub threshold: f64,
    /// Character position where matches are expected.
    pub location: usize,
    /// How quickly the location penalty grows with offset. Zero means any offset fails.
    pub distance: usize,
    /// Highlight spans shorter than this are dropped.
    pub min_match_char_length: usize,
    /// Queries longer than this fall back to token matching.
    pub max_pattern_length: usize,
    /// Queries shorter than this (in characters) are rejected. 0 or 1 disables the check.
    pub min_query_length: usize,
    /// Results returned when the request gives no usable limit.
    pub default_limit: usize,
    /// Upper bound on the requested limit.
    pub max_limit: usize,
    /// Maximum characters in the summary of extended results.
    pub summary_length: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            location: 0,
            distance: 100,
            min_match_char_length: 1,
            max_pattern_length: 32,
            min_query_length: 2,
            default_limit: 10,
            max_limit: 100,
            summary_length: 160,
        }
    }
}

/// Weight of each searchable field in the combined score.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldWeights {
    /// Weight of the page title.
    pub title: f64,
    /// Weight of the content sentences.
    pub content: f64,
    /// Weight of the tags.
    pub tags: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 0.7,
            content: 0.4,
            tags: 0.5,
        }
    }
}

/// Crawler settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// Sitemap location, resolved against each site's URL.
    pub sitemap: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum pages fetched at once per site.
    pub concurrency: usize,
    /// Seconds between index rebuilds. Zero rebuilds only at startup.
    pub refresh_interval_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            sitemap: String::from("sitemap.xml"),
            timeout_secs: 10,
            concurrency: 8,
            refresh_interval_secs: 0,
            user_agent: format!("sift/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// CSS selectors identifying the parts of a post page.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Selectors {
    /// Present only on pages that should be indexed.
    pub post: String,
    /// Element holding the post title.
    pub title: String,
    /// Element holding the post body.
    pub content: String,
    /// Elements holding individual tags.
    pub tags: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            post: String::from(".post-single"),
            title: String::from(".post-title"),
            content: String::from(".post-content"),
            tags: String::from(".post-tags .tag"),
        }
    }
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings {
    /// Server settings.
    server: SerializableServer,
    /// Rate limiting.
    rate_limit: RateLimitSettings,
    /// Search settings.
    search: SearchSettings,
    /// Field weights.
    weights: FieldWeights,
    /// Crawl settings.
    crawl: CrawlSettings,
    /// Extraction selectors.
    selectors: Selectors,
}

/// Server settings with the bind address rendered as a string.
#[derive(Serialize)]
struct SerializableServer {
    /// Socket address.
    bind: String,
}
