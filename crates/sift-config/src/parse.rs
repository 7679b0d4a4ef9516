//! Configuration file parsing.
//!
//! Parses a `sift.toml` file into a [`RawConfig`]. Settings sections deserialize straight
//! into their typed structs with per-field defaults; only values that need further
//! validation (the bind address and site URLs) are kept as strings until resolution.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;

use crate::{ConfigError, CrawlSettings, FieldWeights, RateLimitSettings, SearchSettings, Selectors};

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Server section.
    pub server: RawServer,
    /// Rate limit section.
    pub rate_limit: RateLimitSettings,
    /// Search section.
    pub search: SearchSettings,
    /// Field weight section.
    pub weights: FieldWeights,
    /// Crawl section.
    pub crawl: CrawlSettings,
    /// Selector section.
    pub selectors: Selectors,
    /// Site definitions: id -> site config.
    pub site: BTreeMap<String, RawSite>,
}

/// Raw server settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawServer {
    /// Socket address to listen on, e.g. `"0.0.0.0:3000"`.
    pub bind: Option<String>,
}

/// Raw site definition from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSite {
    /// Base URL of the site.
    pub url: String,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}
