//! Error types for sift configuration.

use std::{io, net::AddrParseError, path::PathBuf};

use thiserror::Error;
use toml::de;

/// Errors that can occur when loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A site URL is not an absolute URL.
    #[error("site '{site}' has an invalid url '{url}': {source}")]
    InvalidSiteUrl {
        /// Id of the site.
        site: String,
        /// The offending URL.
        url: String,
        /// Underlying parse error.
        source: url::ParseError,
    },

    /// The server bind address is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddress {
        /// The offending value.
        value: String,
        /// Underlying parse error.
        source: AddrParseError,
    },
}
