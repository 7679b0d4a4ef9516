//! Configuration validation.
//!
//! Validates a resolved configuration and reports warnings for potential issues. Nothing
//! here is fatal: the server still starts, but `sift check` surfaces these.

use std::fmt;

use crate::{Config, Site};

/// Longest pattern the bit-parallel matcher can handle.
pub const MAX_PATTERN_LENGTH: usize = 64;

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// No sites are defined.
    NoSitesDefined,
    /// A site URL path does not end in `/`, so relative links resolve against its parent.
    SiteUrlNotDirectory {
        /// Id of the site.
        site: String,
        /// The configured URL.
        url: String,
    },
    /// A site URL uses a scheme the crawler cannot fetch.
    UnsupportedScheme {
        /// Id of the site.
        site: String,
        /// The scheme found.
        scheme: String,
    },
    /// The match threshold lies outside `[0, 1]`.
    ThresholdOutOfRange {
        /// Configured threshold.
        value: f64,
    },
    /// A field weight lies outside `(0, 1]`.
    WeightOutOfRange {
        /// Field name.
        field: &'static str,
        /// Configured weight.
        value: f64,
    },
    /// `max_pattern_length` exceeds what the matcher supports and will be capped.
    PatternLengthCapped {
        /// Configured length.
        value: usize,
    },
    /// `default_limit` is zero or larger than `max_limit`.
    InconsistentLimits {
        /// Configured default limit.
        default_limit: usize,
        /// Configured maximum limit.
        max_limit: usize,
    },
    /// `crawl.concurrency` is zero and will be treated as one.
    ZeroConcurrency,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSitesDefined => write!(f, "no sites are defined in configuration"),
            Self::SiteUrlNotDirectory { site, url } => {
                write!(f, "site '{site}' url does not end with '/': {url}")
            }
            Self::UnsupportedScheme { site, scheme } => {
                write!(f, "site '{site}' uses unsupported scheme '{scheme}'")
            }
            Self::ThresholdOutOfRange { value } => {
                write!(f, "search.threshold {value} is outside [0, 1]")
            }
            Self::WeightOutOfRange { field, value } => {
                write!(f, "weights.{field} {value} is outside (0, 1]")
            }
            Self::PatternLengthCapped { value } => write!(
                f,
                "search.max_pattern_length {value} exceeds {MAX_PATTERN_LENGTH} and will be capped"
            ),
            Self::InconsistentLimits {
                default_limit,
                max_limit,
            } => write!(
                f,
                "search.default_limit {default_limit} must be between 1 and max_limit {max_limit}"
            ),
            Self::ZeroConcurrency => write!(f, "crawl.concurrency is 0, using 1"),
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.sites.is_empty() {
        warnings.push(ConfigWarning::NoSitesDefined);
    }
    for site in &config.sites {
        warnings.extend(validate_site(site));
    }

    let search = &config.search;
    if !(0.0..=1.0).contains(&search.threshold) {
        warnings.push(ConfigWarning::ThresholdOutOfRange {
            value: search.threshold,
        });
    }
    if search.max_pattern_length > MAX_PATTERN_LENGTH {
        warnings.push(ConfigWarning::PatternLengthCapped {
            value: search.max_pattern_length,
        });
    }
    if search.default_limit == 0 || search.default_limit > search.max_limit {
        warnings.push(ConfigWarning::InconsistentLimits {
            default_limit: search.default_limit,
            max_limit: search.max_limit,
        });
    }

    let weights = &config.weights;
    for (field, value) in [
        ("title", weights.title),
        ("content", weights.content),
        ("tags", weights.tags),
    ] {
        if value <= 0.0 || value > 1.0 {
            warnings.push(ConfigWarning::WeightOutOfRange { field, value });
        }
    }

    if config.crawl.concurrency == 0 {
        warnings.push(ConfigWarning::ZeroConcurrency);
    }

    warnings
}

/// Validates a single site definition.
fn validate_site(site: &Site) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let scheme = site.url.scheme();
    if scheme != "http" && scheme != "https" {
        warnings.push(ConfigWarning::UnsupportedScheme {
            site: site.id.clone(),
            scheme: scheme.to_string(),
        });
    }
    if !site.url.path().ends_with('/') {
        warnings.push(ConfigWarning::SiteUrlNotDirectory {
            site: site.id.clone(),
            url: site.url.to_string(),
        });
    }
    warnings
}
