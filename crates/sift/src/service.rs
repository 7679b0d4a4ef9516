//! The query service.

use serde::{Deserialize, Serialize};
use sift_config::{Config, FieldWeights, SearchSettings};
use sift_index::{FieldMatch, Hit, MatchOptions};

use crate::{error::QueryError, registry::SiteRegistry};

/// Query parameters as received from the client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Site id.
    pub id: Option<String>,
    /// Query text.
    pub q: Option<String>,
    /// Maximum number of results.
    pub limit: Option<String>,
    /// Whether to return full documents.
    pub full: Option<String>,
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Site id. Never empty.
    pub site: String,
    /// Trimmed query text, at least `min_query_length` characters long.
    pub query: String,
    /// Number of results to return, between 1 and `max_limit`.
    pub limit: usize,
    /// Return full documents with a summary instead of title and URL only.
    pub full: bool,
}

impl SearchRequest {
    /// Validates raw parameters.
    ///
    /// Missing or unusable `limit` values fall back to `default_limit` and are clamped to
    /// `max_limit`. `full` is true for `true`, `1`, `yes` or `on`, in any case.
    pub fn parse(params: SearchParams, settings: &SearchSettings) -> Result<Self, QueryError> {
        let site = params
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| QueryError::InvalidRequest("missing required parameter: id".into()))?;

        let query = params
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| QueryError::InvalidRequest("missing required parameter: q".into()))?;

        if query.chars().count() < settings.min_query_length {
            return Err(QueryError::InvalidRequest(format!(
                "query must be at least {} characters",
                settings.min_query_length
            )));
        }

        let limit = params
            .limit
            .as_deref()
            .and_then(|limit| limit.trim().parse::<usize>().ok())
            .filter(|&limit| limit > 0)
            .unwrap_or(settings.default_limit)
            .clamp(1, settings.max_limit.max(1));

        let full = params.full.as_deref().is_some_and(parse_flag);

        Ok(Self {
            site,
            query,
            limit,
            full,
        })
    }
}

/// Interprets a boolean query flag.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// One search result as returned to clients.
///
/// `content`, `tags` and `summary` are only present for full requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Document title.
    pub title: String,
    /// Document URL.
    pub url: String,
    /// Content sentences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<String>>,
    /// Tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Combined score, 0 being perfect.
    pub score: f64,
    /// Matched field values with highlight spans.
    pub matches: Vec<FieldMatch>,
    /// Excerpt from the best-matching sentence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl SearchResult {
    /// Renders a hit.
    fn from_hit(hit: Hit<'_>, full: bool, summary_length: usize) -> Self {
        let summary = full.then(|| hit.summary(summary_length));
        let document = hit.document;
        Self {
            title: document.title.clone(),
            url: document.url.clone(),
            content: full.then(|| document.content.clone()),
            tags: full.then(|| document.tags.clone()),
            score: hit.score,
            matches: hit.matches,
            summary,
        }
    }
}

/// Answers search queries against the registered sites.
#[derive(Debug)]
pub struct SearchService {
    /// Site instances.
    registry: SiteRegistry,
    /// Query validation and result settings.
    settings: SearchSettings,
    /// Matcher parameters derived from `settings`.
    options: MatchOptions,
    /// Field weights for ranking.
    weights: FieldWeights,
}

impl SearchService {
    /// Creates a service with one empty site instance per configured site.
    pub fn new(config: &Config) -> Self {
        Self {
            registry: SiteRegistry::new(&config.sites),
            settings: config.search.clone(),
            options: MatchOptions::from(&config.search),
            weights: config.weights.clone(),
        }
    }

    /// Returns the site registry.
    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Returns the search settings.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Validates raw parameters and runs the search.
    pub fn query(&self, params: SearchParams) -> Result<Vec<SearchResult>, QueryError> {
        let request = SearchRequest::parse(params, &self.settings)?;
        self.search(&request)
    }

    /// Runs a validated search.
    ///
    /// Fails with [`QueryError::SiteNotFound`] for unknown sites and
    /// [`QueryError::IndexNotReady`] before the site's first index build completes.
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, QueryError> {
        let site = self
            .registry
            .get(&request.site)
            .ok_or_else(|| QueryError::SiteNotFound(request.site.clone()))?;
        let index = site
            .index()
            .ok_or_else(|| QueryError::IndexNotReady(request.site.clone()))?;

        Ok(index
            .search(&request.query, &self.options, &self.weights)
            .into_iter()
            .take(request.limit)
            .map(|hit| SearchResult::from_hit(hit, request.full, self.settings.summary_length))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(id: Option<&str>, q: Option<&str>) -> SearchParams {
        SearchParams {
            id: id.map(Into::into),
            q: q.map(Into::into),
            ..SearchParams::default()
        }
    }

    fn parse(params: SearchParams) -> Result<SearchRequest, QueryError> {
        SearchRequest::parse(params, &SearchSettings::default())
    }

    #[test]
    fn parses_minimal_request_with_defaults() {
        let request = parse(params(Some("lang-en"), Some(" cats "))).unwrap();
        assert_eq!(request, SearchRequest {
            site: "lang-en".into(),
            query: "cats".into(),
            limit: 10,
            full: false,
        });
    }

    #[test]
    fn missing_or_empty_parameters_are_invalid() {
        for (id, q) in [
            (None, Some("cats")),
            (Some(""), Some("cats")),
            (Some("lang-en"), None),
            (Some("lang-en"), Some("")),
            (Some("lang-en"), Some("   ")),
        ] {
            assert!(
                matches!(parse(params(id, q)), Err(QueryError::InvalidRequest(_))),
                "{id:?} {q:?}"
            );
        }
    }

    #[test]
    fn short_queries_are_invalid() {
        assert!(matches!(
            parse(params(Some("lang-en"), Some("a"))),
            Err(QueryError::InvalidRequest(msg)) if msg.contains("at least 2")
        ));

        let lenient = SearchSettings {
            min_query_length: 0,
            ..SearchSettings::default()
        };
        assert!(SearchRequest::parse(params(Some("lang-en"), Some("a")), &lenient).is_ok());
    }

    #[test]
    fn limit_falls_back_and_clamps() {
        let with_limit = |limit: &str| {
            let mut p = params(Some("lang-en"), Some("cats"));
            p.limit = Some(limit.into());
            parse(p).unwrap().limit
        };
        assert_eq!(with_limit("3"), 3);
        assert_eq!(with_limit("abc"), 10);
        assert_eq!(with_limit("0"), 10);
        assert_eq!(with_limit("-5"), 10);
        assert_eq!(with_limit("5000"), 100);
    }

    #[test]
    fn full_flag_values() {
        for (value, expected) in [
            ("true", true),
            ("1", true),
            ("YES", true),
            ("on", true),
            ("false", false),
            ("0", false),
            ("", false),
        ] {
            let mut p = params(Some("lang-en"), Some("cats"));
            p.full = Some(value.into());
            assert_eq!(parse(p).unwrap().full, expected, "{value}");
        }
    }
}
