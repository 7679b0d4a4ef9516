//! Error types for the search service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sift_crawl::CrawlError;
use thiserror::Error;

/// Errors answering a search query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A required parameter is missing or the query is too short.
    #[error("{0}")]
    InvalidRequest(String),

    /// No site instance has the requested id.
    #[error("site not found: {0}")]
    SiteNotFound(String),

    /// The site exists but its first index build has not completed.
    #[error("index for site {0} is not ready yet, try again later")]
    IndexNotReady(String),
}

impl QueryError {
    /// HTTP status code for this error.
    ///
    /// Invalid requests answer 500, which is what existing clients of the endpoint
    /// expect.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SiteNotFound(_) => StatusCode::NOT_FOUND,
            Self::IndexNotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Errors rebuilding a site index.
#[derive(Debug, Error)]
pub enum RebuildError {
    /// No site instance has the requested id.
    #[error("site not found: {0}")]
    UnknownSite(String),

    /// The crawl failed as a whole.
    #[error(transparent)]
    Crawl(#[from] CrawlError),
}
