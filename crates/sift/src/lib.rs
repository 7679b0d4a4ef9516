//! sift: fuzzy search for static multi-locale sites.
//!
//! Each configured site (typically one per language of a static site) is crawled through
//! its sitemap, its posts are extracted and normalized, and an in-memory fuzzy index is
//! built. Queries are answered over HTTP from the last successfully built index; rebuilds
//! replace it atomically.
//!
//! The pieces:
//! - [`SiteRegistry`] owns the site instances and their current indices
//! - [`SearchService`] validates requests and renders ranked results
//! - [`spawn_indexers`] runs the initial and periodic builds
//! - [`http::router`] exposes the service as `GET /`

#![warn(missing_docs)]

mod error;
pub mod http;
mod indexer;
mod registry;
mod service;

pub use error::{QueryError, RebuildError};
pub use indexer::spawn_indexers;
pub use registry::{SiteInstance, SiteRegistry};
pub use service::{SearchParams, SearchRequest, SearchResult, SearchService};
