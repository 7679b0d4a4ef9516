//! Document model and text normalization for sift.
//!
//! This crate turns the fields extracted from a crawled page into a normalized
//! [`Document`]:
//! - line breaks collapsed and whitespace trimmed ([`clean`])
//! - the body split into sentence units ([`split`])
//! - pages with no body text rejected

#![warn(missing_docs)]

mod text;

use serde::{Deserialize, Serialize};
pub use text::{clean, split};

/// Fields extracted from a page recognized as a post, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    /// Title text as extracted.
    pub title: String,
    /// Body text as extracted.
    pub content: String,
    /// Tag texts as extracted, in page order.
    pub tags: Vec<String>,
    /// Absolute URL of the page.
    pub url: String,
}

/// One indexed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Cleaned single-line title.
    pub title: String,
    /// Body split into sentence units, in page order.
    pub content: Vec<String>,
    /// Absolute URL of the page.
    pub url: String,
    /// Distinct tags in first-seen order.
    pub tags: Vec<String>,
}

impl Document {
    /// Normalizes a raw page into a document.
    ///
    /// Returns `None` when the cleaned body is empty, regardless of title and tags.
    pub fn from_raw(raw: RawPage) -> Option<Self> {
        let content = clean(&raw.content);
        if content.is_empty() {
            return None;
        }

        let mut tags: Vec<String> = Vec::with_capacity(raw.tags.len());
        for tag in &raw.tags {
            let tag = clean(tag);
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Some(Self {
            title: clean(&raw.title),
            content: split(&content),
            url: raw.url,
            tags,
        })
    }

    /// Returns the first content sentence, if any.
    pub fn lead(&self) -> Option<&str> {
        self.content.first().map(String::as_str)
    }
}
