//! The per-site searchable index.

use sift_config::FieldWeights;
use sift_document::Document;

use crate::{
    bitap::Pattern,
    fold::FoldedText,
    options::MatchOptions,
    rank::{Field, FieldMatch, Hit, combine_scores, sort_hits},
};

/// Folded match structures for one document.
#[derive(Debug, Clone)]
struct DocumentFields {
    /// Folded title.
    title: FoldedText,
    /// Folded content sentences.
    content: Vec<FoldedText>,
    /// Folded tags.
    tags: Vec<FoldedText>,
}

impl DocumentFields {
    /// Folds every searchable value of `document`.
    fn new(document: &Document) -> Self {
        Self {
            title: FoldedText::new(&document.title),
            content: document.content.iter().map(|s| FoldedText::new(s)).collect(),
            tags: document.tags.iter().map(|t| FoldedText::new(t)).collect(),
        }
    }

    /// Matches `pattern` against every value, title first.
    fn matches(&self, pattern: &Pattern) -> Vec<FieldMatch> {
        let mut matches = Vec::new();
        if let Some(m) = match_value(pattern, Field::Title, None, &self.title) {
            matches.push(m);
        }
        for (i, value) in self.content.iter().enumerate() {
            matches.extend(match_value(pattern, Field::Content, Some(i), value));
        }
        for (i, value) in self.tags.iter().enumerate() {
            matches.extend(match_value(pattern, Field::Tags, Some(i), value));
        }
        matches
    }
}

/// Matches one field value.
fn match_value(
    pattern: &Pattern,
    field: Field,
    index: Option<usize>,
    value: &FoldedText,
) -> Option<FieldMatch> {
    let result = pattern.search(value)?;
    Some(FieldMatch {
        field,
        index,
        value: value.as_str().to_string(),
        score: result.score,
        spans: result.spans,
    })
}

/// An immutable, searchable snapshot of one site's documents.
///
/// Built in one step from the full document set; there is no way to add or remove
/// documents afterwards. Rebuilding a site produces a new `SiteIndex`.
#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    /// Documents in crawl order.
    documents: Vec<Document>,
    /// Match structures, parallel to `documents`.
    fields: Vec<DocumentFields>,
}

impl SiteIndex {
    /// Builds an index over `documents`, preserving their order.
    pub fn build(documents: Vec<Document>) -> Self {
        let fields = documents.iter().map(DocumentFields::new).collect();
        Self { documents, fields }
    }

    /// Returns the indexed documents in order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Returns the number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Searches the index, returning every matching document best first.
    ///
    /// A document matches when at least one of its field values matches the query. Ties
    /// keep index order. An empty query matches nothing.
    pub fn search(
        &self,
        query: &str,
        options: &MatchOptions,
        weights: &FieldWeights,
    ) -> Vec<Hit<'_>> {
        let pattern = Pattern::new(query, options.clone());
        if pattern.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<Hit<'_>> = self
            .documents
            .iter()
            .zip(&self.fields)
            .enumerate()
            .filter_map(|(position, (document, fields))| {
                let matches = fields.matches(&pattern);
                let score = combine_scores(&matches, weights)?;
                Some(Hit {
                    document,
                    position,
                    score,
                    matches,
                })
            })
            .collect();

        sort_hits(&mut hits);
        hits
    }
}
