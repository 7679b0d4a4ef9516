//! Combining per-field matches into ranked hits.

use serde::Serialize;
use sift_config::FieldWeights;
use sift_document::Document;

use crate::spans::Span;

/// A searchable document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// The document title, matched as one string.
    Title,
    /// Content sentences, matched one at a time.
    Content,
    /// Tags, matched one at a time.
    Tags,
}

impl Field {
    /// All fields, in the order they are matched and reported.
    pub const ALL: [Self; 3] = [Self::Title, Self::Content, Self::Tags];

    /// Returns the field name used in results.
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Tags => "tags",
        }
    }

    /// Returns this field's configured weight.
    pub fn weight(self, weights: &FieldWeights) -> f64 {
        match self {
            Self::Title => weights.title,
            Self::Content => weights.content,
            Self::Tags => weights.tags,
        }
    }
}

/// One matched field value, with what a client needs to highlight it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMatch {
    /// Field the value belongs to.
    pub field: Field,
    /// Position of the value within an array field. Absent for the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// The matched value as stored in the document.
    pub value: String,
    /// Match score, 0 being perfect.
    pub score: f64,
    /// Matched character spans within `value`.
    pub spans: Vec<Span>,
}

/// A document that matched a query.
#[derive(Debug, Clone)]
pub struct Hit<'a> {
    /// The matched document.
    pub document: &'a Document,
    /// Position of the document in the index.
    pub position: usize,
    /// Combined score, 0 being perfect.
    pub score: f64,
    /// Every matched field value, title first, then content, then tags.
    pub matches: Vec<FieldMatch>,
}

impl Hit<'_> {
    /// Returns the best field score for `field`, if any value of it matched.
    pub fn field_score(&self, field: Field) -> Option<f64> {
        field_score(&self.matches, field)
    }

    /// Builds a short excerpt for the hit.
    ///
    /// Uses the best-scoring matched content sentence, or the document's first sentence
    /// when no content sentence matched, truncated to `max_chars` characters.
    pub fn summary(&self, max_chars: usize) -> String {
        let best = self
            .matches
            .iter()
            .filter(|m| m.field == Field::Content)
            .min_by(|a, b| a.score.total_cmp(&b.score));
        let text = match best {
            Some(m) => m.value.as_str(),
            None => self.document.lead().unwrap_or_default(),
        };
        truncate(text, max_chars)
    }
}

/// Best (lowest) score among the matches for one field.
fn field_score(matches: &[FieldMatch], field: Field) -> Option<f64> {
    matches
        .iter()
        .filter(|m| m.field == field)
        .map(|m| m.score)
        .min_by(f64::total_cmp)
}

/// Combines per-field scores into one document score.
///
/// The result is the weighted average of the best score of each matched field. Fields
/// that did not match do not contribute. If every matched field has zero weight the plain
/// mean is used instead.
pub fn combine_scores(matches: &[FieldMatch], weights: &FieldWeights) -> Option<f64> {
    let scores: Vec<(f64, f64)> = Field::ALL
        .iter()
        .filter_map(|&field| field_score(matches, field).map(|s| (field.weight(weights), s)))
        .collect();
    if scores.is_empty() {
        return None;
    }

    let total_weight: f64 = scores.iter().map(|(w, _)| w).sum();
    if total_weight > 0.0 {
        Some(scores.iter().map(|(w, s)| w * s).sum::<f64>() / total_weight)
    } else {
        Some(scores.iter().map(|(_, s)| s).sum::<f64>() / scores.len() as f64)
    }
}

/// Sorts hits best first. Equal scores keep index order.
pub fn sort_hits(hits: &mut [Hit<'_>]) {
    hits.sort_by(|a, b| a.score.total_cmp(&b.score));
}

/// Truncates `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let kept: String = text.chars().take(max_chars - 1).collect();
    format!("{}…", kept.trim_end())
}
