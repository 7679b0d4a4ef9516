//! Fuzzy matching, indexing and ranking for sift.
//!
//! A [`SiteIndex`] holds one site's documents together with case-folded copies of every
//! searchable value. Queries are compiled into a Bitap [`Pattern`] and matched against
//! each title, content sentence and tag; per-field scores are then combined with the
//! configured [`FieldWeights`](sift_config::FieldWeights) into a ranked list of [`Hit`]s.
//!
//! Scores run from 0 (perfect) to 1, and lower is better throughout.

#![warn(missing_docs)]

mod bitap;
mod fold;
mod index;
mod options;
mod rank;
mod spans;

pub use bitap::{MatchResult, Pattern};
pub use fold::{FoldedText, fold};
pub use index::SiteIndex;
pub use options::MatchOptions;
pub use rank::{Field, FieldMatch, Hit, combine_scores, sort_hits, truncate};
pub use spans::{Span, mask_to_spans, merge_spans};
