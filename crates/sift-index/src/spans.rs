//! Character spans used for highlighting matched text.

use serde::Serialize;

/// An inclusive range of character indices within a field value.
///
/// Serialized as a two-element array `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "[usize; 2]")]
pub struct Span {
    /// Index of the first matched character.
    pub start: usize,
    /// Index of the last matched character.
    pub end: usize,
}

impl Span {
    /// Creates a span covering `start..=end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }
}

impl From<Span> for [usize; 2] {
    fn from(span: Span) -> Self {
        [span.start, span.end]
    }
}

/// Merges spans, combining overlapping or adjacent ones.
///
/// The result is sorted by start position with no overlaps.
pub fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    if spans.is_empty() {
        return spans;
    }

    spans.sort_by_key(|s| s.start);

    let mut merged = Vec::with_capacity(spans.len());
    let mut current = spans[0];

    for span in spans.into_iter().skip(1) {
        if span.start <= current.end + 1 {
            current.end = current.end.max(span.end);
        } else {
            merged.push(current);
            current = span;
        }
    }
    merged.push(current);

    merged
}

/// Collects runs of `true` in `mask` as spans, dropping runs shorter than `min_len`.
pub fn mask_to_spans(mask: &[bool], offset: usize, min_len: usize) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &hit) in mask.iter().enumerate() {
        match (hit, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                push_run(&mut spans, offset + start, offset + i - 1, min_len);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        push_run(&mut spans, offset + start, offset + mask.len() - 1, min_len);
    }

    spans
}

/// Appends `start..=end` unless it is shorter than `min_len`.
fn push_run(spans: &mut Vec<Span>, start: usize, end: usize, min_len: usize) {
    let span = Span::new(start, end);
    if span.len() >= min_len {
        spans.push(span);
    }
}
