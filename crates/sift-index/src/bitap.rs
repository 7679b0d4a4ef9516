//! Bitap approximate string matching.
//!
//! A query is compiled once into a [`Pattern`] (folded characters plus one bit mask per
//! distinct character) and then run against every field value. For each allowed error
//! count, starting at zero, the matcher:
//!
//! 1. Binary-searches how far from the expected location a match may lie and still score
//!    within the current threshold.
//! 2. Scans that window right to left with the shift-and recurrence, where a set high bit
//!    marks a full pattern match starting at the current position.
//! 3. Tightens the threshold to every better match found, so later error levels only
//!    accept improvements.
//!
//! Matching stops once even a perfectly placed match with one more error could not beat
//! the best score so far.

use std::collections::HashMap;

use crate::{
    fold::{FoldedText, fold},
    options::MatchOptions,
    spans::{Span, mask_to_spans, merge_spans},
};

/// Score given to matches found by the token fallback for long patterns.
const TOKEN_MATCH_SCORE: f64 = 0.5;

/// Outcome of matching a pattern against one field value.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Match quality in `[0, 1]`, 0 being perfect.
    pub score: f64,
    /// Matched character spans, sorted and non-overlapping.
    pub spans: Vec<Span>,
}

/// Best candidate seen while scanning.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Start of the match in the text.
    location: i64,
    /// Errors allowed when it was found.
    errors: i64,
    /// Its score.
    score: f64,
}

/// A compiled query.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Folded query characters.
    chars: Vec<char>,
    /// Bit mask per character, with the first pattern character in the highest bit.
    /// Empty when the pattern is too long for Bitap.
    alphabet: HashMap<char, u64>,
    /// Matching parameters.
    options: MatchOptions,
}

impl Pattern {
    /// Compiles `query` with the given options.
    pub fn new(query: &str, options: MatchOptions) -> Self {
        let chars = fold(query);
        let mut alphabet = HashMap::new();
        if chars.len() <= options.max_pattern_length {
            let len = chars.len();
            for (i, &c) in chars.iter().enumerate() {
                *alphabet.entry(c).or_insert(0) |= 1u64 << (len - i - 1);
            }
        }
        Self {
            chars,
            alphabet,
            options,
        }
    }

    /// Returns true if the pattern has no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Returns the options the pattern was compiled with.
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Matches the pattern against a folded field value.
    ///
    /// Returns `None` when nothing scores within the threshold or when no highlight span
    /// survives the minimum span length.
    pub fn search(&self, text: &FoldedText) -> Option<MatchResult> {
        let text = text.chars();
        if self.chars.is_empty() || text.is_empty() {
            return None;
        }

        if self.chars == text {
            return Some(MatchResult {
                score: 0.0,
                spans: vec![Span::new(0, text.len() - 1)],
            });
        }

        if self.chars.len() > self.options.max_pattern_length {
            return self.token_search(text);
        }

        self.bitap_search(text)
    }

    /// Scores a match with `errors` errors starting at `location`.
    fn score(&self, errors: i64, location: i64) -> f64 {
        let accuracy = errors as f64 / self.chars.len() as f64;
        let proximity = (self.options.location as i64 - location).abs();
        if self.options.distance == 0 {
            return if proximity == 0 { accuracy } else { 1.0 };
        }
        accuracy + proximity as f64 / self.options.distance as f64
    }

    /// Runs the Bitap search over `text`.
    #[allow(clippy::cognitive_complexity)]
    fn bitap_search(&self, text: &[char]) -> Option<MatchResult> {
        let pattern_len = self.chars.len() as i64;
        let text_len = text.len() as i64;
        let expected = self.options.location as i64;
        let mut threshold = self.options.threshold;

        // Exact occurrences near the expected location bound what fuzzy matches must beat.
        if let Some(loc) = find_from(text, &self.chars, self.options.location) {
            threshold = threshold.min(self.score(0, loc as i64));
            let from = self.options.location + self.chars.len();
            if let Some(loc) = rfind_from(text, &self.chars, from) {
                threshold = threshold.min(self.score(0, loc as i64));
            }
        }

        let high_bit = 1u64 << (pattern_len - 1);
        let mut best: Option<Candidate> = None;
        let mut bin_max = pattern_len + text_len;
        let mut last_bits: Vec<u64> = Vec::new();

        for errors in 0..pattern_len {
            let mut bin_min = 0;
            let mut bin_mid = bin_max;
            while bin_min < bin_mid {
                if self.score(errors, expected + bin_mid) <= threshold {
                    bin_min = bin_mid;
                } else {
                    bin_max = bin_mid;
                }
                bin_mid = (bin_max - bin_min) / 2 + bin_min;
            }
            bin_max = bin_mid;

            let mut start = (expected - bin_mid + 1).max(1);
            let finish = (expected + bin_mid).min(text_len) + pattern_len;

            let mut bits = vec![0u64; (finish + 2) as usize];
            bits[(finish + 1) as usize] = (1u64 << errors) - 1;

            let mut j = finish;
            while j >= start {
                let location = j - 1;
                let idx = j as usize;
                let char_mask = text
                    .get(location as usize)
                    .and_then(|c| self.alphabet.get(c))
                    .copied()
                    .unwrap_or(0);

                bits[idx] = ((bits[idx + 1] << 1) | 1) & char_mask;
                if errors != 0 {
                    let diag = last_bits.get(idx + 1).copied().unwrap_or(0);
                    let up = last_bits.get(idx).copied().unwrap_or(0);
                    bits[idx] |= (((diag | up) << 1) | 1) | diag;
                }

                if bits[idx] & high_bit != 0 {
                    let score = self.score(errors, location);
                    if score <= threshold {
                        threshold = score;
                        best = Some(Candidate {
                            location,
                            errors,
                            score,
                        });
                        if location <= expected {
                            break;
                        }
                        start = (2 * expected - location).max(1);
                    }
                }
                j -= 1;
            }

            if self.score(errors + 1, expected) > threshold {
                break;
            }
            last_bits = bits;
        }

        let best = best?;
        let spans = self.region_spans(text, best);
        if spans.is_empty() {
            return None;
        }
        Some(MatchResult {
            score: best.score.min(1.0),
            spans,
        })
    }

    /// Highlights pattern characters inside the region covered by the best match.
    fn region_spans(&self, text: &[char], best: Candidate) -> Vec<Span> {
        let start = (best.location as usize).min(text.len());
        let end = (start + self.chars.len() + best.errors as usize).min(text.len());
        let mask: Vec<bool> = text[start..end]
            .iter()
            .map(|c| self.alphabet.contains_key(c))
            .collect();
        mask_to_spans(&mask, start, self.options.min_match_char_length)
    }

    /// Literal token matching used for patterns too long for Bitap.
    ///
    /// Every occurrence of every whitespace-separated query token is highlighted.
    fn token_search(&self, text: &[char]) -> Option<MatchResult> {
        if TOKEN_MATCH_SCORE > self.options.threshold {
            return None;
        }

        let mut spans = Vec::new();
        for token in self
            .chars
            .split(|c| c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let mut from = 0;
            while let Some(pos) = find_from(text, token, from) {
                spans.push(Span::new(pos, pos + token.len() - 1));
                from = pos + 1;
            }
        }

        let min_len = self.options.min_match_char_length;
        let spans: Vec<Span> = merge_spans(spans)
            .into_iter()
            .filter(|s| s.len() >= min_len)
            .collect();
        if spans.is_empty() {
            return None;
        }
        Some(MatchResult {
            score: TOKEN_MATCH_SCORE,
            spans,
        })
    }
}

/// Finds the first occurrence of `needle` in `haystack` starting at or after `from`.
fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let last_start = haystack.len() - needle.len();
    (from..=last_start).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Finds the last occurrence of `needle` in `haystack` starting at or before `from`.
fn rfind_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let last_start = (haystack.len() - needle.len()).min(from);
    (0..=last_start)
        .rev()
        .find(|&i| haystack[i..i + needle.len()] == *needle)
}
