//! Parameters for the fuzzy matcher.

use sift_config::{MAX_PATTERN_LENGTH, SearchSettings};

/// Parameters controlling approximate matching.
///
/// The score of a candidate match is
/// `errors / pattern_length + |actual_location - location| / distance`,
/// where 0 is a perfect match at the expected position. Candidates scoring above
/// `threshold` are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    /// Maximum accepted score. Default: 0.6.
    pub threshold: f64,
    /// Character position where matches are expected. Default: 0.
    pub location: usize,
    /// Offset at which the location penalty alone reaches 1.0. Default: 100.
    pub distance: usize,
    /// Minimum length of a highlight span. Default: 1.
    pub min_match_char_length: usize,
    /// Patterns longer than this use token matching instead of Bitap. Default: 32, capped at 64.
    pub max_pattern_length: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::from(&SearchSettings::default())
    }
}

impl From<&SearchSettings> for MatchOptions {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            threshold: settings.threshold,
            location: settings.location,
            distance: settings.distance,
            min_match_char_length: settings.min_match_char_length.max(1),
            max_pattern_length: settings.max_pattern_length.min(MAX_PATTERN_LENGTH),
        }
    }
}

impl MatchOptions {
    /// Sets the match threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the expected match location.
    pub fn with_location(mut self, location: usize) -> Self {
        self.location = location;
        self
    }

    /// Sets the location penalty distance.
    pub fn with_distance(mut self, distance: usize) -> Self {
        self.distance = distance;
        self
    }

    /// Sets the minimum highlight span length.
    pub fn with_min_match_char_length(mut self, length: usize) -> Self {
        self.min_match_char_length = length.max(1);
        self
    }

    /// Sets the maximum Bitap pattern length, capped at the bit-vector width.
    pub fn with_max_pattern_length(mut self, length: usize) -> Self {
        self.max_pattern_length = length.min(MAX_PATTERN_LENGTH);
        self
    }
}
