//! Case folding for match structures.

/// A field value paired with its case-folded characters.
///
/// Folding maps each character to the first character of its lowercase form, so character
/// indices in the folded sequence line up one-to-one with the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedText {
    /// The original value.
    text: String,
    /// Lowercased characters, aligned with `text.chars()`.
    chars: Vec<char>,
}

impl FoldedText {
    /// Folds `text`.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            chars: fold(text),
        }
    }

    /// The original value.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The folded characters.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

/// Lowercases `text` one character at a time, preserving character positions.
pub fn fold(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_lowercases() {
        assert_eq!(fold("Hello WORLD"), "hello world".chars().collect::<Vec<_>>());
    }

    #[test]
    fn fold_keeps_diacritics() {
        assert_eq!(fold("Čeština"), "čeština".chars().collect::<Vec<_>>());
    }

    #[test]
    fn fold_preserves_length_for_multi_char_lowercase() {
        // 'İ' lowercases to two characters; only the first is kept.
        let text = "İstanbul";
        assert_eq!(fold(text).len(), text.chars().count());
        assert_eq!(fold(text)[0], 'i');
    }

    #[test]
    fn folded_text_keeps_original() {
        let folded = FoldedText::new("Hello");
        assert_eq!(folded.as_str(), "Hello");
        assert_eq!(folded.chars(), &['h', 'e', 'l', 'l', 'o']);
    }
}
