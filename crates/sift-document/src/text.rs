//! Text normalization applied while building documents.
//!
//! Both functions are pure and deterministic. Neither folds case or diacritics; that is
//! left to the matcher so the stored text stays exactly as published.

/// Collapses every run of line breaks (CR, LF, CRLF) into one space and trims the result.
///
/// Idempotent: `clean(&clean(s)) == clean(s)`.
pub fn clean(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_break = false;
    for ch in s.chars() {
        if ch == '\r' || ch == '\n' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(ch);
            in_break = false;
        }
    }
    out.trim().to_string()
}

/// Splits text into sentence units.
///
/// A unit ends at a period that is not followed by an ASCII digit, so decimals such as
/// `3.14` stay intact. The period stays with the unit it ends. Every unit is passed through
/// [`clean`] and empty units are dropped.
pub fn split(s: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if ch == '.' && !chars.peek().is_some_and(char::is_ascii_digit) {
            push_unit(&mut sentences, &current);
            current.clear();
        }
    }
    push_unit(&mut sentences, &current);

    sentences
}

/// Cleans `unit` and appends it unless it is empty.
fn push_unit(sentences: &mut Vec<String>, unit: &str) {
    let cleaned = clean(unit);
    if !cleaned.is_empty() {
        sentences.push(cleaned);
    }
}
