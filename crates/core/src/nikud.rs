//! Nikud (vowel and cantillation mark) removal.
//!
//! Verse text carries nikud while typed queries usually do not, so matching
//! happens on stripped text. [`StrippedText`] keeps a byte offset map back into
//! the original so match ranges can be highlighted on the pointed text.

use std::ops::Range;

/// First code point treated as nikud (etnahta).
pub const NIKUD_START: char = '\u{0591}';

/// Last code point treated as nikud (qamats qatan).
pub const NIKUD_END: char = '\u{05C7}';

/// Whether `c` is a Hebrew diacritical mark.
#[must_use]
pub const fn is_nikud(c: char) -> bool {
    matches!(c, NIKUD_START..=NIKUD_END)
}

/// Remove every nikud mark from `text`.
#[must_use]
pub fn strip_nikud(text: &str) -> String {
    text.chars().filter(|c| !is_nikud(*c)).collect()
}

/// Text with nikud removed plus the mapping back to the original.
#[derive(Debug, Clone)]
pub struct StrippedText<'a> {
    original: &'a str,
    stripped: String,
    /// `offsets[i]` is the original byte offset of the character that covers
    /// stripped byte `i`; the final entry maps the end of the stripped text to
    /// the end of the original.
    offsets: Vec<usize>,
}

impl<'a> StrippedText<'a> {
    #[must_use]
    pub fn new(original: &'a str) -> Self {
        let mut stripped = String::with_capacity(original.len());
        let mut offsets = Vec::with_capacity(original.len().saturating_add(1));

        for (position, c) in original.char_indices().filter(|(_, c)| !is_nikud(*c)) {
            stripped.push(c);
            offsets.extend(std::iter::repeat_n(position, c.len_utf8()));
        }
        offsets.push(original.len());

        Self {
            original,
            stripped,
            offsets,
        }
    }

    /// The text the offsets refer back to.
    #[must_use]
    pub const fn original(&self) -> &'a str {
        self.original
    }

    /// The text with nikud removed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.stripped
    }

    /// Project a byte range of the stripped text onto the original.
    ///
    /// The end is moved to the start of the next kept character, so marks that
    /// trail the last matched letter stay inside the range. Returns `None` for
    /// ranges outside the stripped text.
    #[must_use]
    pub fn to_original(&self, range: Range<usize>) -> Option<Range<usize>> {
        if range.start > range.end {
            return None;
        }
        let start = *self.offsets.get(range.start)?;
        let end = *self.offsets.get(range.end)?;
        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const BERESHIT: &str = "בְּרֵאשִׁית בָּרָא";

    #[test]
    fn test_strip_removes_points() {
        assert_eq!(strip_nikud(BERESHIT), "בראשית ברא");
    }

    #[test]
    fn test_strip_keeps_plain_text() {
        assert_eq!(strip_nikud("hello שלום"), "hello שלום");
        assert_eq!(strip_nikud(""), "");
    }

    #[test]
    fn test_cantillation_is_removed() {
        // tipcha (U+0596) and sof pasuq (U+05C3) are both inside the range
        assert_eq!(
            strip_nikud("\u{05D0}\u{05B6}\u{0596}\u{05E8}\u{05B6}\u{05E5}\u{05C3}"),
            "ארץ"
        );
    }

    #[test]
    fn test_maqaf_is_treated_as_nikud() {
        assert_eq!(strip_nikud("\u{05DB}\u{05BC}\u{05B8}\u{05DC}\u{05BE}"), "כל");
    }

    #[test]
    fn test_stripped_text_matches_strip_nikud() {
        let text = StrippedText::new(BERESHIT);
        assert_eq!(text.as_str(), strip_nikud(BERESHIT));
        assert_eq!(text.original(), BERESHIT);
    }

    #[test]
    fn test_projection_covers_trailing_marks() {
        let text = StrippedText::new(BERESHIT);
        let start = text.as_str().rfind("ברא").unwrap();
        let range = text.to_original(start..start + "ברא".len()).unwrap();
        assert_eq!(Some(&BERESHIT[range]), BERESHIT.split(' ').nth(1));
    }

    #[test]
    fn test_projection_of_first_word() {
        let text = StrippedText::new(BERESHIT);
        let range = text.to_original(0.."בראשית".len()).unwrap();
        assert_eq!(Some(&BERESHIT[range]), BERESHIT.split(' ').next());
    }

    #[test]
    fn test_projection_out_of_bounds() {
        let text = StrippedText::new("אב");
        assert!(text.to_original(0..100).is_none());
        assert!(text.to_original(2..1).is_none());
    }

    #[test]
    fn test_empty_text_projection() {
        let text = StrippedText::new("");
        assert_eq!(text.to_original(0..0), Some(0..0));
    }
}
