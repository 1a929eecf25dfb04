//! The books of the Tanakh with their Hebrew and Sefaria titles.

use serde::Serialize;

/// A canonical book: the Hebrew title used as the corpus key and the English
/// title used by Sefaria and the commentary data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookName {
    pub hebrew: &'static str,
    pub english: &'static str,
}

const fn book(hebrew: &'static str, english: &'static str) -> BookName {
    BookName { hebrew, english }
}

/// Torah, Nevi'im and Ketuvim in canonical order.
pub static TANAKH: [BookName; 39] = [
    // Torah
    book("בראשית", "Genesis"),
    book("שמות", "Exodus"),
    book("ויקרא", "Leviticus"),
    book("במדבר", "Numbers"),
    book("דברים", "Deuteronomy"),
    // Nevi'im
    book("יהושע", "Joshua"),
    book("שופטים", "Judges"),
    book("שמואל א", "I Samuel"),
    book("שמואל ב", "II Samuel"),
    book("מלכים א", "I Kings"),
    book("מלכים ב", "II Kings"),
    book("ישעיהו", "Isaiah"),
    book("ירמיהו", "Jeremiah"),
    book("יחזקאל", "Ezekiel"),
    book("הושע", "Hosea"),
    book("יואל", "Joel"),
    book("עמוס", "Amos"),
    book("עובדיה", "Obadiah"),
    book("יונה", "Jonah"),
    book("מיכה", "Micah"),
    book("נחום", "Nahum"),
    book("חבקוק", "Habakkuk"),
    book("צפניה", "Zephaniah"),
    book("חגי", "Haggai"),
    book("זכריה", "Zechariah"),
    book("מלאכי", "Malachi"),
    // Ketuvim
    book("תהילים", "Psalms"),
    book("משלי", "Proverbs"),
    book("איוב", "Job"),
    book("שיר השירים", "Song of Songs"),
    book("רות", "Ruth"),
    book("איכה", "Lamentations"),
    book("קהלת", "Ecclesiastes"),
    book("אסתר", "Esther"),
    book("דניאל", "Daniel"),
    book("עזרא", "Ezra"),
    book("נחמיה", "Nehemiah"),
    book("דברי הימים א", "I Chronicles"),
    book("דברי הימים ב", "II Chronicles"),
];

/// The five books of the Torah.
#[must_use]
pub fn torah() -> &'static [BookName] {
    TANAKH.get(..5).unwrap_or(&[])
}

/// Look up a book by its Hebrew title.
#[must_use]
pub fn by_hebrew(hebrew: &str) -> Option<&'static BookName> {
    TANAKH.iter().find(|book| book.hebrew == hebrew)
}

/// Look up a book by its English title, ignoring ASCII case.
#[must_use]
pub fn by_english(english: &str) -> Option<&'static BookName> {
    TANAKH
        .iter()
        .find(|book| book.english.eq_ignore_ascii_case(english))
}

/// English title for a Hebrew corpus key.
#[must_use]
pub fn english_name(hebrew: &str) -> Option<&'static str> {
    by_hebrew(hebrew).map(|book| book.english)
}

/// Resolve a user-supplied name in either language.
#[must_use]
pub fn resolve(name: &str) -> Option<&'static BookName> {
    let name = name.trim();
    by_hebrew(name).or_else(|| by_english(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torah_mapping() {
        assert_eq!(english_name("בראשית"), Some("Genesis"));
        assert_eq!(english_name("דברים"), Some("Deuteronomy"));
        assert_eq!(torah().len(), 5);
    }

    #[test]
    fn test_resolve_either_language() {
        assert_eq!(resolve("exodus").map(|b| b.hebrew), Some("שמות"));
        assert_eq!(resolve(" רות ").map(|b| b.english), Some("Ruth"));
        assert!(resolve("Maccabees").is_none());
    }

    #[test]
    fn test_titles_are_unique() {
        for (i, a) in TANAKH.iter().enumerate() {
            for b in TANAKH.iter().skip(i + 1) {
                assert_ne!(a.hebrew, b.hebrew);
                assert_ne!(a.english, b.english);
            }
        }
    }
}
