//! The text source abstraction and the chapter payload it returns.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// Text as delivered by Sefaria: a string, a (possibly nested) list, or null.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(untagged)]
pub enum TextNode {
    Text(String),
    List(Vec<TextNode>),
    #[default]
    Empty,
}

impl TextNode {
    /// Every string under this node, in document order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::List(items) => items.iter().flat_map(Self::leaves).collect(),
            Self::Empty => Vec::new(),
        }
    }

    /// Read a chapter of scripture: one string per verse. A nested verse is
    /// joined with spaces.
    #[must_use]
    pub fn into_verses(self) -> Vec<String> {
        match self {
            Self::Text(text) => vec![text],
            Self::List(items) => items.iter().map(|item| item.leaves().join(" ")).collect(),
            Self::Empty => Vec::new(),
        }
    }

    /// Read a chapter of commentary: a list of fragments per verse.
    #[must_use]
    pub fn into_fragments(self) -> Vec<Vec<String>> {
        match self {
            Self::Text(text) => vec![vec![text]],
            Self::List(items) => items
                .iter()
                .map(|item| {
                    item.leaves()
                        .into_iter()
                        .filter(|fragment| !fragment.trim().is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .collect(),
            Self::Empty => Vec::new(),
        }
    }
}

/// One fetched section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChapterPayload {
    /// The canonical reference of the section, e.g. `Genesis 1`.
    #[serde(rename = "ref", default)]
    pub reference: String,
    /// Hebrew text.
    #[serde(default)]
    pub he: TextNode,
    /// Reference of the following section, if any.
    #[serde(default)]
    pub next: Option<String>,
    /// Set by the API instead of a text when the reference is unknown.
    #[serde(default)]
    pub error: Option<String>,
}

/// Something that can return a section of text by reference.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Fetch one section such as `Genesis.1` or `Rashi on Genesis.1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the section cannot be fetched or decoded.
    async fn fetch(&self, reference: &str) -> Result<ChapterPayload>;
}

/// Chapter number `next` points to, provided it is still inside `book_ref`.
///
/// Accepts `Genesis 2`, `Genesis.2` and `Rashi on Genesis 2:1` style references.
#[must_use]
pub fn chapter_in(next: &str, book_ref: &str) -> Option<usize> {
    let rest = next.strip_prefix(book_ref)?;
    let rest = rest.strip_prefix(' ').or_else(|| rest.strip_prefix('.'))?;
    rest.split([':', '.', ' ']).next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_payload_decodes_chapter() {
        let payload: ChapterPayload = serde_json::from_str(
            r#"{"ref": "Genesis 1", "he": ["בראשית", "והארץ"], "next": "Genesis 2", "book": "Genesis"}"#,
        )
        .unwrap();
        assert_eq!(payload.reference, "Genesis 1");
        assert_eq!(payload.next.as_deref(), Some("Genesis 2"));
        assert_eq!(payload.he.into_verses(), vec!["בראשית", "והארץ"]);
    }

    #[test]
    fn test_payload_decodes_commentary_with_nulls() {
        let payload: ChapterPayload = serde_json::from_str(
            r#"{"ref": "Rashi on Genesis 1", "he": [["a", "b"], [], null, ["c"]], "next": null}"#,
        )
        .unwrap();
        assert!(payload.next.is_none());
        assert_eq!(
            payload.he.into_fragments(),
            vec![vec!["a".to_string(), "b".to_string()], vec![], vec![], vec!["c".to_string()]]
        );
    }

    #[test]
    fn test_payload_error_field() {
        let payload: ChapterPayload =
            serde_json::from_str(r#"{"error": "Couldn't find text"}"#).unwrap();
        assert_eq!(payload.error.as_deref(), Some("Couldn't find text"));
        assert_eq!(payload.he, TextNode::Empty);
    }

    #[test]
    fn test_nested_verse_is_joined() {
        let node = TextNode::List(vec![
            TextNode::Text("a".to_string()),
            TextNode::List(vec![TextNode::Text("b".to_string()), TextNode::Text("c".to_string())]),
        ]);
        assert_eq!(node.into_verses(), vec!["a", "b c"]);
    }

    #[test]
    fn test_chapter_in_book() {
        assert_eq!(chapter_in("Genesis 2", "Genesis"), Some(2));
        assert_eq!(chapter_in("Genesis.50", "Genesis"), Some(50));
        assert_eq!(chapter_in("Rashi on Genesis 3:1", "Rashi on Genesis"), Some(3));
        assert_eq!(chapter_in("Exodus 1", "Genesis"), None);
        assert_eq!(chapter_in("I Samuel 1", "I Samuel"), Some(1));
        assert_eq!(chapter_in("II Samuel 1", "I Samuel"), None);
        assert_eq!(chapter_in("Song of Songs 2", "Song of Songs"), Some(2));
    }
}
