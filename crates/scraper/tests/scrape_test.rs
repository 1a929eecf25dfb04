//! Scrape loop tests against an in-memory source and a local mock of the
//! Sefaria texts API.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use serde_json::json;
use tanakh_core::books::{self, BookName};
use tanakh_core::{CommentaryIndex, Corpus};
use tanakh_scraper::{
    CacheDir, ChapterPayload, Error, RASHI, Result, RetryPolicy, Scraper, SefariaClient,
    TextNode, TextSource,
};

/// Serves canned payloads; references listed in `flaky` fail with a 503 that
/// many times first.
#[derive(Default)]
struct FakeSource {
    payloads: HashMap<String, ChapterPayload>,
    flaky: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    fn chapter(mut self, reference: &str, verses: &[&str], next: Option<&str>) -> Self {
        let he = TextNode::List(verses.iter().map(|v| TextNode::Text((*v).to_string())).collect());
        self.payloads.insert(
            reference.to_string(),
            ChapterPayload {
                reference: reference.to_string(),
                he,
                next: next.map(str::to_string),
                error: None,
            },
        );
        self
    }

    fn commentary(mut self, reference: &str, verses: TextNode, next: Option<&str>) -> Self {
        self.payloads.insert(
            reference.to_string(),
            ChapterPayload {
                reference: reference.to_string(),
                he: verses,
                next: next.map(str::to_string),
                error: None,
            },
        );
        self
    }

    fn flaky(self, reference: &str, failures: u32) -> Self {
        self.flaky.lock().unwrap().insert(reference.to_string(), failures);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextSource for FakeSource {
    async fn fetch(&self, reference: &str) -> Result<ChapterPayload> {
        self.calls.lock().unwrap().push(reference.to_string());

        if let Some(remaining) = self.flaky.lock().unwrap().get_mut(reference) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Http {
                    status: 503,
                    reference: reference.to_string(),
                    message: "unavailable".to_string(),
                });
            }
        }

        self.payloads.get(reference).cloned().ok_or_else(|| Error::Api {
            reference: reference.to_string(),
            message: "unknown reference".to_string(),
        })
    }
}

fn book(english: &str) -> BookName {
    *books::by_english(english).unwrap()
}

fn scraper(source: FakeSource) -> Scraper<FakeSource> {
    Scraper::new(source)
        .with_retry_policy(RetryPolicy::fixed(3, 0))
        .with_request_delay(Duration::ZERO)
}

fn genesis_and_exodus() -> FakeSource {
    FakeSource::default()
        .chapter("Genesis.1", &["בראשית ברא", "והארץ היתה"], Some("Genesis 2"))
        .chapter("Genesis.2", &["ויכלו"], Some("Exodus 1"))
        .chapter("Exodus.1", &["ואלה שמות"], None)
}

#[tokio::test]
async fn test_scrape_book_follows_next_until_book_ends() {
    let scraper = scraper(genesis_and_exodus());
    let chapters = scraper.scrape_book(&book("Genesis")).await.unwrap();

    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0], vec!["בראשית ברא", "והארץ היתה"]);
    assert_eq!(scraper.source().calls(), vec!["Genesis.1", "Genesis.2"]);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let scraper = scraper(genesis_and_exodus().flaky("Genesis.2", 2));
    let chapters = scraper.scrape_book(&book("Genesis")).await.unwrap();

    assert_eq!(chapters.len(), 2);
    assert_eq!(scraper.source().calls().len(), 4);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let scraper = scraper(genesis_and_exodus().flaky("Genesis.1", 10));
    let result = scraper.scrape_book(&book("Genesis")).await;

    assert!(matches!(result, Err(Error::Http { status: 503, .. })));
    assert_eq!(scraper.source().calls().len(), 4);
}

#[tokio::test]
async fn test_commentary_fills_skipped_chapters() {
    let source = FakeSource::default()
        .commentary(
            "Rashi on Genesis.1",
            TextNode::List(vec![
                TextNode::List(vec![TextNode::Text("בראשית - אמר רבי יצחק".to_string())]),
                TextNode::Empty,
            ]),
            Some("Rashi on Genesis 3:1"),
        )
        .commentary(
            "Rashi on Genesis.3",
            TextNode::List(vec![TextNode::List(vec![TextNode::Text("והנחש".to_string())])]),
            Some("Rashi on Exodus 1:1"),
        );
    let scraper = scraper(source);
    let chapters = scraper.scrape_commentary(RASHI, &book("Genesis")).await.unwrap();

    assert_eq!(chapters.len(), 3);
    assert_eq!(chapters[0][0], vec!["בראשית - אמר רבי יצחק"]);
    assert!(chapters[0][1].is_empty());
    assert!(chapters[1].is_empty());
    assert_eq!(chapters[2][0], vec!["והנחש"]);
}

#[tokio::test]
async fn test_scrape_all_writes_corpus_and_commentary() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheDir::new(dir.path());
    let source = genesis_and_exodus().commentary(
        "Rashi on Genesis.1",
        TextNode::List(vec![TextNode::List(vec![TextNode::Text("פירוש".to_string())])]),
        None,
    );
    let scraper = scraper(source);

    let summary = scraper
        .scrape_all(&[book("Genesis"), book("Exodus")], &cache, Some(RASHI))
        .await
        .unwrap();

    assert_eq!(summary.fetched, vec!["בראשית", "שמות"]);
    assert!(summary.is_complete());
    assert_eq!(summary.commentary_books, 1);

    let corpus = Corpus::load(&cache.bible_path()).unwrap();
    assert_eq!(corpus.book_names().collect::<Vec<_>>(), vec!["בראשית", "שמות"]);
    assert_eq!(corpus.verse("שמות", 1, 1).unwrap(), "ואלה שמות");

    let commentary = CommentaryIndex::load(&cache.commentary_index_path(RASHI)).unwrap();
    assert!(commentary.has_commentary("בראשית", 1, 1));
    assert!(!commentary.has_commentary("שמות", 1, 1));
}

#[tokio::test]
async fn test_scrape_all_resumes_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheDir::new(dir.path());
    cache
        .write_json(&cache.book_path("Genesis"), &vec![vec!["מהמטמון".to_string()]])
        .await
        .unwrap();

    let scraper = scraper(genesis_and_exodus());
    let summary = scraper
        .scrape_all(&[book("Genesis"), book("Exodus")], &cache, None)
        .await
        .unwrap();

    assert_eq!(summary.cached, vec!["בראשית"]);
    assert_eq!(summary.fetched, vec!["שמות"]);
    assert_eq!(scraper.source().calls(), vec!["Exodus.1"]);

    let corpus = Corpus::load(&cache.bible_path()).unwrap();
    assert_eq!(corpus.verse("בראשית", 1, 1).unwrap(), "מהמטמון");
}

#[tokio::test]
async fn test_scrape_all_skips_failed_books() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheDir::new(dir.path());
    let scraper = scraper(genesis_and_exodus());

    let summary = scraper
        .scrape_all(&[book("Ruth"), book("Exodus")], &cache, None)
        .await
        .unwrap();

    assert_eq!(summary.failed, vec!["רות"]);
    assert!(!summary.is_complete());
    let corpus = Corpus::load(&cache.bible_path()).unwrap();
    assert_eq!(corpus.book_names().collect::<Vec<_>>(), vec!["שמות"]);
    assert!(!cache.book_path("Ruth").exists());
}

// ==========================================================================
// SefariaClient against a local mock
// ==========================================================================

async fn texts(Path(reference): Path<String>) -> impl IntoResponse {
    match reference.as_str() {
        "Genesis.1" => (
            StatusCode::OK,
            Json(json!({"ref": "Genesis 1", "he": ["בראשית ברא"], "next": "Genesis 2"})),
        ),
        "Rashi on Genesis.1" => (
            StatusCode::OK,
            Json(json!({"ref": "Rashi on Genesis 1", "he": [["פירוש"], null], "next": null})),
        ),
        "Broken.1" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
        _ => (StatusCode::OK, Json(json!({"error": format!("Couldn't find {reference}")}))),
    }
}

async fn spawn_mock() -> String {
    let app = Router::new().route("/api/texts/{reference}", get(texts));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}")
}

#[tokio::test]
async fn test_sefaria_client_decodes_texts() {
    let client = SefariaClient::new(&spawn_mock().await).unwrap();

    let chapter = client.fetch("Genesis.1").await.unwrap();
    assert_eq!(chapter.next.as_deref(), Some("Genesis 2"));
    assert_eq!(chapter.he.into_verses(), vec!["בראשית ברא"]);

    let rashi = client.fetch("Rashi on Genesis.1").await.unwrap();
    assert_eq!(rashi.he.into_fragments(), vec![vec!["פירוש".to_string()], vec![]]);
}

#[tokio::test]
async fn test_sefaria_client_maps_failures() {
    let client = SefariaClient::new(&spawn_mock().await).unwrap();

    let server = client.fetch("Broken.1").await.unwrap_err();
    assert!(matches!(server, Error::Http { status: 500, .. }));
    assert!(server.is_transient());

    let unknown = client.fetch("Nowhere.1").await.unwrap_err();
    assert!(matches!(unknown, Error::Api { .. }));
    assert!(!unknown.is_transient());
}

#[tokio::test]
async fn test_sefaria_client_network_error_is_transient() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = SefariaClient::new(&format!("http://{address}")).unwrap();
    let error = client.fetch("Genesis.1").await.unwrap_err();
    assert!(error.is_transient());
}
