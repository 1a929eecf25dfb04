//! Static site generation.
//!
//! Renders one HTML page per chapter, an index page per book, `sitemap.xml`
//! and `robots.txt`. Page links are site-relative paths under the configured
//! base URL; the sitemap uses absolute URLs.

use std::path::{Path, PathBuf};

use tanakh_core::gematria;
use tanakh_core::navigation::{self, Location};
use tanakh_core::{Book, Corpus, NumeralMode};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://dorpascal.com/tanakh";

/// Built-in chapter page template.
pub const CHAPTER_TEMPLATE: &str = include_str!("../templates/chapter.html");

/// Built-in book index template.
pub const BOOK_TEMPLATE: &str = include_str!("../templates/book.html");

const CHAPTER_TEMPLATE_FILE: &str = "chapter.html";
const BOOK_TEMPLATE_FILE: &str = "book.html";

/// Link target when there is no previous or next chapter.
const NO_PAGE: &str = "#";

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] tanakh_core::Error),
}

pub type Result<T> = std::result::Result<T, SiteError>;

/// Page templates with `{{PLACEHOLDER}}` markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub chapter: String,
    pub book: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            chapter: CHAPTER_TEMPLATE.to_string(),
            book: BOOK_TEMPLATE.to_string(),
        }
    }
}

impl Templates {
    /// Templates from `dir`, falling back to the built-in ones for any file
    /// the directory does not provide.
    ///
    /// # Errors
    ///
    /// Returns an error if a template file exists but cannot be read.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = dir else {
            return Ok(Self::default());
        };
        Ok(Self {
            chapter: read_template(&dir.join(CHAPTER_TEMPLATE_FILE), CHAPTER_TEMPLATE)?,
            book: read_template(&dir.join(BOOK_TEMPLATE_FILE), BOOK_TEMPLATE)?,
        })
    }
}

fn read_template(path: &Path, fallback: &str) -> Result<String> {
    if !path.exists() {
        debug!(path = %path.display(), "Template not found, using built-in");
        return Ok(fallback.to_string());
    }
    std::fs::read_to_string(path).map_err(|source| SiteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn fill(template: &str, replacements: &[(&str, &str)]) -> String {
    replacements
        .iter()
        .fold(template.to_string(), |page, (key, value)| page.replace(key, value))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SiteError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| SiteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// What a [`SiteGenerator::generate`] run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteSummary {
    pub books: usize,
    pub chapters: usize,
}

pub struct SiteGenerator<'a> {
    corpus: &'a Corpus,
    base_url: Url,
    templates: Templates,
}

impl<'a> SiteGenerator<'a> {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(corpus: &'a Corpus, base_url: &str) -> Result<Self> {
        let invalid = |reason: String| SiteError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(invalid("expected an http(s) URL".to_string()));
        }
        Ok(Self {
            corpus,
            base_url: parsed,
            templates: Templates::default(),
        })
    }

    #[must_use]
    pub fn with_templates(mut self, templates: Templates) -> Self {
        self.templates = templates;
        self
    }

    fn page_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // The base was checked to be a base URL in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `<base>/<book>`, percent-encoded.
    #[must_use]
    pub fn book_url(&self, book: &str) -> Url {
        self.page_url(&[book])
    }

    /// `<base>/<book>/<chapter>`, percent-encoded.
    #[must_use]
    pub fn chapter_url(&self, location: &Location) -> Url {
        let chapter = location.chapter.to_string();
        self.page_url(&[location.book.as_str(), chapter.as_str()])
    }

    fn link(&self, location: Option<Location>) -> String {
        location.map_or_else(
            || NO_PAGE.to_string(),
            |location| self.chapter_url(&location).path().to_string(),
        )
    }

    /// Render one chapter page.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown book or chapter.
    pub fn render_chapter(&self, book: &str, chapter: usize) -> Result<String> {
        let content = self
            .corpus
            .chapter(book, chapter)?
            .iter()
            .zip(1..)
            .map(|(text, number)| {
                format!(
                    "<p class=\"verse\" data-verse=\"{number}\"><span class=\"verse-number\">{}</span>{text}</p>",
                    gematria::label(number, NumeralMode::Hebrew)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let here = Location::new(book, chapter);
        let previous = self.link(navigation::previous_chapter(self.corpus, &here));
        let next = self.link(navigation::next_chapter(self.corpus, &here));
        let chapter_num = chapter.to_string();
        let chapter_heb = gematria::label(chapter, NumeralMode::Hebrew);

        Ok(fill(
            &self.templates.chapter,
            &[
                ("{{BOOK_NAME}}", book),
                ("{{CHAPTER_NUM}}", chapter_num.as_str()),
                ("{{CHAPTER_NUM_HEB}}", chapter_heb.as_str()),
                ("{{CONTENT}}", content.as_str()),
                ("{{PREV_CHAPTER_URL}}", previous.as_str()),
                ("{{NEXT_CHAPTER_URL}}", next.as_str()),
            ],
        ))
    }

    /// Render a book's chapter list page.
    #[must_use]
    pub fn render_book_index(&self, book: &Book) -> String {
        let chapter_list = (1..=book.chapter_count())
            .map(|chapter| {
                format!(
                    "<li><a href=\"{}\">פרק {}</a></li>",
                    self.chapter_url(&Location::new(book.name(), chapter)).path(),
                    gematria::label(chapter, NumeralMode::Hebrew)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        fill(
            &self.templates.book,
            &[
                ("{{BOOK_NAME}}", book.name()),
                ("{{CHAPTER_LIST}}", chapter_list.as_str()),
            ],
        )
    }

    /// Home page, then every book followed by its chapters.
    #[must_use]
    pub fn sitemap(&self) -> String {
        let entry = |loc: &Url, priority: &str| {
            format!(
                "\n    <url>\n        <loc>{loc}</loc>\n        <changefreq>monthly</changefreq>\n        <priority>{priority}</priority>\n    </url>"
            )
        };

        let mut lines = vec![
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"
                .to_string(),
            entry(&self.base_url, "1.0"),
        ];
        for book in self.corpus.books() {
            lines.push(entry(&self.book_url(book.name()), "0.9"));
            lines.extend((1..=book.chapter_count()).map(|chapter| {
                entry(&self.chapter_url(&Location::new(book.name(), chapter)), "0.8")
            }));
        }
        lines.push("</urlset>".to_string());
        lines.join("\n")
    }

    /// Allow everything, point at the sitemap at the site root, and slow down
    /// the heavy SEO crawlers.
    #[must_use]
    pub fn robots(&self) -> String {
        let sitemap = self
            .base_url
            .join("/sitemap.xml")
            .map_or_else(|_| "/sitemap.xml".to_string(), |url| url.to_string());
        let crawl_delays = ["AhrefsBot", "Baiduspider", "SemrushBot"]
            .iter()
            .map(|bot| format!("User-agent: {bot}\nCrawl-delay: 5"))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "User-agent: *\nAllow: /\nSitemap: {sitemap}\n\n# Crawl-delay for specific bots\n{crawl_delays}"
        )
    }

    /// Write the whole site under `out_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn generate(&self, out_dir: &Path) -> Result<SiteSummary> {
        let mut summary = SiteSummary::default();

        for book in self.corpus.books() {
            let book_dir = out_dir.join(book.name());
            for chapter in 1..=book.chapter_count() {
                let page = self.render_chapter(book.name(), chapter)?;
                write_file(&book_dir.join(format!("chapter_{chapter}.html")), &page)?;
                summary.chapters += 1;
            }
            write_file(&book_dir.join("index.html"), &self.render_book_index(book))?;
            summary.books += 1;
            debug!(book = book.name(), chapters = book.chapter_count(), "Generated book");
        }

        write_file(&out_dir.join("sitemap.xml"), &self.sitemap())?;
        write_file(&out_dir.join("robots.txt"), &self.robots())?;

        info!(
            out_dir = %out_dir.display(),
            books = summary.books,
            chapters = summary.chapters,
            "Site generated"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    const GENESIS: &str = "%D7%91%D7%A8%D7%90%D7%A9%D7%99%D7%AA";
    const EXODUS: &str = "%D7%A9%D7%9E%D7%95%D7%AA";

    fn corpus() -> Corpus {
        Corpus::from_books(vec![
            Book::new(
                "בראשית",
                vec![
                    vec!["בְּרֵאשִׁית בָּרָא".to_string(), "וְהָאָרֶץ".to_string()],
                    vec!["וַיְכֻלּוּ".to_string()],
                ],
            ),
            Book::new("שמות", vec![vec!["וְאֵלֶּה שְׁמוֹת".to_string()]]),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let corpus = corpus();
        assert!(SiteGenerator::new(&corpus, "not a url").is_err());
        assert!(SiteGenerator::new(&corpus, "mailto:dor@dorpascal.com").is_err());
        assert!(SiteGenerator::new(&corpus, "https://dorpascal.com/tanakh/").is_ok());
    }

    #[test]
    fn test_urls_are_percent_encoded() {
        let corpus = corpus();
        let site = SiteGenerator::new(&corpus, DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            site.chapter_url(&Location::new("שמות", 1)).as_str(),
            format!("https://dorpascal.com/tanakh/{EXODUS}/1")
        );
        assert_eq!(
            site.book_url("שמואל א").path(),
            "/tanakh/%D7%A9%D7%9E%D7%95%D7%90%D7%9C%20%D7%90"
        );
    }

    #[test]
    fn test_chapter_page_content_and_navigation() {
        let corpus = corpus();
        let site = SiteGenerator::new(&corpus, DEFAULT_BASE_URL).unwrap();

        let page = site.render_chapter("בראשית", 2).unwrap();
        assert!(page.contains(
            "<p class=\"verse\" data-verse=\"1\"><span class=\"verse-number\">א'</span>וַיְכֻלּוּ</p>"
        ));
        assert!(page.contains("בראשית פרק ב'"));
        assert!(page.contains(&format!("href=\"/tanakh/{GENESIS}/1\"")));
        // Crosses into the next book.
        assert!(page.contains(&format!("href=\"/tanakh/{EXODUS}/1\"")));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_ends_of_corpus_link_nowhere() {
        let corpus = corpus();
        let site = SiteGenerator::new(&corpus, DEFAULT_BASE_URL)
            .unwrap()
            .with_templates(Templates {
                chapter: "{{PREV_CHAPTER_URL}}|{{NEXT_CHAPTER_URL}}".to_string(),
                book: String::new(),
            });

        assert_eq!(
            site.render_chapter("בראשית", 1).unwrap(),
            format!("#|/tanakh/{GENESIS}/2")
        );
        assert_eq!(
            site.render_chapter("שמות", 1).unwrap(),
            format!("/tanakh/{GENESIS}/2|#")
        );
        assert!(site.render_chapter("שמות", 2).is_err());
    }

    #[test]
    fn test_book_index_lists_chapters() {
        let corpus = corpus();
        let site = SiteGenerator::new(&corpus, DEFAULT_BASE_URL).unwrap();
        let page = site.render_book_index(&corpus.books()[0]);
        assert!(page.contains(&format!(
            "<li><a href=\"/tanakh/{GENESIS}/1\">פרק א'</a></li>\n<li><a href=\"/tanakh/{GENESIS}/2\">פרק ב'</a></li>"
        )));
    }

    #[test]
    fn test_sitemap_priorities() {
        let corpus = corpus();
        let site = SiteGenerator::new(&corpus, DEFAULT_BASE_URL).unwrap();
        let sitemap = site.sitemap();

        assert!(sitemap.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(sitemap.ends_with("</urlset>"));
        assert_eq!(sitemap.matches("<priority>1.0</priority>").count(), 1);
        assert_eq!(sitemap.matches("<priority>0.9</priority>").count(), 2);
        assert_eq!(sitemap.matches("<priority>0.8</priority>").count(), 3);
        assert_eq!(sitemap.matches("<changefreq>monthly</changefreq>").count(), 6);
        assert!(sitemap.contains("<loc>https://dorpascal.com/tanakh</loc>"));
    }

    #[test]
    fn test_robots() {
        let corpus = corpus();
        let site = SiteGenerator::new(&corpus, DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            site.robots(),
            "User-agent: *\nAllow: /\nSitemap: https://dorpascal.com/sitemap.xml\n\n\
             # Crawl-delay for specific bots\n\
             User-agent: AhrefsBot\nCrawl-delay: 5\n\n\
             User-agent: Baiduspider\nCrawl-delay: 5\n\n\
             User-agent: SemrushBot\nCrawl-delay: 5"
        );
    }

    #[test]
    fn test_template_dir_overrides_only_what_it_has() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("book.html"), "<h1>{{BOOK_NAME}}</h1>").unwrap();

        let templates = Templates::load(Some(dir.path())).unwrap();
        assert_eq!(templates.book, "<h1>{{BOOK_NAME}}</h1>");
        assert_eq!(templates.chapter, CHAPTER_TEMPLATE);
        assert_eq!(Templates::load(None).unwrap(), Templates::default());
    }

    #[test]
    fn test_generate_writes_site() {
        let corpus = corpus();
        let out = tempfile::tempdir().unwrap();
        let site = SiteGenerator::new(&corpus, DEFAULT_BASE_URL).unwrap();

        let summary = site.generate(out.path()).unwrap();
        assert_eq!(summary, SiteSummary { books: 2, chapters: 3 });

        for file in [
            "בראשית/chapter_1.html",
            "בראשית/chapter_2.html",
            "בראשית/index.html",
            "שמות/chapter_1.html",
            "שמות/index.html",
            "sitemap.xml",
            "robots.txt",
        ] {
            assert!(out.path().join(file).is_file(), "missing {file}");
        }
    }
}
