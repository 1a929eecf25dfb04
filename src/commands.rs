//! CLI command handlers.
//!
//! Handlers write their output to the given sink; logs go to stderr.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tanakh_core::books::{self, BookName};
use tanakh_core::reader::{ChapterView, CommentaryStatus, CommentaryView, SearchHit};
use tanakh_core::{
    CommentaryIndex, Corpus, HighlightStyle, JsonFileStore, NumeralMode, Reader,
    TextSearchEngine, gematria,
};
use tanakh_scraper::{CacheDir, Scraper, SefariaClient};
use tanakh_web::AppState;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, NumberingArg};
use crate::config::{self, Config};
use crate::site::{SiteGenerator, Templates};

/// Execute a CLI command.
///
/// Loads the layered configuration, then dispatches to the handler.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the command fails.
pub async fn execute_command(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config).context("Failed to load configuration")?;
    let mut stdout = std::io::stdout();
    run(&config, cli.command, &mut stdout).await
}

/// Run a command against an already loaded configuration.
///
/// # Errors
///
/// Returns an error if the command fails or output cannot be written.
pub async fn run<W: Write>(config: &Config, command: Commands, out: &mut W) -> Result<()> {
    match command {
        Commands::Read { book, chapter } => cmd_read(config, book, chapter, out),
        Commands::Next => cmd_step(config, Step::Next, out),
        Commands::Prev => cmd_step(config, Step::Previous, out),
        Commands::Search {
            query,
            limit,
            no_color,
        } => cmd_search(config, &query, limit, no_color, out),
        Commands::Gematria { numbers, arabic } => cmd_gematria(&numbers, arabic, out),
        Commands::Rashi {
            book,
            chapter,
            verse,
        } => cmd_rashi(config, &book, chapter, verse, out),
        Commands::Numbering { mode } => cmd_numbering(config, mode, out),
        Commands::Fetch {
            books,
            out: cache_dir,
            no_commentary,
        } => cmd_fetch(config, &books, cache_dir, no_commentary, out).await,
        Commands::Generate { out: out_dir, templates } => {
            cmd_generate(config, out_dir, templates, out)
        }
        Commands::Serve { bind } => cmd_serve(config, bind).await,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SHARED SETUP
// ═══════════════════════════════════════════════════════════════════════════

fn load_corpus(config: &Config) -> Result<Corpus> {
    Corpus::load(&config.data.bible_path).with_context(|| {
        format!(
            "Failed to load the Bible from {} (run `tanakh fetch` first?)",
            config.data.bible_path.display()
        )
    })
}

fn open_reader(config: &Config) -> Result<Reader> {
    let corpus = load_corpus(config)?;
    let commentary = CommentaryIndex::load_or_empty(&config.data.rashi_path);
    let store = JsonFileStore::new(&config.data.state_path);
    Ok(Reader::with_defaults(
        corpus,
        commentary,
        Box::new(store),
        config.reader.defaults(),
    ))
}

/// Corpus key for a book given in either language; unknown names pass
/// through so the corpus can report them.
fn corpus_book(name: &str) -> String {
    books::resolve(name).map_or_else(|| name.trim().to_string(), |book| book.hebrew.to_string())
}

fn select_books(names: &[String]) -> Result<Vec<BookName>> {
    if names.is_empty() {
        return Ok(books::TANAKH.to_vec());
    }
    names
        .iter()
        .map(|name| {
            books::resolve(name)
                .copied()
                .with_context(|| format!("Unknown book: {name}"))
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// FORMATTING
// ═══════════════════════════════════════════════════════════════════════════

/// Title line, then one line per verse; `*` marks verses with commentary.
#[must_use]
pub fn format_chapter(view: &ChapterView) -> String {
    let mut lines = vec![view.title.clone(), String::new()];
    lines.extend(view.verses.iter().map(|verse| {
        let marker = if verse.has_commentary { " *" } else { "" };
        format!("{} {}{marker}", verse.label, verse.text)
    }));
    lines.join("\n")
}

#[must_use]
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results".to_string();
    }
    let mut lines: Vec<String> = hits
        .iter()
        .map(|hit| format!("{}: {}", hit.reference, hit.result.rendered))
        .collect();
    lines.push(String::new());
    lines.push(format!("{} results", hits.len()));
    lines.join("\n")
}

#[must_use]
pub fn format_commentary(view: &CommentaryView) -> String {
    match view.status {
        CommentaryStatus::Found => {
            let mut lines = vec![format!("רש\"י על {}", view.reference)];
            lines.extend(view.fragments.iter().map(|fragment| format!("- {fragment}")));
            lines.join("\n")
        }
        CommentaryStatus::UnknownBook => {
            format!("No commentary is available for this book ({})", view.reference)
        }
        CommentaryStatus::NoneForVerse => format!("No commentary on {}", view.reference),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// READER COMMANDS
// ═══════════════════════════════════════════════════════════════════════════

fn cmd_read<W: Write>(
    config: &Config,
    book: Option<String>,
    chapter: Option<usize>,
    out: &mut W,
) -> Result<()> {
    let mut reader = open_reader(config)?;
    let view = match (book, chapter) {
        (Some(book), chapter) => {
            reader.open(&corpus_book(&book), chapter.unwrap_or(tanakh_core::reader::DEFAULT_CHAPTER))
        }
        (None, Some(chapter)) => {
            let book = reader.last_visit().book.clone();
            reader.open(&book, chapter)
        }
        (None, None) => reader.open_last_visit(),
    }
    .context("Failed to open chapter")?;

    writeln!(out, "{}", format_chapter(&view))?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Next,
    Previous,
}

fn cmd_step<W: Write>(config: &Config, step: Step, out: &mut W) -> Result<()> {
    let mut reader = open_reader(config)?;
    let view = match step {
        Step::Next => reader.next(),
        Step::Previous => reader.previous(),
    }
    .context("Failed to open chapter")?;

    match view {
        Some(view) => writeln!(out, "{}", format_chapter(&view))?,
        None => {
            let edge = match step {
                Step::Next => "last",
                Step::Previous => "first",
            };
            writeln!(out, "Already at the {edge} chapter ({})", reader.last_visit())?;
        }
    }
    Ok(())
}

fn cmd_search<W: Write>(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    no_color: bool,
    out: &mut W,
) -> Result<()> {
    let reader = open_reader(config)?;
    let style = if no_color || !std::io::stdout().is_terminal() {
        HighlightStyle::plain()
    } else {
        HighlightStyle::ansi()
    };
    let engine = TextSearchEngine::new(style);
    let engine = match limit {
        Some(limit) => engine.with_limit(limit),
        None => engine,
    };

    let hits = reader.search(query, &engine).context("Search failed")?;
    info!(query, results = hits.len(), "Search finished");
    writeln!(out, "{}", format_hits(&hits))?;
    Ok(())
}

fn cmd_rashi<W: Write>(
    config: &Config,
    book: &str,
    chapter: usize,
    verse: usize,
    out: &mut W,
) -> Result<()> {
    let reader = open_reader(config)?;
    let view = reader
        .commentary_for(&corpus_book(book), chapter, verse)
        .context("Failed to look up commentary")?;
    writeln!(out, "{}", format_commentary(&view))?;
    Ok(())
}

fn cmd_numbering<W: Write>(config: &Config, mode: NumberingArg, out: &mut W) -> Result<()> {
    let mut reader = open_reader(config)?;
    let mode = match mode {
        NumberingArg::Hebrew => {
            reader.set_numbering(NumeralMode::Hebrew);
            NumeralMode::Hebrew
        }
        NumberingArg::Arabic => {
            reader.set_numbering(NumeralMode::Arabic);
            NumeralMode::Arabic
        }
        NumberingArg::Toggle => reader.toggle_numbering(),
    };
    writeln!(out, "Numbering: {mode}")?;
    Ok(())
}

fn cmd_gematria<W: Write>(numbers: &[i64], arabic: bool, out: &mut W) -> Result<()> {
    let mode = if arabic {
        NumeralMode::Arabic
    } else {
        NumeralMode::Hebrew
    };
    for &n in numbers {
        let formatted = gematria::format_integer(n, mode)?;
        writeln!(out, "{n}\t{formatted}")?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLISHING COMMANDS
// ═══════════════════════════════════════════════════════════════════════════

async fn cmd_fetch<W: Write>(
    config: &Config,
    names: &[String],
    cache_dir: Option<PathBuf>,
    no_commentary: bool,
    out: &mut W,
) -> Result<()> {
    let books = select_books(names)?;
    let cache = CacheDir::new(cache_dir.unwrap_or_else(|| config.data.cache_dir.clone()));
    let commentator = if no_commentary {
        None
    } else {
        config.scraper.commentator()
    };

    let client = SefariaClient::new(&config.scraper.base_url)
        .context("Failed to create the Sefaria client")?;
    let scraper = Scraper::new(client)
        .with_retry_policy(config.scraper.retry_policy())
        .with_request_delay(config.scraper.request_delay());

    info!(books = books.len(), cache = %cache.root().display(), "Fetching");
    let summary = scraper
        .scrape_all(&books, &cache, commentator)
        .await
        .context("Failed to write the assembled files")?;

    writeln!(
        out,
        "Fetched {} books, {} from cache, commentary for {} books",
        summary.fetched.len(),
        summary.cached.len(),
        summary.commentary_books
    )?;
    writeln!(out, "Bible written to {}", cache.bible_path().display())?;

    if !summary.is_complete() {
        warn!(failed = ?summary.failed, "Some books could not be fetched");
        bail!(
            "{} books failed ({}); run fetch again to resume",
            summary.failed.len(),
            summary.failed.join(", ")
        );
    }
    Ok(())
}

fn cmd_generate<W: Write>(
    config: &Config,
    out_dir: Option<PathBuf>,
    templates: Option<PathBuf>,
    out: &mut W,
) -> Result<()> {
    let corpus = load_corpus(config)?;
    let out_dir = out_dir.unwrap_or_else(|| config.site.out_dir.clone());
    let templates = Templates::load(templates.or_else(|| config.site.template_dir.clone()).as_deref())
        .context("Failed to load templates")?;

    let summary = SiteGenerator::new(&corpus, &config.site.base_url)?
        .with_templates(templates)
        .generate(&out_dir)
        .with_context(|| format!("Failed to generate the site in {}", out_dir.display()))?;

    writeln!(
        out,
        "Generated {} chapters in {} books under {}",
        summary.chapters,
        summary.books,
        out_dir.display()
    )?;
    Ok(())
}

async fn cmd_serve(config: &Config, bind: Option<String>) -> Result<()> {
    let corpus = load_corpus(config)?;
    let commentary = CommentaryIndex::load_or_empty(&config.data.rashi_path);
    let state = AppState::new(corpus, commentary)
        .with_numbering(config.reader.numbering)
        .with_search_limit(config.server.search_limit);

    let mut server = config.server.server_config();
    if let Some(bind) = bind {
        server.bind_address = bind;
    }
    tanakh_web::serve(state, &server)
        .await
        .context("Web server failed")?;
    Ok(())
}
