//! CLI command definitions using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Tanakh reader
#[derive(Parser, Debug)]
#[command(name = "tanakh")]
#[command(version)]
#[command(about = "Read, search and publish the Tanakh with gematria numbering and Rashi")]
#[command(
    long_about = "Reads the Hebrew Bible chapter by chapter with Hebrew or Arabic numbering, searches it ignoring nikud, shows Rashi's commentary, fetches the text from Sefaria, serves it over HTTP and generates a static site."
)]
pub struct Cli {
    /// Config file applied on top of the global and project config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a chapter (the last visited one by default)
    Read {
        /// Book, in Hebrew or English
        #[arg(short, long)]
        book: Option<String>,

        /// Chapter number
        #[arg(short, long)]
        chapter: Option<usize>,
    },

    /// Show the next chapter
    Next,

    /// Show the previous chapter
    Prev,

    /// Search the text, ignoring nikud
    Search {
        /// Words to look for
        query: String,

        /// Stop after this many results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Do not color the matches
        #[arg(long, default_value_t = false)]
        no_color: bool,
    },

    /// Convert numbers to gematria
    Gematria {
        /// Positive integers
        #[arg(required = true, allow_negative_numbers = true)]
        numbers: Vec<i64>,

        /// Print decimal digits instead
        #[arg(short, long, default_value_t = false)]
        arabic: bool,
    },

    /// Show Rashi's commentary on a verse
    Rashi {
        /// Book, in Hebrew or English
        book: String,

        chapter: usize,

        verse: usize,
    },

    /// Set or toggle the chapter and verse numbering
    Numbering {
        #[arg(value_enum)]
        mode: NumberingArg,
    },

    /// Fetch the text and commentary from Sefaria
    Fetch {
        /// Books to fetch, in Hebrew or English (all by default)
        #[arg(short, long, value_delimiter = ',')]
        books: Vec<String>,

        /// Cache directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip the commentary
        #[arg(long, default_value_t = false)]
        no_commentary: bool,
    },

    /// Generate the static site
    Generate {
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Directory with chapter.html / book.html overrides
        #[arg(short, long)]
        templates: Option<PathBuf>,
    },

    /// Serve the JSON API
    Serve {
        /// Address to bind, e.g. 127.0.0.1:3000
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingArg {
    Hebrew,
    Arabic,
    Toggle,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_read_and_global_config() {
        let cli = Cli::try_parse_from([
            "tanakh", "read", "--book", "Genesis", "--chapter", "3", "--config", "x.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Read { book, chapter } => {
                assert_eq!(book.as_deref(), Some("Genesis"));
                assert_eq!(chapter, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_fetch_book_list() {
        let cli = Cli::try_parse_from(["tanakh", "fetch", "--books", "Genesis,שמות"]).unwrap();
        match cli.command {
            Commands::Fetch { books, .. } => assert_eq!(books, ["Genesis", "שמות"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_numbering_and_gematria() {
        let cli = Cli::try_parse_from(["tanakh", "numbering", "toggle"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Numbering {
                mode: NumberingArg::Toggle
            }
        ));

        assert!(Cli::try_parse_from(["tanakh", "gematria"]).is_err());
        let cli = Cli::try_parse_from(["tanakh", "gematria", "15", "5786", "--arabic"]).unwrap();
        match cli.command {
            Commands::Gematria { numbers, arabic } => {
                assert_eq!(numbers, [15, 5786]);
                assert!(arabic);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
