//! On-disk JSON cache of scraped books.
//!
//! Layout under the cache root:
//!
//! ```text
//! books/<English title>.json                 chapters -> verses
//! commentary/<commentator>/<English>.json    chapters -> verses -> fragments
//! full_bible.json                            assembled corpus, Hebrew keys
//! <commentator>_commentary.json              assembled index, English keys
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

/// File name of the assembled corpus.
pub const BIBLE_FILE: &str = "full_bible.json";

#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn book_path(&self, english: &str) -> PathBuf {
        self.root.join("books").join(format!("{english}.json"))
    }

    #[must_use]
    pub fn commentary_path(&self, commentator: &str, english: &str) -> PathBuf {
        self.root
            .join("commentary")
            .join(commentator.to_lowercase())
            .join(format!("{english}.json"))
    }

    #[must_use]
    pub fn bible_path(&self) -> PathBuf {
        self.root.join(BIBLE_FILE)
    }

    /// `rashi_commentary.json` for Rashi.
    #[must_use]
    pub fn commentary_index_path(&self, commentator: &str) -> PathBuf {
        self.root
            .join(format!("{}_commentary.json", commentator.to_lowercase()))
    }

    /// Write `value` as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cache`] if serialization or any filesystem step fails.
    pub async fn write_json<T: Serialize + Sync>(&self, path: &Path, value: &T) -> Result<()> {
        let json =
            serde_json::to_string_pretty(value).map_err(|e| Error::cache(path, e.to_string()))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::cache(parent, e.to_string()))?;
        }
        tokio::fs::write(path, json)
            .await
            .map_err(|e| Error::cache(path, e.to_string()))?;
        debug!(path = %path.display(), "Cached");
        Ok(())
    }

    /// Read a cached value; `None` when nothing is cached at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cache`] if the file exists but cannot be read or parsed.
    pub async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| Error::cache(path, e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::cache(path, e.to_string())),
        }
    }
}
