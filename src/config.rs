//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: `<platform config dir>/tanakh/config.toml`
//! 3. Project config: `.tanakh/config.toml`
//! 4. Explicit file passed with `--config`
//! 5. Environment variables: `TANAKH_*`
//!
//! Files are merged key by key, so a layer only has to name what it changes.
//!
//! # Example Config
//!
//! ```toml
//! [data]
//! bible_path = "docs/assets/full_bible.json"
//!
//! [reader]
//! numbering = "arabic"
//!
//! [scraper]
//! max_retries = 5
//! backoff = "exponential"
//!
//! [server]
//! bind_address = "0.0.0.0:8080"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tanakh_core::{Location, NumeralMode, ReaderState};
use tanakh_scraper::{Backoff, RetryPolicy};
use tanakh_web::ServerConfig;
use tracing::debug;
use url::Url;

/// Project config location, relative to the working directory.
pub const PROJECT_CONFIG: &str = ".tanakh/config.toml";

// ═══════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid config value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ═══════════════════════════════════════════════════════════════════════════
// CONFIGURATION STRUCTURES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data: DataConfig,
    pub reader: ReaderConfig,
    pub scraper: ScraperConfig,
    pub server: ServerSection,
    pub site: SiteConfig,
}

/// Where the corpus, commentary and reader state live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub bible_path: PathBuf,
    pub rashi_path: PathBuf,
    pub state_path: PathBuf,
    /// Root of the scraper's per-book cache.
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    pub numbering: NumeralMode,
    pub default_book: String,
    pub default_chapter: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScraperConfig {
    pub base_url: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub backoff: Backoff,
    pub request_delay_ms: u64,
    /// Commentary to fetch alongside the text; empty to skip.
    pub commentator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind_address: String,
    pub cors_origin: String,
    pub search_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Public URL the generated pages are served under.
    pub base_url: String,
    pub out_dir: PathBuf,
    /// Overrides for the embedded templates.
    pub template_dir: Option<PathBuf>,
}

// ═══════════════════════════════════════════════════════════════════════════
// DEFAULT IMPLEMENTATIONS
// ═══════════════════════════════════════════════════════════════════════════

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            bible_path: PathBuf::from("data/full_bible.json"),
            rashi_path: PathBuf::from("data/rashi_commentary.json"),
            state_path: PathBuf::from(".tanakh/state.json"),
            cache_dir: PathBuf::from("data"),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            numbering: NumeralMode::Hebrew,
            default_book: tanakh_core::reader::DEFAULT_BOOK.to_string(),
            default_chapter: tanakh_core::reader::DEFAULT_CHAPTER,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            base_url: tanakh_scraper::DEFAULT_BASE_URL.to_string(),
            max_retries: policy.max_retries,
            retry_delay_ms: policy.base_delay_ms,
            backoff: policy.backoff,
            request_delay_ms: u64::try_from(tanakh_scraper::DEFAULT_REQUEST_DELAY.as_millis())
                .unwrap_or(500),
            commentator: tanakh_scraper::RASHI.to_string(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        let server = ServerConfig::default();
        Self {
            bind_address: server.bind_address,
            cors_origin: server.cors_origin,
            search_limit: tanakh_web::DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: crate::site::DEFAULT_BASE_URL.to_string(),
            out_dir: PathBuf::from("docs"),
            template_dir: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONVERSIONS
// ═══════════════════════════════════════════════════════════════════════════

impl ReaderConfig {
    /// Reader state used when nothing has been persisted yet.
    #[must_use]
    pub fn defaults(&self) -> ReaderState {
        ReaderState {
            last_visit: Location::new(self.default_book.clone(), self.default_chapter),
            numbering: self.numbering,
        }
    }
}

impl ScraperConfig {
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        match self.backoff {
            Backoff::Fixed => RetryPolicy::fixed(self.max_retries, self.retry_delay_ms),
            Backoff::Exponential => RetryPolicy::exponential(
                self.max_retries,
                self.retry_delay_ms,
                RetryPolicy::default().max_delay_ms,
            ),
        }
    }

    #[must_use]
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    #[must_use]
    pub fn commentator(&self) -> Option<&str> {
        Some(self.commentator.trim()).filter(|name| !name.is_empty())
    }
}

impl ServerSection {
    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_address: self.bind_address.clone(),
            cors_origin: self.cors_origin.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// The config files to read, in increasing precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    pub global: Option<PathBuf>,
    pub project: Option<PathBuf>,
    /// Must exist when given.
    pub explicit: Option<PathBuf>,
}

impl ConfigSources {
    /// The standard global and project locations plus an optional explicit file.
    #[must_use]
    pub fn discover(explicit: Option<PathBuf>) -> Self {
        Self {
            global: global_config_path(),
            project: Some(PathBuf::from(PROJECT_CONFIG)),
            explicit,
        }
    }

    /// Merge every layer and validate the result.
    ///
    /// `env` looks up environment overrides by variable name.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, the explicit file
    /// is missing, or a value fails validation.
    pub fn load(&self, env: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let mut merged = toml::Table::new();

        let optional = [self.global.as_deref(), self.project.as_deref()];
        for path in optional.into_iter().flatten() {
            if path.exists() {
                debug!(path = %path.display(), "Loading config layer");
                merge_tables(&mut merged, load_toml_file(path)?);
            }
        }
        if let Some(path) = self.explicit.as_deref() {
            debug!(path = %path.display(), "Loading explicit config");
            merge_tables(&mut merged, load_toml_file(path)?);
        }

        let mut config: Config =
            toml::Value::Table(merged)
                .try_into()
                .map_err(|e: toml::de::Error| ConfigError::Parse {
                    path: PathBuf::from("<merged>"),
                    reason: e.to_string(),
                })?;

        config.apply_env_vars(env)?;
        config.validate()?;
        Ok(config)
    }
}

/// Load configuration from all sources with hierarchy.
///
/// # Errors
///
/// See [`ConfigSources::load`].
pub fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    ConfigSources::discover(explicit).load(|key| std::env::var(key).ok())
}

// ═══════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════

fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tanakh")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

fn load_toml_file(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Deep merge: tables merge recursively, everything else is replaced.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string()))
}

fn validate_http_url(key: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
    if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, format!("not an http(s) URL: {value}")))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIG METHODS
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    fn apply_env_vars(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = env("TANAKH_BIBLE_PATH") {
            self.data.bible_path = PathBuf::from(value);
        }
        if let Some(value) = env("TANAKH_RASHI_PATH") {
            self.data.rashi_path = PathBuf::from(value);
        }
        if let Some(value) = env("TANAKH_STATE_PATH") {
            self.data.state_path = PathBuf::from(value);
        }
        if let Some(value) = env("TANAKH_NUMBERING") {
            self.reader.numbering = parse_env("TANAKH_NUMBERING", &value)?;
        }
        if let Some(value) = env("TANAKH_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = env("TANAKH_SEFARIA_URL") {
            self.scraper.base_url = value;
        }
        if let Some(value) = env("TANAKH_MAX_RETRIES") {
            self.scraper.max_retries = parse_env("TANAKH_MAX_RETRIES", &value)?;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero default chapter, an empty default book, a
    /// zero search limit, or a base URL that is not http(s).
    pub fn validate(&self) -> Result<()> {
        if self.reader.default_chapter == 0 {
            return Err(ConfigError::invalid(
                "reader.default_chapter",
                "chapters are numbered from 1",
            ));
        }
        if self.reader.default_book.trim().is_empty() {
            return Err(ConfigError::invalid("reader.default_book", "must not be empty"));
        }
        if self.server.search_limit == 0 {
            return Err(ConfigError::invalid("server.search_limit", "must be at least 1"));
        }
        validate_http_url("scraper.base_url", &self.scraper.base_url)?;
        validate_http_url("site.base_url", &self.site.base_url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use std::collections::HashMap;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reader.numbering, NumeralMode::Hebrew);
        assert_eq!(config.reader.default_book, "בראשית");
        assert_eq!(config.scraper.max_retries, 3);
        assert_eq!(config.scraper.retry_delay_ms, 1000);
        assert_eq!(config.scraper.commentator(), Some("Rashi"));
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_no_sources_gives_defaults() {
        let config = ConfigSources::default().load(no_env).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(
            dir.path(),
            "global.toml",
            "[reader]\nnumbering = \"arabic\"\ndefault_chapter = 3\n[server]\nsearch_limit = 10\n",
        );
        let project = write(
            dir.path(),
            "project.toml",
            "[reader]\ndefault_chapter = 5\n",
        );
        let explicit = write(dir.path(), "explicit.toml", "[server]\nsearch_limit = 20\n");

        let config = ConfigSources {
            global: Some(global),
            project: Some(project),
            explicit: Some(explicit),
        }
        .load(no_env)
        .unwrap();

        // Keys set only in a lower layer survive.
        assert_eq!(config.reader.numbering, NumeralMode::Arabic);
        assert_eq!(config.reader.default_chapter, 5);
        assert_eq!(config.server.search_limit, 20);
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_explicit_value_equal_to_default_still_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(dir.path(), "global.toml", "[reader]\nnumbering = \"arabic\"\n");
        let explicit = write(dir.path(), "explicit.toml", "[reader]\nnumbering = \"hebrew\"\n");

        let config = ConfigSources {
            global: Some(global),
            project: None,
            explicit: Some(explicit),
        }
        .load(no_env)
        .unwrap();
        assert_eq!(config.reader.numbering, NumeralMode::Hebrew);
    }

    #[test]
    fn test_missing_optional_layers_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigSources {
            global: Some(dir.path().join("nope.toml")),
            project: Some(dir.path().join("also-nope.toml")),
            explicit: None,
        }
        .load(no_env)
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigSources {
            explicit: Some(dir.path().join("missing.toml")),
            ..ConfigSources::default()
        }
        .load(no_env);
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_and_unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(dir.path(), "broken.toml", "[reader\nnumbering = ");
        let result = ConfigSources {
            explicit: Some(broken),
            ..ConfigSources::default()
        }
        .load(no_env);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));

        let typo = write(dir.path(), "typo.toml", "[reader]\nnumberring = \"arabic\"\n");
        let result = ConfigSources {
            explicit: Some(typo),
            ..ConfigSources::default()
        }
        .load(no_env);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_unknown_numbering_in_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "c.toml", "[reader]\nnumbering = \"roman\"\n");
        let result = ConfigSources {
            explicit: Some(path),
            ..ConfigSources::default()
        }
        .load(no_env);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "c.toml",
            "[data]\nbible_path = \"from-file.json\"\n[scraper]\nmax_retries = 9\n",
        );
        let env: HashMap<&str, &str> = HashMap::from([
            ("TANAKH_BIBLE_PATH", "from-env.json"),
            ("TANAKH_NUMBERING", "Arabic"),
            ("TANAKH_MAX_RETRIES", "1"),
            ("TANAKH_BIND_ADDRESS", "0.0.0.0:9000"),
            ("TANAKH_SEFARIA_URL", "http://localhost:8080"),
        ]);

        let config = ConfigSources {
            explicit: Some(path),
            ..ConfigSources::default()
        }
        .load(|key| env.get(key).map(ToString::to_string))
        .unwrap();

        assert_eq!(config.data.bible_path, PathBuf::from("from-env.json"));
        assert_eq!(config.reader.numbering, NumeralMode::Arabic);
        assert_eq!(config.scraper.max_retries, 1);
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.scraper.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_bad_env_values_rejected() {
        let result = ConfigSources::default().load(|key| {
            (key == "TANAKH_NUMBERING").then(|| "roman".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = ConfigSources::default().load(|key| {
            (key == "TANAKH_MAX_RETRIES").then(|| "-1".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validation_rejects_chapter_zero_and_bad_urls() {
        let mut config = Config::default();
        config.reader.default_chapter = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scraper.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.site.base_url = "ftp://dorpascal.com/tanakh".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.search_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conversions() {
        let mut config = Config::default();
        config.scraper.backoff = Backoff::Exponential;
        config.scraper.max_retries = 4;
        config.scraper.commentator = "  ".to_string();
        let policy = config.scraper.retry_policy();
        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.backoff, Backoff::Exponential);
        assert_eq!(config.scraper.commentator(), None);

        let state = config.reader.defaults();
        assert_eq!(state.last_visit, Location::new("בראשית", 1));

        let server = config.server.server_config();
        assert_eq!(server, ServerConfig::default());
    }
}
