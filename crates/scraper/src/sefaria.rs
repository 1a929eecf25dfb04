//! Sefaria texts API client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::source::{ChapterPayload, TextSource};

/// Public Sefaria instance.
pub const DEFAULT_BASE_URL: &str = "https://www.sefaria.org";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for `GET {base}/api/texts/{reference}`.
#[derive(Debug, Clone)]
pub struct SefariaClient {
    base_url: Url,
    client: reqwest::Client,
}

impl SefariaClient {
    /// Create a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` is not an absolute http(s)
    /// URL, or if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// See [`SefariaClient::new`].
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| Error::invalid_url(base_url, e.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::invalid_url(base_url, "expected an http(s) URL"));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::invalid_url(base_url, e.to_string()))?;
        Ok(Self {
            base_url: parsed,
            client,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL for a text reference, without commentary, context or padding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL cannot take path segments.
    pub fn text_url(&self, reference: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::invalid_url(self.base_url.as_str(), "cannot be a base"))?
            .pop_if_empty()
            .extend(["api", "texts", reference]);
        url.query_pairs_mut()
            .append_pair("commentary", "0")
            .append_pair("context", "0")
            .append_pair("pad", "0");
        Ok(url)
    }
}

#[async_trait]
impl TextSource for SefariaClient {
    async fn fetch(&self, reference: &str) -> Result<ChapterPayload> {
        let url = self.text_url(reference)?;
        debug!(%url, "Fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(reference, &e))?;
        parse_response(reference, response).await
    }
}

async fn parse_response(reference: &str, response: reqwest::Response) -> Result<ChapterPayload> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::from_reqwest(reference, &e))?;

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            reference: reference.to_string(),
            message: body.chars().take(200).collect(),
        });
    }

    let payload: ChapterPayload = serde_json::from_str(&body).map_err(|e| Error::Decode {
        reference: reference.to_string(),
        reason: e.to_string(),
    })?;

    match payload.error {
        Some(message) => Err(Error::Api {
            reference: reference.to_string(),
            message,
        }),
        None => Ok(payload),
    }
}
