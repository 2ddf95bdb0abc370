//! Remote dictionary lookups.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::time::Duration;
use thiserror::Error;

/// Transient failure of a remote lookup. The adjudicator treats every
/// variant the same way.
#[derive(Debug, Error)]
pub enum RemoteLookupError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected response: {0}")]
    Protocol(String),
}

/// A dictionary reachable over the network.
#[async_trait]
pub trait RemoteDictionary: Send + Sync {
    /// Backend name for logs and metrics.
    fn name(&self) -> &str;

    /// Whether `word` exists. Must give up after `timeout`.
    async fn lookup(&self, word: &str, timeout: Duration) -> Result<bool, RemoteLookupError>;
}

// ============================================================================
// JULS (Slovak national corpus dictionary portal)
// ============================================================================

const JULS_DEFAULT_URL: &str = "https://slovnik.juls.savba.sk/";

/// Dictionaries searched on every query.
const JULS_DICTIONARIES: &[&str] = &[
    "kssj4", "psp", "ogs", "sssj", "orter", "scs", "sss", "peciar", "ssn", "hssj", "bernolak",
    "noundb", "orient", "locutio", "obce", "priezviska", "un", "onom", "pskfr", "pskcs", "psken",
];

static NOT_FOUND_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span[^>]*class\s*=\s*"[^"]*notfound"#).expect("valid regex")
});

/// JULS search page client.
///
/// A word is found unless the result page carries the `notfound` marker or
/// the "nothing was found" message.
pub struct JulsDictionary {
    client: reqwest::Client,
    base_url: String,
}

impl JulsDictionary {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: JULS_DEFAULT_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Exact-search URL for `word`.
    pub fn search_url(&self, word: &str) -> String {
        let mut url = format!(
            "{}?w={}&s=exact&c=m5a4&cs=",
            self.base_url,
            urlencoding::encode(word)
        );
        for dict in JULS_DICTIONARIES {
            url.push_str("&d=");
            url.push_str(dict);
        }
        url
    }

    /// Interpret a result page.
    pub fn page_has_entry(html: &str) -> bool {
        if NOT_FOUND_MARKER.is_match(html) {
            return false;
        }
        !html.to_lowercase().contains("nič nebolo nájdené")
    }
}

impl Default for JulsDictionary {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteDictionary for JulsDictionary {
    fn name(&self) -> &str {
        "juls"
    }

    async fn lookup(&self, word: &str, timeout: Duration) -> Result<bool, RemoteLookupError> {
        let request = self
            .client
            .get(self.search_url(word))
            .header("Accept-Language", "sk,cs;q=0.9,en;q=0.8")
            .timeout(timeout)
            .send();

        let response = request.await.map_err(|e| {
            if e.is_timeout() {
                RemoteLookupError::Timeout(timeout)
            } else {
                RemoteLookupError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteLookupError::Protocol(format!("status {}", status)));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                RemoteLookupError::Timeout(timeout)
            } else {
                RemoteLookupError::Http(e.to_string())
            }
        })?;

        Ok(Self::page_has_entry(&body))
    }
}
