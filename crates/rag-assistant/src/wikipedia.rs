//! Wikipedia Client
//!
//! MediaWiki API client fixed to one language edition. Searches titles,
//! then pulls plain-text extracts bounded to two results and a fixed
//! character budget. No retry; failures propagate and get stringified at
//! the tool boundary.

use std::time::Duration;

use serde_json::Value;

use crate::error::{AssistantError, Result};

/// Spanish Wikipedia API endpoint
pub const DEFAULT_BASE_URL: &str = "https://es.wikipedia.org/w/api.php";

/// Maximum number of articles returned per query
const TOP_K_RESULTS: usize = 2;

/// Character budget per article extract
const DOC_CONTENT_CHARS_MAX: usize = 2000;

/// Message when the search yields nothing
pub const NO_RESULTS: &str = "No se encontraron resultados en Wikipedia.";

/// MediaWiki API client bound to one language edition
pub struct WikipediaClient {
    http: reqwest::Client,
    base_url: String,
}

impl WikipediaClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Search the encyclopedia and return bounded plain-text summaries
    pub async fn search_summaries(&self, query: &str) -> Result<String> {
        let titles = self.search_titles(query).await?;
        if titles.is_empty() {
            return Ok(NO_RESULTS.into());
        }

        let mut sections = Vec::with_capacity(titles.len());
        for title in titles {
            if let Some(extract) = self.extract(&title).await? {
                sections.push(format!("Página: {title}\nResumen: {extract}"));
            }
        }

        if sections.is_empty() {
            return Ok(NO_RESULTS.into());
        }

        Ok(sections.join("\n\n"))
    }

    /// Title search, bounded to `TOP_K_RESULTS`
    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = TOP_K_RESULTS.to_string();
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", &limit),
                ("utf8", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistantError::Encyclopedia(format!(
                "búsqueda falló (HTTP {})",
                response.status().as_u16()
            )));
        }

        let body: Value = response.json().await?;
        let results = body["query"]["search"].as_array().cloned().unwrap_or_default();

        Ok(results
            .iter()
            .filter_map(|r| r["title"].as_str().map(String::from))
            .take(TOP_K_RESULTS)
            .collect())
    }

    /// Plain-text extract for one title, truncated to the character budget
    async fn extract(&self, title: &str) -> Result<Option<String>> {
        let chars = DOC_CONTENT_CHARS_MAX.to_string();
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("exchars", &chars),
                ("titles", title),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistantError::Encyclopedia(format!(
                "extracto falló (HTTP {})",
                response.status().as_u16()
            )));
        }

        let body: Value = response.json().await?;
        let Some(pages) = body["query"]["pages"].as_object() else {
            return Ok(None);
        };

        let extract = pages
            .values()
            .filter_map(|page| page["extract"].as_str())
            .next()
            .map(|text| text.chars().take(DOC_CONTENT_CHARS_MAX).collect::<String>());

        Ok(extract)
    }
}
