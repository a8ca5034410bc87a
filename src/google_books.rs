//! Google Books volumes API adapter.
//!
//! One ISBN in, at most one metadata record out. All defaulting happens
//! here: the enrichment pass downstream never sees a missing sub-field.

use async_trait::async_trait;
use serde::Deserialize;

use crate::enrich::{EnrichmentRecord, MetadataLookup};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    items: Option<Vec<VolumeItem>>,
}

#[derive(Debug, Deserialize)]
struct VolumeItem {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
}

pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleBooksClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different endpoint. Tests use this to talk
    /// to a local mock server.
    pub fn with_base_url(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            // 10s timeout to prevent a single slow volume from hanging the pass
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { client, base_url }
    }

    async fn fetch_metadata(&self, isbn: &str) -> Option<EnrichmentRecord> {
        let url = format!("{}/volumes?q=isbn:{}", self.base_url, isbn);

        let resp = self.client.get(&url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }

        let parsed: VolumesResponse = resp.json().await.ok()?;
        let info = parsed.items?.into_iter().next()?.volume_info;

        Some(EnrichmentRecord {
            title: info.title.unwrap_or_else(|| "N/A".to_string()),
            author: info
                .authors
                .map(|a| a.join(", "))
                .unwrap_or_else(|| "Unknown".to_string()),
            publisher: info.publisher.unwrap_or_else(|| "N/A".to_string()),
            publication_date: info.published_date.unwrap_or_else(|| "N/A".to_string()),
        })
    }
}

impl Default for GoogleBooksClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataLookup for GoogleBooksClient {
    /// Any failure (transport, non-2xx status, unparseable body, empty
    /// result set) maps to `None` so the caller keeps going.
    async fn lookup(&self, isbn: &str) -> Option<EnrichmentRecord> {
        let result = self.fetch_metadata(isbn).await;
        if result.is_none() {
            tracing::debug!("Google Books lookup returned no data for {}", isbn);
        }
        result
    }
}
