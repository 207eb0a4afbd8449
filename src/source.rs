//! Remote event search with a bounded wait and silent fallback to the
//! built-in sample pool. Transport, status, and parse failures are
//! degradation, not errors: the caller always gets a plausible list.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::models::{EventRecord, SearchQuery};
use crate::normalize::{normalize, RawEvent};
use crate::sample;

const DEFAULT_ENDPOINT: &str = "https://app.ticketmaster.com/discovery/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const PAGE_SIZE: &str = "20";
const SORT_ORDER: &str = "date,asc";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Seam between the UI-facing coordinator and whatever produces events.
#[async_trait]
pub trait EventProvider: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<EventRecord>, SourceError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<EventRecord>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedEvents>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedEvents {
    #[serde(default)]
    events: Vec<RawEvent>,
}

pub struct EventSource {
    api_key: String,
    endpoint: String,
    client: Client,
}

impl EventSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("http client");
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn from_env() -> Self {
        let api_key = std::env::var("EVENTS_API_KEY").unwrap_or_default();
        let endpoint =
            std::env::var("EVENTS_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::with_endpoint(api_key, endpoint)
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("EVENTS_API_KEY").ok())
            .unwrap_or_default();
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self::with_endpoint(api_key, endpoint)
    }

    /// Search the remote API, degrading to the filtered sample pool on any
    /// transport/status/parse failure. Errors only when the request URL
    /// itself cannot be constructed.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<EventRecord>, SourceError> {
        let url = self.search_url(query)?;
        match self.fetch_search(url).await {
            Ok(events) => {
                debug!(count = events.len(), "remote search succeeded");
                Ok(events)
            }
            Err(err) => {
                warn!(error = %err, "remote search failed, serving sample events");
                Ok(sample::filter(query))
            }
        }
    }

    /// Single-event lookup. Sample-pool ids short-circuit without a network
    /// call; a failed remote lookup falls back to the first sample entry.
    /// `None` only when the sample pool is empty.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<EventRecord>, SourceError> {
        if let Some(event) = sample::find_by_id(id) {
            return Ok(Some(event));
        }

        let url = self.event_url(id)?;
        match self.fetch_event(url).await {
            Ok(event) => Ok(Some(event)),
            Err(err) => {
                warn!(error = %err, id, "remote lookup failed, serving sample event");
                Ok(sample::default_event())
            }
        }
    }

    fn search_url(&self, query: &SearchQuery) -> Result<Url, SourceError> {
        let base = self.endpoint.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/events.json"))
            .map_err(|err| SourceError::Endpoint(err.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("apikey", &self.api_key);
            if !query.keyword.is_empty() {
                pairs.append_pair("keyword", &query.keyword);
            }
            if !query.city.is_empty() {
                pairs.append_pair("city", &query.city);
            }
            pairs.append_pair("size", PAGE_SIZE);
            pairs.append_pair("sort", SORT_ORDER);
        }
        Ok(url)
    }

    fn event_url(&self, id: &str) -> Result<Url, SourceError> {
        let base = self.endpoint.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/events/{id}.json"))
            .map_err(|err| SourceError::Endpoint(err.to_string()))?;
        url.query_pairs_mut().append_pair("apikey", &self.api_key);
        Ok(url)
    }

    async fn fetch_search(&self, url: Url) -> Result<Vec<EventRecord>, SourceError> {
        let body = self.fetch_body(url).await?;
        let payload: SearchResponse =
            serde_json::from_str(&body).map_err(|err| SourceError::Parse(err.to_string()))?;
        // Missing `_embedded.events` is an empty result, not a failure.
        let raw_events = payload
            .embedded
            .map(|embedded| embedded.events)
            .unwrap_or_default();
        Ok(raw_events.into_iter().map(normalize).collect())
    }

    async fn fetch_event(&self, url: Url) -> Result<EventRecord, SourceError> {
        let body = self.fetch_body(url).await?;
        let raw: RawEvent =
            serde_json::from_str(&body).map_err(|err| SourceError::Parse(err.to_string()))?;
        Ok(normalize(raw))
    }

    async fn fetch_body(&self, url: Url) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SourceError::Http(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| SourceError::Http(err.to_string()))?;

        if !status.is_success() {
            return Err(SourceError::Http(format!("status {}: {}", status, text)));
        }

        Ok(text)
    }
}

#[async_trait]
impl EventProvider for EventSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<EventRecord>, SourceError> {
        EventSource::search(self, query).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<EventRecord>, SourceError> {
        EventSource::get_by_id(self, id).await
    }
}
