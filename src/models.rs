use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::Theme;

static PLACEHOLDER_IMAGE_BASE: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://api.a0.dev/assets/image").expect("placeholder image base url")
});

/// A single discoverable event, either fetched from the remote search API
/// or taken from the built-in sample pool. Immutable after creation:
/// events are only fetched, never edited locally.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    /// ISO-8601 start timestamp; `None` means the date is still to be announced.
    pub start_date_time: Option<String>,
    pub venue_name: Option<String>,
    pub city_name: Option<String>,
    /// Absent when the upstream venue carried no parseable coordinates;
    /// absence disables map rendering downstream.
    pub geo: Option<GeoPoint>,
    pub image_url: Option<String>,
    pub price_range: Option<String>,
    pub description: Option<String>,
    pub ticket_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl EventRecord {
    /// The image to display: the upstream image when present, otherwise a
    /// generated placeholder keyed by event name and theme.
    pub fn display_image_url(&self, theme: Theme) -> String {
        if let Some(url) = &self.image_url {
            return url.clone();
        }
        let mut url = PLACEHOLDER_IMAGE_BASE.clone();
        url.query_pairs_mut()
            .append_pair("text", &self.name)
            .append_pair("aspect", "1:1")
            .append_pair("seed", theme.seed());
        url.into()
    }

    pub fn start_display(&self) -> String {
        self.start_date_time
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| {
                dt.with_timezone(&Local)
                    .format("%a %b %e @ %l:%M %p")
                    .to_string()
            })
            .unwrap_or_else(|| "Date TBA".to_string())
    }
}

/// Keyword/city search filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub keyword: String,
    pub city: String,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            city: city.into(),
        }
    }

    /// The filter predicate the fallback path shares with the remote side:
    /// case-insensitive substring match of `keyword` against event name or
    /// city, and of `city` against city.
    pub fn matches(&self, event: &EventRecord) -> bool {
        let city_name = event
            .city_name
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        if !self.keyword.is_empty() {
            let keyword = self.keyword.to_lowercase();
            if !event.name.to_lowercase().contains(&keyword) && !city_name.contains(&keyword) {
                return false;
            }
        }

        if !self.city.is_empty() && !city_name.contains(&self.city.to_lowercase()) {
            return false;
        }

        true
    }
}
