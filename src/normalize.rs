//! Mapping of heterogeneous upstream event payloads into [`EventRecord`].
//!
//! Upstream JSON is never assumed well-formed: every nested field is
//! optional and defaulted, and coordinate strings that fail to parse
//! simply drop the geo point instead of erroring.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::models::{EventRecord, GeoPoint};

const UNTITLED: &str = "Untitled Event";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Ticket purchase link.
    pub url: Option<String>,
    pub info: Option<String>,
    pub description: Option<String>,
    pub dates: Option<RawDates>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<RawEmbedded>,
    pub images: Vec<RawImage>,
    #[serde(rename = "priceRanges")]
    pub price_ranges: Vec<RawPriceRange>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDates {
    pub start: Option<RawStart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawStart {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawEmbedded {
    pub venues: Vec<RawVenue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawVenue {
    pub name: Option<String>,
    pub city: Option<RawCity>,
    pub location: Option<RawLocation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawCity {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawImage {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawPriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
}

pub fn normalize(raw: RawEvent) -> EventRecord {
    let name = raw
        .name
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let start_date_time = raw
        .dates
        .and_then(|dates| dates.start)
        .and_then(|start| start.date_time)
        .filter(|value| !value.is_empty());

    let venue = raw
        .embedded
        .map(|embedded| embedded.venues)
        .unwrap_or_default()
        .into_iter()
        .next();

    let (venue_name, city_name, geo) = match venue {
        Some(venue) => (
            venue.name,
            venue.city.and_then(|city| city.name),
            venue.location.and_then(parse_geo),
        ),
        None => (None, None, None),
    };

    let image_url = raw
        .images
        .into_iter()
        .find_map(|image| image.url.filter(|url| !url.is_empty()));

    let price_range = raw.price_ranges.into_iter().next().and_then(format_price);

    let description = raw
        .info
        .or(raw.description)
        .filter(|value| !value.trim().is_empty());

    let id = raw
        .id
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| synthesize_id(&name, start_date_time.as_deref()));

    EventRecord {
        id,
        name,
        start_date_time,
        venue_name,
        city_name,
        geo,
        image_url,
        price_range,
        description,
        ticket_url: raw.url,
    }
}

fn parse_geo(location: RawLocation) -> Option<GeoPoint> {
    let latitude = location.latitude?.trim().parse::<f64>().ok()?;
    let longitude = location.longitude?.trim().parse::<f64>().ok()?;
    Some(GeoPoint {
        latitude,
        longitude,
    })
}

fn format_price(range: RawPriceRange) -> Option<String> {
    let min = range.min?;
    let max = range.max?;
    let currency = range.currency.unwrap_or_else(|| "USD".to_string());
    Some(format!("{min} - {max} {currency}"))
}

// Stable hash over name and start so repeated fetches of the same
// id-less event agree.
fn synthesize_id(name: &str, start: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"|");
    hasher.update(start.unwrap_or_default().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"{
        "id": "G5vYZ92d3kpTf",
        "name": "Indie Rock Night",
        "url": "https://tickets.example.com/indie-rock-night",
        "info": "An evening of independent rock.",
        "dates": {
            "start": {
                "dateTime": "2025-11-02T03:00:00Z",
                "localDate": "2025-11-01",
                "localTime": "20:00:00"
            }
        },
        "_embedded": {
            "venues": [{
                "name": "The Orpheum",
                "city": { "name": "Boise" },
                "location": {
                    "latitude": "43.6187",
                    "longitude": "-116.2146"
                }
            }]
        },
        "images": [
            { "url": "https://img.example.com/indie.jpg", "width": 400, "height": 225 }
        ],
        "classifications": [
            { "segment": { "name": "Music" }, "genre": { "name": "Rock" } }
        ],
        "priceRanges": [
            { "type": "standard", "min": 25.0, "max": 45.0, "currency": "USD" }
        ]
    }"#;

    #[test]
    fn normalizes_full_payload() {
        let raw: RawEvent = serde_json::from_str(SAMPLE_JSON).expect("parse sample payload");
        let event = normalize(raw);

        assert_eq!(event.id, "G5vYZ92d3kpTf");
        assert_eq!(event.name, "Indie Rock Night");
        assert_eq!(
            event.start_date_time.as_deref(),
            Some("2025-11-02T03:00:00Z")
        );
        assert_eq!(event.venue_name.as_deref(), Some("The Orpheum"));
        assert_eq!(event.city_name.as_deref(), Some("Boise"));
        let geo = event.geo.expect("geo parsed");
        assert!((geo.latitude - 43.6187).abs() < 1e-9);
        assert!((geo.longitude - (-116.2146)).abs() < 1e-9);
        assert_eq!(
            event.image_url.as_deref(),
            Some("https://img.example.com/indie.jpg")
        );
        assert_eq!(event.price_range.as_deref(), Some("25 - 45 USD"));
        assert_eq!(
            event.description.as_deref(),
            Some("An evening of independent rock.")
        );
        assert_eq!(
            event.ticket_url.as_deref(),
            Some("https://tickets.example.com/indie-rock-night")
        );
    }

    #[test]
    fn empty_payload_yields_untitled_with_synthesized_id() {
        let event = normalize(RawEvent::default());
        assert_eq!(event.name, "Untitled Event");
        assert_eq!(event.id.len(), 64);
        assert!(event.start_date_time.is_none());
        assert!(event.venue_name.is_none());
        assert!(event.city_name.is_none());
        assert!(event.geo.is_none());
        assert!(event.image_url.is_none());
        assert!(event.price_range.is_none());
        assert!(event.description.is_none());
        assert!(event.ticket_url.is_none());
    }

    #[test]
    fn synthesized_ids_are_stable() {
        let a = normalize(serde_json::from_str(r#"{"name": "X", "dates": {"start": {"dateTime": "2025-01-01T00:00:00Z"}}}"#).unwrap());
        let b = normalize(serde_json::from_str(r#"{"name": "X", "dates": {"start": {"dateTime": "2025-01-01T00:00:00Z"}}}"#).unwrap());
        let c = normalize(serde_json::from_str(r#"{"name": "Y"}"#).unwrap());
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn unparseable_coordinates_drop_geo() {
        let raw: RawEvent = serde_json::from_str(
            r#"{
                "id": "e1",
                "name": "Somewhere",
                "_embedded": {
                    "venues": [{
                        "location": { "latitude": "not-a-number", "longitude": "-116.2" }
                    }]
                }
            }"#,
        )
        .expect("parse");
        assert!(normalize(raw).geo.is_none());
    }

    #[test]
    fn missing_longitude_drops_geo() {
        let raw: RawEvent = serde_json::from_str(
            r#"{
                "id": "e2",
                "name": "Somewhere",
                "_embedded": {
                    "venues": [{ "location": { "latitude": "43.6" } }]
                }
            }"#,
        )
        .expect("parse");
        assert!(normalize(raw).geo.is_none());
    }

    #[test]
    fn description_prefers_info() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"id": "e3", "name": "N", "info": "from info", "description": "from description"}"#,
        )
        .expect("parse");
        assert_eq!(normalize(raw).description.as_deref(), Some("from info"));

        let raw: RawEvent =
            serde_json::from_str(r#"{"id": "e4", "name": "N", "description": "from description"}"#)
                .expect("parse");
        assert_eq!(
            normalize(raw).description.as_deref(),
            Some("from description")
        );
    }

    #[test]
    fn incomplete_price_range_is_dropped() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"id": "e5", "name": "N", "priceRanges": [{ "min": 10.0 }]}"#,
        )
        .expect("parse");
        assert!(normalize(raw).price_range.is_none());
    }
}
