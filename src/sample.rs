//! Built-in fallback dataset served when the remote search API is
//! unreachable, so the UI is always populable for demos and offline work.

use chrono::{DateTime, Duration, Utc};

use crate::models::{EventRecord, GeoPoint, SearchQuery};

pub fn sample_events() -> Vec<EventRecord> {
    let now = Utc::now();
    vec![
        sample_event(
            "sample-event-1",
            "Summer Music Festival",
            "Central Park",
            "New York",
            GeoPoint {
                latitude: 40.7829,
                longitude: -73.9654,
            },
            now + Duration::days(7),
            "https://api.a0.dev/assets/image?text=Summer%20Music%20Festival&aspect=16:9&seed=event1",
        ),
        sample_event(
            "sample-event-2",
            "Tech Conference 2023",
            "Convention Center",
            "San Francisco",
            GeoPoint {
                latitude: 37.7749,
                longitude: -122.4194,
            },
            now + Duration::days(14),
            "https://api.a0.dev/assets/image?text=Tech%20Conference&aspect=16:9&seed=event2",
        ),
        sample_event(
            "sample-event-3",
            "Art Exhibition",
            "Modern Art Museum",
            "Chicago",
            GeoPoint {
                latitude: 41.8781,
                longitude: -87.6298,
            },
            now + Duration::days(3),
            "https://api.a0.dev/assets/image?text=Art%20Exhibition&aspect=16:9&seed=event3",
        ),
    ]
}

/// Sample events passed through the same keyword/city predicate the
/// remote side applies server-side.
pub fn filter(query: &SearchQuery) -> Vec<EventRecord> {
    sample_events()
        .into_iter()
        .filter(|event| query.matches(event))
        .collect()
}

pub fn find_by_id(id: &str) -> Option<EventRecord> {
    sample_events().into_iter().find(|event| event.id == id)
}

/// Last-resort default when a single-event lookup fails everywhere.
pub fn default_event() -> Option<EventRecord> {
    sample_events().into_iter().next()
}

fn sample_event(
    id: &str,
    name: &str,
    venue_name: &str,
    city_name: &str,
    geo: GeoPoint,
    start: DateTime<Utc>,
    image_url: &str,
) -> EventRecord {
    EventRecord {
        id: id.to_string(),
        name: name.to_string(),
        start_date_time: Some(start.to_rfc3339()),
        venue_name: Some(venue_name.to_string()),
        city_name: Some(city_name.to_string()),
        geo: Some(geo),
        image_url: Some(image_url.to_string()),
        price_range: None,
        description: None,
        ticket_url: None,
    }
}
