use anyhow::Result;
use tracing_subscriber::EnvFilter;

use event_scout::{ConfigStore, EventSource, FavoritesStore, SearchQuery, SearchSession, SearchState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let keyword = args.next().unwrap_or_default();
    let city = args.next().unwrap_or_default();

    let config = ConfigStore::load().read();
    let favorites = FavoritesStore::load_default();
    let session = SearchSession::new(EventSource::from_config(&config));

    session.search(SearchQuery::new(keyword, city)).await;

    match session.state() {
        SearchState::Success(events) if events.is_empty() => println!("No events found."),
        SearchState::Success(events) => {
            for event in events {
                let marker = if favorites.is_favorite(&event.id) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {name} — {venue}, {city} ({when})",
                    name = event.name,
                    venue = event.venue_name.as_deref().unwrap_or("Unknown Venue"),
                    city = event.city_name.as_deref().unwrap_or("Unknown City"),
                    when = event.start_display(),
                );
            }
        }
        SearchState::Error(message) => eprintln!("search failed: {message}"),
        SearchState::Idle | SearchState::Loading => {}
    }

    Ok(())
}
