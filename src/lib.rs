pub mod config;
pub mod favorites;
pub mod models;
pub mod normalize;
pub mod sample;
pub mod session;
pub mod source;
pub mod storage;
mod utils;

pub use config::{AppConfig, ConfigStore, Locale, Theme};
pub use favorites::{FavoritesStore, PersistHandle};
pub use models::{EventRecord, GeoPoint, SearchQuery};
pub use session::{SearchSession, SearchState};
pub use source::{EventProvider, EventSource, SourceError};
