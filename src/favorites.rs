//! Durable, process-local set of favorited events.
//!
//! Membership changes are synchronous in memory; the durable write is an
//! asynchronous task serialized behind a gate, so interleaved toggles
//! never produce partial writes and the last toggle wins. A crash between
//! mutation and persistence loses at most the latest toggle.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::{self, JoinHandle};
use tracing::warn;

use crate::models::EventRecord;
use crate::storage::{Storage, FAVORITES_KEY};
use crate::utils;

/// Observable completion of a background persist, mainly for tests;
/// callers are free to drop it.
pub type PersistHandle = JoinHandle<Result<(), FavoritesError>>;

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("favorites serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persist task failed: {0}")]
    Task(String),
}

struct Inner {
    path: PathBuf,
    // Insertion order is kept for stable display.
    entries: Mutex<Vec<EventRecord>>,
    // Serializes durable writes so snapshots land in order.
    write_gate: AsyncMutex<()>,
}

#[derive(Clone)]
pub struct FavoritesStore {
    inner: Arc<Inner>,
}

impl FavoritesStore {
    pub fn load_default() -> Self {
        Self::load(utils::storage_path())
    }

    /// Reads the persisted set once at startup. Absent or malformed stored
    /// data yields an empty set, never an error.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable favorites, starting empty");
                Vec::new()
            }
        };
        Self {
            inner: Arc::new(Inner {
                path,
                entries: Mutex::new(entries),
                write_gate: AsyncMutex::new(()),
            }),
        }
    }

    pub fn favorites(&self) -> Vec<EventRecord> {
        self.inner
            .entries
            .lock()
            .expect("favorites mutex poisoned")
            .clone()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.inner
            .entries
            .lock()
            .expect("favorites mutex poisoned")
            .iter()
            .any(|entry| entry.id == id)
    }

    /// Adds the full record if absent, removes it if present. Returns the
    /// new membership plus a handle on the background persist.
    pub fn toggle_favorite(&self, event: &EventRecord) -> (bool, PersistHandle) {
        let now_favorite = {
            let mut entries = self.inner.entries.lock().expect("favorites mutex poisoned");
            if entries.iter().any(|entry| entry.id == event.id) {
                entries.retain(|entry| entry.id != event.id);
                false
            } else {
                entries.push(event.clone());
                true
            }
        };
        (now_favorite, self.persist())
    }

    pub fn clear(&self) -> PersistHandle {
        self.inner
            .entries
            .lock()
            .expect("favorites mutex poisoned")
            .clear();
        self.persist()
    }

    // Snapshots the set at write time (not at spawn time), so whichever
    // write lands last carries the latest membership.
    fn persist(&self) -> PersistHandle {
        let inner = Arc::clone(&self.inner);
        task::spawn(async move {
            let _gate = inner.write_gate.lock().await;
            let snapshot = inner
                .entries
                .lock()
                .expect("favorites mutex poisoned")
                .clone();
            let path = inner.path.clone();
            task::spawn_blocking(move || write_entries(&path, &snapshot))
                .await
                .map_err(|err| FavoritesError::Task(err.to_string()))?
        })
    }
}

fn read_entries(path: &Path) -> Result<Vec<EventRecord>, FavoritesError> {
    let storage = Storage::open(path)?;
    match storage.get(FAVORITES_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

fn write_entries(path: &Path, entries: &[EventRecord]) -> Result<(), FavoritesError> {
    let storage = Storage::open(path)?;
    if entries.is_empty() {
        storage.remove(FAVORITES_KEY)?;
    } else {
        storage.put(FAVORITES_KEY, &serde_json::to_string(entries)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("favorites.sqlite")
    }

    #[tokio::test]
    async fn toggle_sets_membership_immediately() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FavoritesStore::load(store_path(&dir));
        let event = sample::default_event().expect("sample event");

        assert!(!store.is_favorite(&event.id));
        let (now_favorite, persist) = store.toggle_favorite(&event);
        assert!(now_favorite);
        assert!(store.is_favorite(&event.id));
        persist.await.expect("join").expect("persist");

        let (now_favorite, persist) = store.toggle_favorite(&event);
        assert!(!now_favorite);
        assert!(!store.is_favorite(&event.id));
        persist.await.expect("join").expect("persist");
    }

    #[tokio::test]
    async fn toggle_pair_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FavoritesStore::load(store_path(&dir));
        let event = sample::default_event().expect("sample event");

        // Two rapid toggles on the same id: final membership unchanged.
        let (_, first) = store.toggle_favorite(&event);
        let (_, second) = store.toggle_favorite(&event);
        first.await.expect("join").expect("persist");
        second.await.expect("join").expect("persist");

        assert!(!store.is_favorite(&event.id));
        assert!(store.favorites().is_empty());

        let reloaded = FavoritesStore::load(store_path(&dir));
        assert!(reloaded.favorites().is_empty());
    }

    #[tokio::test]
    async fn persisted_set_round_trips_into_fresh_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = store_path(&dir);

        let store = FavoritesStore::load(&path);
        let mut handles = Vec::new();
        for event in sample::sample_events() {
            let (added, persist) = store.toggle_favorite(&event);
            assert!(added);
            handles.push(persist);
        }
        for handle in handles {
            handle.await.expect("join").expect("persist");
        }

        let reloaded = FavoritesStore::load(&path);
        assert_eq!(reloaded.favorites(), store.favorites());
        assert_eq!(reloaded.favorites().len(), 3);
        // Insertion order survives the round trip.
        assert_eq!(reloaded.favorites()[0].id, "sample-event-1");
        assert!(reloaded.is_favorite("sample-event-2"));
    }

    #[tokio::test]
    async fn clear_empties_memory_and_durable_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = store_path(&dir);

        let store = FavoritesStore::load(&path);
        let event = sample::default_event().expect("sample event");
        let (_, persist) = store.toggle_favorite(&event);
        persist.await.expect("join").expect("persist");

        store.clear().await.expect("join").expect("persist");
        assert!(store.favorites().is_empty());

        let reloaded = FavoritesStore::load(&path);
        assert!(reloaded.favorites().is_empty());
    }

    #[tokio::test]
    async fn malformed_persisted_state_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = store_path(&dir);

        Storage::open(&path)
            .expect("open storage")
            .put(FAVORITES_KEY, "{definitely not an array")
            .expect("seed corrupt payload");

        let store = FavoritesStore::load(&path);
        assert!(store.favorites().is_empty());

        // The store still works after recovery.
        let event = sample::default_event().expect("sample event");
        let (added, persist) = store.toggle_favorite(&event);
        assert!(added);
        persist.await.expect("join").expect("persist");
        assert!(FavoritesStore::load(&path).is_favorite(&event.id));
    }
}
