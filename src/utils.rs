use dirs::data_dir;
use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use tracing::warn;

static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let root = base.join("event-scout");
    if let Err(err) = fs::create_dir_all(&root) {
        warn!(root = %root.display(), error = %err, "failed to create data root");
    }
    root
});

pub fn data_root() -> PathBuf {
    DATA_ROOT.clone()
}

pub fn storage_path() -> PathBuf {
    data_root().join("event-scout.sqlite")
}

pub fn config_path() -> PathBuf {
    data_root().join("config.json")
}
