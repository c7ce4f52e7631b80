//! Key-value persistence of opaque JSON snapshots.
//!
//! Every write replaces the whole value stored under a key. Two writers
//! sharing one store therefore overwrite each other's snapshots; the last
//! write wins.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::AppConfig;

/// Key holding the signed-in user.
pub const CURRENT_USER_KEY: &str = "currentUser";
/// Key holding every trade listing.
pub const TRADE_LISTINGS_KEY: &str = "tradeListings";

/// Key holding the collection owned by `user_id`.
pub fn collection_key(user_id: &str) -> String {
    format!("{user_id}_collection")
}

/// Backing store for persisted state.
pub trait PersistenceAdapter: Send + Sync {
    /// Raw value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>>;
    /// Replace the value stored under `key`.
    fn save(&self, key: &str, value: &str) -> Result<()>;
    /// Delete `key`; deleting a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Load and decode the JSON value under `key`.
pub fn load_json<T: DeserializeOwned>(store: &dyn PersistenceAdapter, key: &str) -> Result<Option<T>> {
    match store.load(key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse stored value for {key}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Like [`load_json`] but logs and discards unreadable values.
pub fn load_json_lenient<T: DeserializeOwned>(store: &dyn PersistenceAdapter, key: &str) -> Option<T> {
    match load_json(store, key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, "Ignoring unreadable stored value: {err:#}");
            None
        }
    }
}

/// Decode the JSON array under `key` one element at a time, logging and
/// dropping elements that do not decode. An unreadable or non-array value
/// yields an empty list.
pub fn load_json_list<T: DeserializeOwned>(store: &dyn PersistenceAdapter, key: &str) -> Vec<T> {
    let Some(items) = load_json_lenient::<Vec<Value>>(store, key) else {
        return Vec::new();
    };
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, index, "Dropping unreadable stored element: {err}");
                None
            }
        })
        .collect();
    if decoded.len() < total {
        warn!(key, kept = decoded.len(), total, "Stored list partially restored");
    }
    decoded
}

/// Encode `value` as JSON and store it under `key`.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn PersistenceAdapter,
    key: &str,
    value: &T,
) -> Result<()> {
    let serialised = serde_json::to_string(value)
        .with_context(|| format!("failed to serialise value for {key}"))?;
    store.save(key, &serialised)
}

/// Store that keeps one `<key>.json` file per key under a root directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the configured data directory.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    /// Directory holding the stored files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

impl PersistenceAdapter for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("failed to write {}", path.display()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
        }
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.values.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl PersistenceAdapter for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

fn sanitize_key(key: &str) -> String {
    static UNSAFE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("invalid key regex"));

    let cleaned = UNSAFE.replace_all(key, "_");
    if cleaned.trim_matches('_').is_empty() {
        "value".to_string()
    } else {
        cleaned.into_owned()
    }
}
