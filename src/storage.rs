//! Local key-value persistence and change notifications.

use crate::error::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const FAVORITES_KEY: &str = "favoritePokemons";
pub const FAVORITES_COUNT_KEY: &str = "favoritesCount";
pub const VIEWED_COUNT_KEY: &str = "pokemonViewedCount";
pub const BATTLES_WON_KEY: &str = "battlesWon";
pub const SAVED_TEAMS_KEY: &str = "savedPokedexTeams";

/// Profile save file (~/.pokedex/profile.json).
pub fn profile_save_path() -> Result<PathBuf, StoreError> {
    let home_dir = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
    Ok(home_dir.join(".pokedex").join("profile.json"))
}

/// String-valued store. Writes are synchronous and last-write-wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                tracing::error!("Failed to acquire store lock for key {}: {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("Key cannot be empty".to_string()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk, rewritten on every set.
///
/// An unreadable or corrupted file starts the store empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupted store file {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(e) => {
                tracing::debug!("Starting empty store, {} unreadable: {}", path.display(), e);
                HashMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok().and_then(|e| e.get(key).cloned())
    }

    /// The new value is visible to `get` only once it is on disk.
    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("Key cannot be empty".to_string()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))?;

        let mut next = entries.clone();
        next.insert(key.to_string(), value);
        let serialized = serde_json::to_string_pretty(&next).map_err(|e| StoreError::Serialize {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let io_error = |e: std::io::Error| {
            tracing::error!("Failed to write store file {}: {}", self.path.display(), e);
            StoreError::Io {
                key: key.to_string(),
                reason: e.to_string(),
            }
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(&self.path, serialized).map_err(io_error)?;

        *entries = next;
        Ok(())
    }
}

/// Decode the JSON value under `key`, falling back to the default when the
/// key is missing or the stored text does not parse.
pub fn read_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key) else {
        return T::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!("Stored value for {} is corrupted, using default: {}", key, e);
        T::default()
    })
}

pub fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let serialized = serde_json::to_string(value).map_err(|e| StoreError::Serialize {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, serialized)
}

/// Counters are stored as plain decimal strings.
pub fn read_counter<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> u64 {
    match store.get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!("Counter {} holds {:?}, treating as 0: {}", key, raw, e);
            0
        }),
        None => 0,
    }
}

/// Read-modify-write increment; not atomic across sessions sharing a store.
pub fn increment_counter<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<u64, StoreError> {
    let next = read_counter(store, key).saturating_add(1);
    store.set(key, next.to_string())?;
    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    FavoritesChanged,
    AchievementCountersChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(ChangeEvent) + Send + Sync>;

/// Listeners notified after a mutation lands in the store.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != self.listeners.len()
    }

    pub fn notify(&self, event: ChangeEvent) {
        tracing::debug!("Notifying {} listeners of {:?}", self.listeners.len(), event);
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
