use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::clients::entities::{CatalogItem, ItemKey};
use crate::clients::errors::{Error, Result};

/// Rating per identity key, 1 to 5.
pub type Ratings = BTreeMap<ItemKey, u8>;

/// Highest rating an item can receive.
pub const MAX_RATING: u8 = 5;

enum Slot {
    Favorites,
    Ratings,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Favorites => "favorites",
            Slot::Ratings => "ratings",
        }
    }
}

/// String-keyed slots with no transactional guarantees.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Keeps each slot in `<dir>/<key>.json`.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileKeyValueStore { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        let read = async {
            if !tokio::fs::try_exists(&path).await? {
                return Ok(None);
            }
            tokio::fs::read_to_string(&path).await.map(Some)
        }
        .await;
        let contents = read.map_err(|e: std::io::Error| Error::StorageReadFailed {
            slot: key.to_string(),
            reason: e.to_string(),
        })?;
        match &contents {
            Some(_) => debug!("Loaded {key} from {path:?}"),
            None => debug!("No stored {key} found in {path:?}"),
        }
        Ok(contents)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key);
        let written = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, value).await
        }
        .await;
        written.map_err(|e| Error::StorageWriteFailed {
            slot: key.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Stored {key} in {path:?}");
        Ok(())
    }
}

/// Process-local slots, for tests and throwaway sessions.
#[derive(Default, Clone)]
pub struct MemoryKeyValueStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slots<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> T {
        // A poisoned map is still a valid map of strings
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut slots)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.with_slots(|slots| slots.get(key).cloned()))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.with_slots(|slots| slots.insert(key.to_string(), value.to_string()));
        Ok(())
    }
}

/// Favorites and ratings as held in storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesState {
    pub favorites: Vec<CatalogItem>,
    pub ratings: Ratings,
}

/// Encodes favorites and ratings into their two storage slots.
pub struct LocalStorage {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStorage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        LocalStorage { backend }
    }

    pub fn in_memory() -> Self {
        LocalStorage::new(Arc::new(MemoryKeyValueStore::new()))
    }

    // TUNESEEKER_DATA_DIR when set, the platform data directory otherwise
    pub fn try_default() -> Result<Self> {
        let dir = match std::env::var("TUNESEEKER_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(std::env::VarError::NotPresent) => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if data directory can't be determined
                .join("tuneseeker"),
            Err(e) => return Err(e.into()),
        };
        debug!("Using local storage at {dir:?}");
        Ok(LocalStorage::new(Arc::new(FileKeyValueStore::new(dir))))
    }

    /// Read both slots. Each half falls back to empty on its own.
    ///
    /// Stored entries that break the store's invariants are dropped: favorites
    /// without an id or repeating an earlier id, and ratings outside 1 to 5.
    pub async fn load_state(&self) -> FavoritesState {
        let favorites: Vec<CatalogItem> = self.read_slot(&Slot::Favorites).await;
        let ratings: Ratings = self.read_slot(&Slot::Ratings).await;
        FavoritesState {
            favorites: dedup_favorites(favorites),
            ratings: valid_ratings(ratings),
        }
    }

    async fn read_slot<T: DeserializeOwned + Default>(&self, slot: &Slot) -> T {
        let raw = match self.backend.get_item(slot.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!("Failed to read {}: {e}", slot.as_str());
                return T::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(source) => {
                let err = Error::StorageReadCorrupt {
                    slot: slot.as_str(),
                    source,
                };
                warn!("{err}, starting with an empty {}", slot.as_str());
                T::default()
            }
        }
    }

    /// Write both slots, favorites first.
    pub async fn save_state(&self, favorites: &[CatalogItem], ratings: &Ratings) -> Result<()> {
        self.write_slot(&Slot::Favorites, favorites).await?;
        self.write_slot(&Slot::Ratings, ratings).await
    }

    async fn write_slot<T: serde::Serialize + ?Sized>(&self, slot: &Slot, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value).map_err(|e| Error::StorageWriteFailed {
            slot: slot.as_str().to_string(),
            reason: e.to_string(),
        })?;
        self.backend.set_item(slot.as_str(), &encoded).await
    }
}

fn dedup_favorites(favorites: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = HashSet::new();
    favorites
        .into_iter()
        .filter(|item| match item.identity_key() {
            Some(key) if seen.insert(key) => true,
            Some(key) => {
                warn!("Dropping duplicate stored favorite {key}");
                false
            }
            None => {
                warn!("Dropping stored favorite without an id: {:?}", item.title());
                false
            }
        })
        .collect()
}

fn valid_ratings(ratings: Ratings) -> Ratings {
    ratings
        .into_iter()
        .filter(|(key, rating)| {
            let valid = (1..=MAX_RATING).contains(rating);
            if !valid {
                warn!("Dropping stored rating {rating} for {key}");
            }
            valid
        })
        .collect()
}
