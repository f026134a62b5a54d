//! Favorites and ratings kept across runs.
//!
//! The store starts out [`StoreState::Loading`] and only writes to storage once
//! [`FavoritesStore::load`] has hydrated it, so an empty in-memory state can
//! never overwrite what is on disk.

use log::{debug, info, warn};

use crate::clients::{
    entities::{CatalogItem, ItemKey},
    errors::{Error, Result},
    local_storage::{FavoritesState, LocalStorage, Ratings},
};

pub use crate::clients::local_storage::MAX_RATING;

/// Whether stored favorites have been read yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Loading,
    Ready,
}

/// Favorites list and ratings map, written back after every change.
pub struct FavoritesStore {
    storage: LocalStorage,
    data: FavoritesState,
    state: StoreState,
}

impl FavoritesStore {
    pub fn new(storage: LocalStorage) -> Self {
        FavoritesStore {
            storage,
            data: FavoritesState::default(),
            state: StoreState::Loading,
        }
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Hydrate from storage and become ready. Only the first call reads;
    /// whatever was changed while loading is replaced by the stored state.
    pub async fn load(&mut self) -> &FavoritesState {
        if self.state == StoreState::Ready {
            debug!("Favorites already loaded");
            return &self.data;
        }
        self.data = self.storage.load_state().await;
        self.state = StoreState::Ready;
        info!(
            "Loaded {} favorites and {} ratings",
            self.data.favorites.len(),
            self.data.ratings.len()
        );
        &self.data
    }

    pub fn favorites(&self) -> &[CatalogItem] {
        &self.data.favorites
    }

    pub fn ratings(&self) -> &Ratings {
        &self.data.ratings
    }

    pub fn is_favorite(&self, key: ItemKey) -> bool {
        self.data
            .favorites
            .iter()
            .any(|item| item.identity_key() == Some(key))
    }

    /// Append `item` unless an item with the same key is already a favorite.
    pub async fn add_to_favorites(&mut self, item: CatalogItem) -> Result<()> {
        let key = item.identity_key().ok_or(Error::MissingIdentity)?;
        if self.is_favorite(key) {
            debug!("Item {key} is already a favorite");
            return Ok(());
        }
        self.data.favorites.push(item);
        debug!("Added {key} to favorites");
        self.persist().await;
        Ok(())
    }

    pub async fn remove_from_favorites(&mut self, key: ItemKey) {
        let before = self.data.favorites.len();
        self.data
            .favorites
            .retain(|item| item.identity_key() != Some(key));
        debug!(
            "Removed {} favorites with key {key}",
            before - self.data.favorites.len()
        );
        self.persist().await;
    }

    /// Flip the favorite flag of `item`. Returns whether it is now a favorite.
    pub async fn toggle_favorite(&mut self, item: CatalogItem) -> Result<bool> {
        let key = item.identity_key().ok_or(Error::MissingIdentity)?;
        if self.is_favorite(key) {
            self.remove_from_favorites(key).await;
            Ok(false)
        } else {
            self.add_to_favorites(item).await?;
            Ok(true)
        }
    }

    pub async fn rate_item(&mut self, key: ItemKey, rating: u8) -> Result<()> {
        if !(1..=MAX_RATING).contains(&rating) {
            return Err(Error::InvalidRating(rating));
        }
        self.data.ratings.insert(key, rating);
        debug!("Rated {key} with {rating}");
        self.persist().await;
        Ok(())
    }

    /// Rating for `key`, 0 when unrated.
    pub fn rating(&self, key: ItemKey) -> u8 {
        self.data.ratings.get(&key).copied().unwrap_or(0)
    }

    // Best effort: a failed write only costs local convenience state
    async fn persist(&self) {
        if self.state == StoreState::Loading {
            debug!("Store still loading, not persisting");
            return;
        }
        if let Err(e) = self
            .storage
            .save_state(&self.data.favorites, &self.data.ratings)
            .await
        {
            warn!("Error saving favorites: {e}");
        }
    }
}
