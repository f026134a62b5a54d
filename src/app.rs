use log::{info, warn};

use crate::clients::{
    CatalogClient, LocalStorage,
    entities::{CatalogItem, ItemKey},
    errors::{Error, Result},
    itunes::SearchFilter,
};
use crate::favorites::FavoritesStore;

/// Collaborators the app is built from.
pub struct Config {
    pub catalog: CatalogClient,
    pub storage: LocalStorage,
}

/// Assembles a [`Config`], filling unset parts from the environment.
#[derive(Default)]
pub struct ConfigBuilder {
    catalog: Option<CatalogClient>,
    storage: Option<LocalStorage>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn catalog(mut self, catalog: CatalogClient) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: LocalStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> Result<Config> {
        let catalog = match self.catalog {
            Some(c) => c,
            None => CatalogClient::try_default()?,
        };
        let storage = match self.storage {
            Some(s) => s,
            None => LocalStorage::try_default()?,
        };
        Ok(Config { catalog, storage })
    }
}

/// A search result together with its local favorite and rating state.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub item: CatalogItem,
    pub favorite: bool,
    pub rating: u8,
}

/// Owns the catalog client and the one favorites store of the process.
pub struct App {
    catalog: CatalogClient,
    favorites: FavoritesStore,
}

impl App {
    /// Build the app and load persisted favorites before handing it out.
    pub async fn start(config: Config) -> Self {
        let mut favorites = FavoritesStore::new(config.storage);
        favorites.load().await;
        App {
            catalog: config.catalog,
            favorites,
        }
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    pub async fn search(&self, term: &str, filter: SearchFilter) -> Result<Vec<SearchHit>> {
        let items = self.catalog.search(term, filter).await?;
        info!("Found {} results for {term:?}", items.len());
        Ok(items.into_iter().map(|item| self.hit(item)).collect())
    }

    /// Search and treat a failed query as an empty result list.
    pub async fn search_or_empty(&self, term: &str, filter: SearchFilter) -> Vec<SearchHit> {
        match self.search(term, filter).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Search for {term:?} failed: {e}");
                Vec::new()
            }
        }
    }

    /// Look up one item of a search by its identity key.
    pub async fn find(&self, term: &str, filter: SearchFilter, key: ItemKey) -> Result<SearchHit> {
        self.search(term, filter)
            .await?
            .into_iter()
            .find(|hit| hit.item.identity_key() == Some(key))
            .ok_or(Error::ItemNotFound(key))
    }

    /// Favorites in insertion order with their ratings.
    pub fn favorite_hits(&self) -> Vec<SearchHit> {
        self.favorites
            .favorites()
            .iter()
            .cloned()
            .map(|item| self.hit(item))
            .collect()
    }

    fn hit(&self, item: CatalogItem) -> SearchHit {
        let (favorite, rating) = match item.identity_key() {
            Some(key) => (self.favorites.is_favorite(key), self.favorites.rating(key)),
            None => (false, 0),
        };
        SearchHit {
            item,
            favorite,
            rating,
        }
    }
}
