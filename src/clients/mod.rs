/// Catalog items and the raw search records they are built from
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// iTunes Search API client
pub mod itunes;
/// Key-value slots holding favorites and ratings
pub mod local_storage;

pub use itunes::CatalogClient;
pub use local_storage::LocalStorage;
