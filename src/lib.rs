//! Tuneseeker - Search the iTunes music catalog and keep local favorites
//!
//! This library provides a client for the iTunes Search API and a small store
//! of favorite items and 1 to 5 ratings persisted in local key-value slots.

/// Application object and its configuration
pub mod app;
/// Client modules for interacting with the catalog and local storage
pub mod clients;
/// Favorites and ratings store
pub mod favorites;
