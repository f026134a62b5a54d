use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use reqwest::Client;

use crate::clients::{
    entities::{CatalogItem, SearchResponse},
    errors::{Error, Result},
};

/// Public iTunes Search API endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://itunes.apple.com/search";

/// Number of results requested per search.
pub const SEARCH_LIMIT: u32 = 20;

/// Coarse search scope sent to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SearchFilter {
    #[default]
    All,
    Artist,
    Track,
}

impl SearchFilter {
    /// The single query parameter that selects this scope.
    pub fn query_param(self) -> (&'static str, &'static str) {
        match self {
            SearchFilter::Artist => ("entity", "musicArtist"),
            SearchFilter::Track => ("entity", "song"),
            SearchFilter::All => ("media", "music"),
        }
    }
}

impl FromStr for SearchFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(SearchFilter::All),
            "artist" => Ok(SearchFilter::Artist),
            "track" => Ok(SearchFilter::Track),
            other => Err(Error::ConfigurationError(format!(
                "Unknown search filter: {other}"
            ))),
        }
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchFilter::All => "all",
            SearchFilter::Artist => "artist",
            SearchFilter::Track => "track",
        };
        f.write_str(name)
    }
}

/// Client for the catalog search endpoint.
pub struct CatalogClient {
    http: Client,
    search_url: String,
}

impl CatalogClient {
    pub fn new(http: Client, search_url: impl Into<String>) -> Self {
        CatalogClient {
            http,
            search_url: search_url.into(),
        }
    }

    // Use ITUNES_SEARCH_URL when set, the public endpoint otherwise
    pub fn try_default() -> Result<Self> {
        let search_url = match std::env::var("ITUNES_SEARCH_URL") {
            Ok(url) => url,
            Err(std::env::VarError::NotPresent) => DEFAULT_SEARCH_URL.to_string(),
            Err(e) => return Err(e.into()),
        };
        Ok(CatalogClient::new(Client::new(), search_url))
    }

    /// Run one query against the catalog.
    ///
    /// A blank term returns no results without touching the network. Results
    /// keep the endpoint's order; records carrying no usable id are dropped.
    pub async fn search(&self, term: &str, filter: SearchFilter) -> Result<Vec<CatalogItem>> {
        let term = term.trim();
        if term.is_empty() {
            debug!("Skipping search for blank term");
            return Ok(Vec::new());
        }

        let (filter_key, filter_value) = filter.query_param();
        let limit = SEARCH_LIMIT.to_string();
        debug!("Searching catalog for {term:?} ({filter})");

        let response: SearchResponse = self
            .http
            .get(&self.search_url)
            .query(&[
                ("term", term),
                ("limit", limit.as_str()),
                (filter_key, filter_value),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items: Vec<CatalogItem> = response
            .results
            .into_iter()
            .map(CatalogItem::from)
            .filter(|item| {
                let keep = item.identity_key().is_some();
                if !keep {
                    warn!("Dropping search result without an id: {:?}", item.title());
                }
                keep
            })
            .collect();

        debug!("Catalog returned {} items for {term:?}", items.len());
        Ok(items)
    }
}
