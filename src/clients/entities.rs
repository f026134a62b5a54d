use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable integer correlating a catalog item with its favorite and rating state.
pub type ItemKey = u64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Track,
    Artist,
}

/// A track or an artist returned by the catalog search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_genre_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_view_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_view_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_time_millis: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
}

const DEFAULT_GENRE: &str = "Music";

impl CatalogItem {
    /// Track id when present and nonzero, else the artist id.
    pub fn identity_key(&self) -> Option<ItemKey> {
        self.track_id
            .filter(|id| *id != 0)
            .or(self.artist_id.filter(|id| *id != 0))
    }

    pub fn is_track(&self) -> bool {
        self.kind == ItemKind::Track
    }

    pub fn title(&self) -> &str {
        let name = match self.kind {
            ItemKind::Track => self.track_name.as_deref(),
            ItemKind::Artist => self.artist_name.as_deref(),
        };
        name.unwrap_or_default()
    }

    /// Artist name shown under a track title. Artists have none.
    pub fn subtitle(&self) -> Option<&str> {
        match self.kind {
            ItemKind::Track => self.artist_name.as_deref(),
            ItemKind::Artist => None,
        }
    }

    pub fn genre_or_default(&self) -> &str {
        self.primary_genre_name.as_deref().unwrap_or(DEFAULT_GENRE)
    }

    /// The catalog serves 100px artwork; the same asset exists at 500px.
    pub fn large_artwork_url(&self) -> Option<String> {
        self.artwork_url
            .as_deref()
            .map(|url| url.replace("100x100", "500x500"))
    }

    pub fn external_url(&self) -> Option<&str> {
        self.collection_view_url
            .as_deref()
            .or(self.artist_link_url.as_deref())
            .or(self.track_view_url.as_deref())
    }

    pub fn previewable(&self) -> bool {
        self.is_track() && self.preview_url.is_some()
    }

    /// Track length as `m:ss`.
    pub fn formatted_duration(&self) -> Option<String> {
        if !self.is_track() {
            return None;
        }
        self.track_time_millis.map(|millis| {
            let seconds = millis / 1000;
            format!("{}:{:02}", seconds / 60, seconds % 60)
        })
    }
}

/// One element of the search endpoint's `results` array.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRecord {
    wrapper_type: Option<String>,
    track_id: Option<u64>,
    artist_id: Option<u64>,
    track_name: Option<String>,
    artist_name: Option<String>,
    collection_name: Option<String>,
    primary_genre_name: Option<String>,
    artwork_url100: Option<String>,
    preview_url: Option<String>,
    track_view_url: Option<String>,
    collection_view_url: Option<String>,
    artist_link_url: Option<String>,
    track_time_millis: Option<u64>,
    release_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SearchResponse {
    pub results: Vec<SearchRecord>,
}

impl From<SearchRecord> for CatalogItem {
    fn from(r: SearchRecord) -> CatalogItem {
        let kind = match r.wrapper_type.as_deref() {
            Some("artist") => ItemKind::Artist,
            _ => ItemKind::Track,
        };
        CatalogItem {
            kind,
            track_id: r.track_id,
            artist_id: r.artist_id,
            track_name: r.track_name,
            artist_name: r.artist_name,
            collection_name: r.collection_name,
            primary_genre_name: r.primary_genre_name,
            artwork_url: r.artwork_url100,
            preview_url: r.preview_url,
            track_view_url: r.track_view_url,
            collection_view_url: r.collection_view_url,
            artist_link_url: r.artist_link_url,
            track_time_millis: r.track_time_millis,
            release_date: r.release_date,
        }
    }
}
