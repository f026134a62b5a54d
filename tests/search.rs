use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use tuneseeker::app::{App, ConfigBuilder};
use tuneseeker::clients::{
    CatalogClient, LocalStorage,
    entities::ItemKind,
    errors::Error,
    itunes::{SEARCH_LIMIT, SearchFilter},
};

type Params = HashMap<String, String>;

#[derive(Default)]
struct Catalog {
    requests: Mutex<Vec<Params>>,
}

impl Catalog {
    fn requests(&self) -> Vec<Params> {
        self.requests.lock().unwrap().clone()
    }
}

fn adele_artists() -> Value {
    json!({
        "resultCount": 2,
        "results": [
            {
                "wrapperType": "artist",
                "artistType": "Artist",
                "artistName": "Adele",
                "artistLinkUrl": "https://music.apple.com/artist/adele/262836961",
                "artistId": 262836961,
                "primaryGenreName": "Pop"
            },
            {
                "wrapperType": "artist",
                "artistType": "Artist",
                "artistName": "Adele Tribute Band",
                "artistId": 1000000001
            }
        ]
    })
}

fn mixed_tracks() -> Value {
    json!({
        "resultCount": 3,
        "results": [
            {
                "wrapperType": "track",
                "kind": "song",
                "artistId": 262836961,
                "trackId": 1051394215,
                "artistName": "Adele",
                "trackName": "Hello",
                "collectionName": "25",
                "trackTimeMillis": 295502,
                "releaseDate": "2015-10-23T07:00:00Z"
            },
            {
                "wrapperType": "track",
                "trackName": "Orphan record"
            },
            {
                "wrapperType": "track",
                "artistId": 262836961,
                "trackId": 1440843496,
                "artistName": "Adele",
                "trackName": "Skyfall"
            }
        ]
    })
}

async fn search(State(catalog): State<Arc<Catalog>>, Query(params): Query<Params>) -> Json<Value> {
    let body = match params.get("entity").map(String::as_str) {
        Some("musicArtist") => adele_artists(),
        _ => mixed_tracks(),
    };
    catalog.requests.lock().unwrap().push(params);
    Json(body)
}

async fn serve() -> (String, Arc<Catalog>) {
    let catalog = Arc::new(Catalog::default());
    let router = Router::new()
        .route("/search", get(search))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
        )
        .route("/garbage", get(|| async { "<html>not json</html>" }))
        .with_state(catalog.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), catalog)
}

fn client(base: &str, path: &str) -> CatalogClient {
    CatalogClient::new(reqwest::Client::new(), format!("{base}{path}"))
}

#[tokio::test]
async fn blank_term_never_hits_the_network() {
    let (base, catalog) = serve().await;
    let client = client(&base, "/search");

    let items = client.search("  ", SearchFilter::All).await.unwrap();
    assert!(items.is_empty());
    let items = client.search("", SearchFilter::Track).await.unwrap();
    assert!(items.is_empty());
    assert!(catalog.requests().is_empty());
}

#[tokio::test]
async fn artist_search_keeps_endpoint_order() {
    let (base, catalog) = serve().await;
    let client = client(&base, "/search");

    let items = client.search("adele", SearchFilter::Artist).await.unwrap();

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.kind == ItemKind::Artist));
    assert_eq!(items[0].title(), "Adele");
    assert_eq!(items[1].title(), "Adele Tribute Band");
    assert_eq!(items[0].identity_key(), Some(262_836_961));
    assert_eq!(catalog.requests().len(), 1);
}

#[tokio::test]
async fn filters_map_to_query_parameters() {
    let (base, catalog) = serve().await;
    let client = client(&base, "/search");

    client.search(" adele ", SearchFilter::Artist).await.unwrap();
    client.search("adele", SearchFilter::Track).await.unwrap();
    client.search("adele", SearchFilter::All).await.unwrap();

    let requests = catalog.requests();
    assert_eq!(requests.len(), 3);
    let limit = SEARCH_LIMIT.to_string();
    for params in &requests {
        assert_eq!(params.get("term").map(String::as_str), Some("adele"));
        assert_eq!(params.get("limit"), Some(&limit));
    }
    assert_eq!(requests[0].get("entity").map(String::as_str), Some("musicArtist"));
    assert!(!requests[0].contains_key("media"));
    assert_eq!(requests[1].get("entity").map(String::as_str), Some("song"));
    assert!(!requests[1].contains_key("media"));
    assert_eq!(requests[2].get("media").map(String::as_str), Some("music"));
    assert!(!requests[2].contains_key("entity"));
}

#[tokio::test]
async fn records_without_ids_are_dropped() {
    let (base, _catalog) = serve().await;
    let client = client(&base, "/search");

    let items = client.search("adele", SearchFilter::Track).await.unwrap();

    let titles: Vec<_> = items.iter().map(|item| item.title()).collect();
    assert_eq!(titles, vec!["Hello", "Skyfall"]);
    assert_eq!(items[0].formatted_duration().as_deref(), Some("4:55"));
}

#[tokio::test]
async fn server_errors_surface_as_query_failed() {
    let (base, _catalog) = serve().await;

    let err = client(&base, "/broken")
        .search("adele", SearchFilter::All)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QueryFailed(_)));
}

#[tokio::test]
async fn malformed_body_surfaces_as_query_failed() {
    let (base, _catalog) = serve().await;

    let err = client(&base, "/garbage")
        .search("adele", SearchFilter::All)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QueryFailed(_)));
}

#[tokio::test]
async fn unreachable_endpoint_surfaces_as_query_failed() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"), "/search")
        .search("adele", SearchFilter::All)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QueryFailed(_)));
}

#[tokio::test]
async fn app_marks_favorites_and_ratings_on_hits() {
    let (base, _catalog) = serve().await;
    let config = ConfigBuilder::new()
        .catalog(client(&base, "/search"))
        .storage(LocalStorage::in_memory())
        .build()
        .unwrap();
    let mut app = App::start(config).await;

    let hello = app
        .find("adele", SearchFilter::Track, 1_051_394_215)
        .await
        .unwrap();
    assert!(!hello.favorite);
    app.favorites_mut()
        .add_to_favorites(hello.item)
        .await
        .unwrap();
    app.favorites_mut().rate_item(1_440_843_496, 5).await.unwrap();

    let hits = app.search("adele", SearchFilter::Track).await.unwrap();
    assert!(hits[0].favorite);
    assert_eq!(hits[0].rating, 0);
    assert!(!hits[1].favorite);
    assert_eq!(hits[1].rating, 5);

    let favorites = app.favorite_hits();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].item.title(), "Hello");
}

#[tokio::test]
async fn app_reports_missing_items_and_tolerates_failed_queries() {
    let (base, _catalog) = serve().await;
    let config = ConfigBuilder::new()
        .catalog(client(&base, "/search"))
        .storage(LocalStorage::in_memory())
        .build()
        .unwrap();
    let app = App::start(config).await;

    let err = app.find("adele", SearchFilter::Track, 42).await.unwrap_err();
    assert!(matches!(err, Error::ItemNotFound(42)));

    let broken = ConfigBuilder::new()
        .catalog(client(&base, "/broken"))
        .storage(LocalStorage::in_memory())
        .build()
        .unwrap();
    let app = App::start(broken).await;
    assert!(app.search_or_empty("adele", SearchFilter::All).await.is_empty());
}
