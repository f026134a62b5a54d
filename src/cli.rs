use std::fmt::Write as _;

use clap::{Parser, Subcommand};
use log::info;
use tuneseeker::app::{App, ConfigBuilder, SearchHit};
use tuneseeker::clients::{entities::ItemKey, errors::Result, itunes::SearchFilter};
use tuneseeker::favorites::MAX_RATING;

#[derive(Parser)]
#[command(name = "tuneseeker")]
#[command(version, about = "Search the iTunes music catalog and keep local favorites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search tracks and artists
    Search {
        term: String,
        #[arg(short, long, value_enum, default_value_t = SearchFilter::All)]
        filter: SearchFilter,
    },
    /// Show details of one search result
    Show {
        term: String,
        key: ItemKey,
        #[arg(short, long, value_enum, default_value_t = SearchFilter::All)]
        filter: SearchFilter,
    },
    /// Add a search result to favorites
    Favorite {
        term: String,
        key: ItemKey,
        #[arg(short, long, value_enum, default_value_t = SearchFilter::All)]
        filter: SearchFilter,
    },
    /// Remove an item from favorites
    Unfavorite { key: ItemKey },
    /// Rate an item from 1 to 5
    Rate {
        key: ItemKey,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=i64::from(MAX_RATING)))]
        rating: u8,
    },
    /// List favorites with their ratings
    Favorites,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    info!("Building config ...");
    let config = ConfigBuilder::new().build()?;
    let mut app = App::start(config).await;

    match cli.command {
        Commands::Search { term, filter } => {
            let hits = app.search_or_empty(&term, filter).await;
            if hits.is_empty() {
                println!("No results for {term:?}");
            }
            for hit in &hits {
                println!("{}", render_row(hit));
            }
        }
        Commands::Show { term, key, filter } => {
            let hit = app.find(&term, filter, key).await?;
            print!("{}", render_detail(&hit));
        }
        Commands::Favorite { term, key, filter } => {
            let hit = app.find(&term, filter, key).await?;
            app.favorites_mut().add_to_favorites(hit.item).await?;
            println!("Added {key} to favorites");
        }
        Commands::Unfavorite { key } => {
            app.favorites_mut().remove_from_favorites(key).await;
            println!("Removed {key} from favorites");
        }
        Commands::Rate { key, rating } => {
            app.favorites_mut().rate_item(key, rating).await?;
            println!("Rated {key}: {}", stars(rating));
        }
        Commands::Favorites => {
            let hits = app.favorite_hits();
            if hits.is_empty() {
                println!("No favorites yet");
            }
            for hit in &hits {
                println!("{}", render_row(hit));
            }
        }
    }
    Ok(())
}

fn stars(rating: u8) -> String {
    (1..=MAX_RATING)
        .map(|i| if i <= rating { '★' } else { '☆' })
        .collect()
}

fn render_row(hit: &SearchHit) -> String {
    let item = &hit.item;
    let key = item
        .identity_key()
        .map_or_else(|| "-".to_string(), |k| k.to_string());
    let heart = if hit.favorite { "♥" } else { " " };
    let mut row = format!("{heart} {key:>12}  {}", item.title());
    if let Some(artist) = item.subtitle() {
        let _ = write!(row, " - {artist}");
    }
    let _ = write!(row, "  [{}]", item.genre_or_default());
    if hit.rating > 0 {
        let _ = write!(row, "  {}", stars(hit.rating));
    }
    row
}

fn render_detail(hit: &SearchHit) -> String {
    let item = &hit.item;
    let mut out = String::new();
    let _ = writeln!(out, "{}", item.title());
    if item.is_track() {
        if let Some(artist) = &item.artist_name {
            let _ = writeln!(out, "  Artist:   {artist}");
        }
        if let Some(album) = &item.collection_name {
            let _ = writeln!(out, "  Album:    {album}");
        }
        if let Some(duration) = item.formatted_duration() {
            let _ = writeln!(out, "  Duration: {duration}");
        }
        if let Some(released) = item.release_date {
            let _ = writeln!(out, "  Released: {}", released.format("%Y-%m-%d"));
        }
    }
    let _ = writeln!(out, "  Genre:    {}", item.genre_or_default());
    let _ = writeln!(out, "  Rating:   {}", stars(hit.rating));
    let _ = writeln!(
        out,
        "  Favorite: {}",
        if hit.favorite { "yes" } else { "no" }
    );
    if let Some(artwork) = item.large_artwork_url() {
        let _ = writeln!(out, "  Artwork:  {artwork}");
    }
    if item.previewable() {
        if let Some(preview) = &item.preview_url {
            let _ = writeln!(out, "  Preview:  {preview}");
        }
    }
    if let Some(link) = item.external_url() {
        let _ = writeln!(out, "  Link:     {link}");
    }
    out
}
