//! # Preloader Sample
//!
//! Loads every member of a small library together with their books, each book's author and
//! the place it is shelved at, using one batch per relation instead of one query per row.
//!
//! ## Core Components
//!
//! - **[model](preloader_sample::model)**: [`User`](preloader_sample::model::User), [`Book`](preloader_sample::model::Book)
//!   and [`Place`](preloader_sample::model::Place), each a [`Resource`](preloader::Resource).
//! - **[repository](preloader_sample::repository)**: in-memory data sources that double as node fetchers.
//! - **[relations](preloader_sample::relations)**: resolvers and registry keys for the three relations.
//! - **[lifecycle](preloader_sample::lifecycle)**: [`LibrarySystem`] wires it all together.
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -p preloader-sample
//! ```

use preloader::PreloadError;
use preloader_sample::lifecycle::{setup_tracing, LibrarySystem};
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), PreloadError> {
    setup_tracing();

    info!("Starting library preload");

    let system = LibrarySystem::new();
    let ctx = CancellationToken::new();
    let users = system.users.all();

    let span = tracing::info_span!("preload_users");
    system.preload_users(&ctx, &users).instrument(span).await?;

    // Everything below is served from the loader caches
    for user in &users {
        for book in system.books_of(&ctx, user).await? {
            let place = system.place_of(&ctx, &book).await?;
            let author = system.author_of(&ctx, &book).await?;
            println!(
                "user: {}, title: {}, place: {}, author: {}",
                user.name,
                book.title,
                place.map_or_else(|| "-".to_string(), |p| format!("{} ({})", p.name, p.id)),
                author.map_or_else(|| "-".to_string(), |a| format!("{} ({})", a.name, a.id)),
            );
        }
    }

    info!(
        book_calls = system.books.list_calls(),
        ownership_calls = system.books.by_users_calls(),
        user_calls = system.users.list_calls(),
        place_calls = system.places.list_calls(),
        "Application completed successfully"
    );
    Ok(())
}
