use crate::model::{Book, Place, User};
use crate::relations::{
    book_to_author, book_to_place, AuthorsKey, BooksKey, PlacesKey, UsersToBooks,
};
use crate::repository::{BookRepository, PlaceRepository, UserRepository};
use preloader::{
    preload, HasOneLoadable, Loadable, LoadableProvider, LoaderConfig, PreloadError, RelationKey,
    TypedRegistry,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Owns the repositories and the loader graph of the library.
///
/// ```text
/// User ──Books──▶ Book ──Authors──▶ User
///                      └─Places───▶ Place
/// ```
///
/// Both to-one relations accept a missing target: a book by a non-member or on a closed shelf
/// simply has no author or place.
pub struct LibrarySystem {
    pub users: Arc<UserRepository>,
    pub books: Arc<BookRepository>,
    pub places: Arc<PlaceRepository>,
    registry: TypedRegistry,
    provider: LoadableProvider,
}

impl Default for LibrarySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl LibrarySystem {
    /// Seeded repositories, default loader configuration.
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self::with_repositories(
            Arc::new(UserRepository::seeded()),
            Arc::new(BookRepository::seeded()),
            Arc::new(PlaceRepository::seeded()),
            config,
        )
    }

    /// Builds the loader graph over the given repositories and registers every loader.
    pub fn with_repositories(
        users: Arc<UserRepository>,
        books: Arc<BookRepository>,
        places: Arc<PlaceRepository>,
        config: LoaderConfig,
    ) -> Self {
        let authors_loader = Arc::new(
            HasOneLoadable::<Book, User>::new(AuthorsKey::NAME, book_to_author(), users.clone())
                .with_accept_not_found(true)
                .with_config(config),
        );
        let places_loader = Arc::new(
            HasOneLoadable::<Book, Place>::new(PlacesKey::NAME, book_to_place(), places.clone())
                .with_accept_not_found(true)
                .with_config(config),
        );
        let books_loader = Arc::new(
            Loadable::<User, Book>::new(
                BooksKey::NAME,
                UsersToBooks::new(books.clone()),
                books.clone(),
            )
            .with_config(config)
            .with_child(authors_loader.clone())
            .with_child(places_loader.clone()),
        );

        let registry = TypedRegistry::new();
        registry.register::<BooksKey>(books_loader.clone());
        registry.register::<AuthorsKey>(authors_loader.clone());
        registry.register::<PlacesKey>(places_loader.clone());

        let provider = LoadableProvider::new();
        provider.register(BooksKey::NAME, books_loader);
        provider.register(AuthorsKey::NAME, authors_loader);
        provider.register(PlacesKey::NAME, places_loader);

        info!(relations = registry.len(), ?config, "Library system ready");

        Self {
            users,
            books,
            places,
            registry,
            provider,
        }
    }

    /// Loaders keyed by relation token.
    pub fn registry(&self) -> &TypedRegistry {
        &self.registry
    }

    /// The same loaders keyed by relation name.
    pub fn provider(&self) -> &LoadableProvider {
        &self.provider
    }

    /// Preloads books, their authors and their places for `users` in one pass.
    #[instrument(skip_all, fields(users = users.len()))]
    pub async fn preload_users(
        &self,
        ctx: &CancellationToken,
        users: &[User],
    ) -> Result<(), PreloadError> {
        let books = self.registry.require::<BooksKey>()?;
        preload(ctx, users, &[&*books]).await?;
        debug!(
            book_calls = self.books.list_calls(),
            user_calls = self.users.list_calls(),
            place_calls = self.places.list_calls(),
            "Preload finished"
        );
        Ok(())
    }

    pub async fn books_of(
        &self,
        ctx: &CancellationToken,
        user: &User,
    ) -> Result<Vec<Book>, PreloadError> {
        self.registry.require::<BooksKey>()?.load(ctx, user).await
    }

    /// `None` when the author is not a member.
    pub async fn author_of(
        &self,
        ctx: &CancellationToken,
        book: &Book,
    ) -> Result<Option<User>, PreloadError> {
        self.registry.require::<AuthorsKey>()?.load(ctx, book).await
    }

    /// `None` when the book's place no longer exists.
    pub async fn place_of(
        &self,
        ctx: &CancellationToken,
        book: &Book,
    ) -> Result<Option<Place>, PreloadError> {
        self.registry.require::<PlacesKey>()?.load(ctx, book).await
    }
}
