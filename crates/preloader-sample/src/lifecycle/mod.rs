//! # System Lifecycle & Wiring
//!
//! Loaders, repositories and resolvers are simple on their own; **wiring them together** is
//! where the complexity lives. This module builds the whole library graph in one place.
//!
//! ## The LibrarySystem Pattern
//!
//! [`LibrarySystem::new`] wires the graph bottom-up:
//!
//! ```rust,ignore
//! // 1. Repositories (shared through Arc so tests can inspect call counts)
//! let users = Arc::new(UserRepository::seeded());
//!
//! // 2. Leaf loaders first, so they can be attached as children
//! let authors = Arc::new(HasOneLoadable::new("Authors", book_to_author(), users.clone())
//!     .with_accept_not_found(true));
//!
//! // 3. The root loader carries the leaves
//! let books = Arc::new(Loadable::new("Books", UsersToBooks::new(books_repo.clone()), books_repo)
//!     .with_child(authors.clone())
//!     .with_child(places.clone()));
//!
//! // 4. Register everything for late lookup
//! registry.register::<BooksKey>(books);
//! ```
//!
//! ## Late Lookup via the Registry
//!
//! Accessors such as [`LibrarySystem::author_of`] fetch their loader from the
//! [`TypedRegistry`](preloader::TypedRegistry) instead of holding it directly. That is the same
//! late binding that lets repositories reference each other's loaders without a construction
//! cycle.
//!
//! ## Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging for the binary.

pub mod library_system;
pub mod tracing;

pub use self::library_system::*;
pub use self::tracing::*;
