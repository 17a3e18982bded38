//! # Preloader
//!
//! This crate provides batched, memoized relation loaders that remove the **N+1 problem** when
//! materializing object graphs whose edges live in external data sources.
//!
//! ## The N+1 Problem
//!
//! Rendering 100 users with their books one user at a time issues 1 query for the users and
//! 100 more for the books, and another 100 per nested relation. A preloader instead works one
//! **tree level** at a time:
//!
//! 1. **Resolve**: one call maps every parent of the level to the ids of its related nodes.
//! 2. **Fetch**: one call turns all referenced ids into nodes.
//! 3. **Cascade**: the fetched nodes become the parents of the next level.
//!
//! The result is cached per parent, so later lazy lookups are free.
//!
//! ## Architecture Overview
//!
//! 1. **Contract Layer** ([`Resource`], [`RelationResolver`], [`NodeFetcher`]) - what the caller
//!    supplies: identifiable values and two batch functions per relation.
//! 2. **Engine Layer** ([`Loadable`], [`HasOneLoadable`]) - to-many and to-one loaders, each
//!    owning its own [`LoadCache`] and an ordered list of children.
//! 3. **Orchestration Layer** ([`preload`], [`Preloadable`]) - drives a whole tree from a root
//!    parent batch.
//! 4. **Registry** ([`TypedRegistry`], [`LoadableProvider`]) - shares loader instances between
//!    collaborators that would otherwise depend on each other.
//!
//! ## Example
//!
//! ```rust
//! use preloader::{fetcher_fn, preload, resolver_fn, BoxError, HasOneLoadable, Loadable, Relations, Resource};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Clone)] struct User { id: u32 }
//! #[derive(Debug, Clone)] struct Book { id: u32, author_id: u32 }
//! impl Resource for User { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
//! impl Resource for Book { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Book -> Author: the foreign key lives on the book.
//!     let authors = Arc::new(HasOneLoadable::<Book, User>::new(
//!         "authors",
//!         resolver_fn(|_ctx: CancellationToken, books: Vec<Book>| async move {
//!             let relations: Relations<Book, User> =
//!                 books.iter().map(|b| (b.id, vec![b.author_id])).collect();
//!             Ok::<_, BoxError>(relations)
//!         }),
//!         fetcher_fn(|_ctx: CancellationToken, ids: Vec<u32>| async move {
//!             Ok::<_, BoxError>(ids.into_iter().map(|id| User { id }).collect())
//!         }),
//!     ));
//!
//!     // User -> Books, with the author loader attached as a child.
//!     let books = Arc::new(
//!         Loadable::<User, Book>::new(
//!             "books",
//!             resolver_fn(|_ctx: CancellationToken, users: Vec<User>| async move {
//!                 let relations: Relations<User, Book> =
//!                     users.iter().map(|u| (u.id, vec![u.id * 10, u.id * 10 + 1])).collect();
//!                 Ok::<_, BoxError>(relations)
//!             }),
//!             fetcher_fn(|_ctx: CancellationToken, ids: Vec<u32>| async move {
//!                 Ok::<_, BoxError>(ids.into_iter().map(|id| Book { id, author_id: 7 }).collect())
//!             }),
//!         )
//!         .with_child(authors.clone()),
//!     );
//!
//!     let ctx = CancellationToken::new();
//!     let users = vec![User { id: 1 }, User { id: 2 }];
//!     preload(&ctx, &users, &[&*books]).await?;
//!
//!     assert_eq!(books.load(&ctx, &users[0]).await?.len(), 2);
//!     assert_eq!(authors.cached_parents(), 4);
//!     Ok(())
//! }
//! ```
//!
//! ## Caching
//!
//! Caches are per loader instance and are never evicted. Build a fresh set of loaders when a
//! request must not see data cached by an earlier one.
//!
//! ## Cancellation
//!
//! Every operation takes a [`CancellationToken`](tokio_util::sync::CancellationToken). It is
//! checked before each resolver and fetcher call; a cancelled token fails the operation with
//! [`PreloadError::Cancelled`]. Calls already in flight are left to the collaborator.
//!
//! ## Testing
//!
//! The [`mock`] module provides recording, error-injecting resolvers and fetchers.

mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod has_one;
pub mod loadable;
pub mod mock;
pub mod preload;
pub mod registry;
pub mod resource;
pub mod source;

pub use cache::LoadCache;
pub use config::LoaderConfig;
pub use error::{BoxError, PreloadError};
pub use has_one::HasOneLoadable;
pub use loadable::Loadable;
pub use preload::{preload, Preloadable};
pub use registry::{LoadableProvider, RelationKey, TypedRegistry};
pub use resource::Resource;
pub use source::{fetcher_fn, resolver_fn, FetcherFn, NodeFetcher, Relations, RelationResolver, ResolverFn};

#[doc(hidden)]
pub mod __private {
    pub use paste::paste;
}
