//! # Resolver & Fetcher Contracts
//!
//! A relation is described by two collaborators supplied by the caller:
//!
//! - a [`RelationResolver`] maps a batch of parents to the ids of their related nodes, and
//! - a [`NodeFetcher`] turns a batch of node ids into node values.
//!
//! Both are batch-oriented so the loaders can issue exactly one call of each per tree level.
//! Retry, persistence and query strategy stay inside the collaborator; the engine only forwards
//! the cancellation token and propagates the error.
//!
//! Plain async closures can play either role through [`resolver_fn`] and [`fetcher_fn`].

use crate::error::BoxError;
use crate::resource::Resource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Parent id to related node ids, as returned by a [`RelationResolver`].
pub type Relations<P, N> = HashMap<<P as Resource>::Id, Vec<<N as Resource>::Id>>;

/// Resolves which nodes each parent of a batch is related to.
///
/// A parent missing from the returned map counts as having no related nodes. For to-one
/// relations each entry is expected to hold zero or one id.
#[async_trait]
pub trait RelationResolver<P: Resource, N: Resource>: Send + Sync {
    async fn resolve(
        &self,
        ctx: &CancellationToken,
        parents: &[P],
    ) -> Result<Relations<P, N>, BoxError>;
}

/// Fetches node values for a batch of ids.
///
/// Ids may repeat when several parents share a node; ids without a node may simply be left out
/// of the result.
#[async_trait]
pub trait NodeFetcher<N: Resource>: Send + Sync {
    async fn fetch(&self, ctx: &CancellationToken, ids: &[N::Id]) -> Result<Vec<N>, BoxError>;
}

#[async_trait]
impl<P, N, T> RelationResolver<P, N> for Arc<T>
where
    P: Resource,
    N: Resource,
    T: RelationResolver<P, N> + ?Sized,
{
    async fn resolve(
        &self,
        ctx: &CancellationToken,
        parents: &[P],
    ) -> Result<Relations<P, N>, BoxError> {
        (**self).resolve(ctx, parents).await
    }
}

#[async_trait]
impl<N, T> NodeFetcher<N> for Arc<T>
where
    N: Resource,
    T: NodeFetcher<N> + ?Sized,
{
    async fn fetch(&self, ctx: &CancellationToken, ids: &[N::Id]) -> Result<Vec<N>, BoxError> {
        (**self).fetch(ctx, ids).await
    }
}

/// A [`RelationResolver`] backed by an async closure. Built with [`resolver_fn`].
pub struct ResolverFn<F> {
    f: F,
}

/// Wraps `f(ctx, parents)` as a [`RelationResolver`].
///
/// The closure receives owned copies of the token and the parent batch so the returned future
/// can be `'static`.
///
/// ```rust
/// use preloader::{resolver_fn, BoxError, Relations, Resource};
/// use tokio_util::sync::CancellationToken;
/// # #[derive(Debug, Clone)] struct Book { id: u32, author_id: u32 }
/// # #[derive(Debug, Clone)] struct Author { id: u32 }
/// # impl Resource for Book { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
/// # impl Resource for Author { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
///
/// let book_to_author = resolver_fn(|_ctx: CancellationToken, books: Vec<Book>| async move {
///     let relations: Relations<Book, Author> =
///         books.iter().map(|b| (b.id, vec![b.author_id])).collect();
///     Ok::<_, BoxError>(relations)
/// });
/// # let _ = book_to_author;
/// ```
pub fn resolver_fn<F>(f: F) -> ResolverFn<F> {
    ResolverFn { f }
}

#[async_trait]
impl<P, N, F, Fut> RelationResolver<P, N> for ResolverFn<F>
where
    P: Resource,
    N: Resource,
    F: Fn(CancellationToken, Vec<P>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Relations<P, N>, BoxError>> + Send + 'static,
{
    async fn resolve(
        &self,
        ctx: &CancellationToken,
        parents: &[P],
    ) -> Result<Relations<P, N>, BoxError> {
        (self.f)(ctx.clone(), parents.to_vec()).await
    }
}

/// A [`NodeFetcher`] backed by an async closure. Built with [`fetcher_fn`].
pub struct FetcherFn<F> {
    f: F,
}

/// Wraps `f(ctx, ids)` as a [`NodeFetcher`].
pub fn fetcher_fn<F>(f: F) -> FetcherFn<F> {
    FetcherFn { f }
}

#[async_trait]
impl<N, F, Fut> NodeFetcher<N> for FetcherFn<F>
where
    N: Resource,
    F: Fn(CancellationToken, Vec<N::Id>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<N>, BoxError>> + Send + 'static,
{
    async fn fetch(&self, ctx: &CancellationToken, ids: &[N::Id]) -> Result<Vec<N>, BoxError> {
        (self.f)(ctx.clone(), ids.to_vec()).await
    }
}
