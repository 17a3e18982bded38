//! # To-Many Loader
//!
//! A [`Loadable`] resolves a parent → many-children relation, e.g. "the books of a user".
//!
//! ## Operations
//!
//! * **load** (lazy, one parent):
//!     1. Returns the cached nodes for the parent if present.
//!     2. Otherwise resolves ids for `[parent]`, fetches them, caches and returns the nodes.
//!
//! * **preload** (eager, whole batch):
//!     1. One resolver call for all parents.
//!     2. One fetcher call for every referenced id (repeats kept unless deduplicated).
//!     3. For each parent, nodes are assembled in resolver order and cached, overwriting older
//!        entries.
//!     4. The full fetched node list is preloaded into every attached child, depth-first.
//!
//! The first failing step aborts the call. Entries written before the failure stay cached.

use crate::batch::{preload_children, resolve_batch};
use crate::cache::LoadCache;
use crate::config::LoaderConfig;
use crate::error::PreloadError;
use crate::preload::Preloadable;
use crate::resource::Resource;
use crate::source::{NodeFetcher, RelationResolver};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Batched, memoized loader for a to-many relation from `P` to `N`.
///
/// Children are attached while building, before the loader is wrapped in an `Arc` and shared:
///
/// ```rust,ignore
/// let authors = Arc::new(HasOneLoadable::new("authors", book_to_author, user_repo.clone()));
/// let books = Arc::new(
///     Loadable::new("books", users_to_books, book_repo.clone()).with_child(authors.clone()),
/// );
/// books.preload(&ctx, &users).await?;
/// ```
pub struct Loadable<P: Resource, N: Resource> {
    name: String,
    resolver: Arc<dyn RelationResolver<P, N>>,
    fetcher: Arc<dyn NodeFetcher<N>>,
    cache: LoadCache<P::Id, Vec<N>>,
    children: Vec<Arc<dyn Preloadable<N>>>,
    config: LoaderConfig,
}

impl<P: Resource, N: Resource> Loadable<P, N> {
    pub fn new<R, F>(name: impl Into<String>, resolver: R, fetcher: F) -> Self
    where
        R: RelationResolver<P, N> + 'static,
        F: NodeFetcher<N> + 'static,
    {
        Self {
            name: name.into(),
            resolver: Arc::new(resolver),
            fetcher: Arc::new(fetcher),
            cache: LoadCache::new(),
            children: Vec::new(),
            config: LoaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Attaches a loader whose parents are this loader's nodes. Children run in attachment order.
    pub fn with_child(mut self, child: Arc<dyn Preloadable<N>>) -> Self {
        self.children.push(child);
        self
    }

    /// Attaches several children at once, in iteration order.
    pub fn with_children(
        mut self,
        children: impl IntoIterator<Item = Arc<dyn Preloadable<N>>>,
    ) -> Self {
        self.children.extend(children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Cached nodes for `parent`, without touching any collaborator.
    pub fn cached(&self, parent: &P::Id) -> Option<Vec<N>> {
        self.cache.get(parent)
    }

    /// Number of parents with a cache entry.
    pub fn cached_parents(&self) -> usize {
        self.cache.len()
    }

    /// Returns the nodes related to `parent`, resolving and caching them on a miss.
    #[instrument(skip_all, fields(relation = %self.name, parent = %parent.resource_id()))]
    pub async fn load(&self, ctx: &CancellationToken, parent: &P) -> Result<Vec<N>, PreloadError> {
        let id = parent.resource_id();
        if let Some(nodes) = self.cache.get(&id) {
            debug!(count = nodes.len(), "Cache hit");
            return Ok(nodes);
        }

        let batch = resolve_batch(
            &self.name,
            self.resolver.as_ref(),
            self.fetcher.as_ref(),
            &self.config,
            ctx,
            std::slice::from_ref(parent),
        )
        .await?;

        let nodes = batch.assemble(&id);
        debug!(count = nodes.len(), "Loaded");
        self.cache.insert(id, nodes.clone());
        Ok(nodes)
    }

    /// Resolves and caches the relation for every parent with one resolver call and one
    /// fetcher call, then preloads the attached children with the fetched nodes.
    #[instrument(skip_all, fields(relation = %self.name, parents = parents.len()))]
    pub async fn preload(
        &self,
        ctx: &CancellationToken,
        parents: &[P],
    ) -> Result<(), PreloadError> {
        if parents.is_empty() {
            return Ok(());
        }

        let batch = resolve_batch(
            &self.name,
            self.resolver.as_ref(),
            self.fetcher.as_ref(),
            &self.config,
            ctx,
            parents,
        )
        .await?;

        for parent in parents {
            let id = parent.resource_id();
            let nodes = batch.assemble(&id);
            self.cache.insert(id, nodes);
        }
        info!(nodes = batch.nodes.len(), "Preloaded");

        preload_children(&self.children, &self.config, ctx, &batch.nodes).await
    }

    /// Every cached node across all parents. Order is unspecified.
    pub fn loaded(&self) -> Vec<N> {
        self.cache.values().into_iter().flatten().collect()
    }
}

#[async_trait]
impl<P: Resource, N: Resource> Preloadable<P> for Loadable<P, N> {
    fn relation(&self) -> &str {
        &self.name
    }

    async fn preload(&self, ctx: &CancellationToken, parents: &[P]) -> Result<(), PreloadError> {
        Loadable::preload(self, ctx, parents).await
    }
}
