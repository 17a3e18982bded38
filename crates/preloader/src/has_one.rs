//! # To-One Loader
//!
//! A [`HasOneLoadable`] resolves a parent → single-child relation, e.g. "the author of a book".
//! It runs the same resolve-then-fetch batch as [`Loadable`](crate::Loadable) and adds a
//! cardinality check per parent:
//!
//! | Resolved targets | Result |
//! |------------------|--------|
//! | exactly one      | cached |
//! | more than one    | [`PreloadError::TooManyHasOne`], always |
//! | none             | [`PreloadError::NotFoundHasOne`], or skipped when `accept_not_found` |
//!
//! `load` and `preload` apply the same check. A skipped parent gets no cache entry, so a later
//! `load` for it goes back to the collaborators.
//!
//! `preload` checks parents in input order and stops at the first violation; parents before
//! it stay cached, parents after it are never looked at, and children are not preloaded.

use crate::batch::{preload_children, resolve_batch, Batch};
use crate::cache::LoadCache;
use crate::config::LoaderConfig;
use crate::error::PreloadError;
use crate::preload::Preloadable;
use crate::resource::Resource;
use crate::source::{NodeFetcher, RelationResolver};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Batched, memoized loader for a to-one relation from `P` to `N`.
pub struct HasOneLoadable<P: Resource, N: Resource> {
    name: String,
    resolver: Arc<dyn RelationResolver<P, N>>,
    fetcher: Arc<dyn NodeFetcher<N>>,
    cache: LoadCache<P::Id, N>,
    children: Vec<Arc<dyn Preloadable<N>>>,
    config: LoaderConfig,
    accept_not_found: bool,
}

impl<P: Resource, N: Resource> HasOneLoadable<P, N> {
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
            accept_not_found: false,
        }
    }

    /// When set, a parent without a target is skipped instead of failing the call.
    pub fn with_accept_not_found(mut self, accept: bool) -> Self {
        self.accept_not_found = accept;
        self
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Attaches a loader whose parents are this loader's nodes.
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

    pub fn accepts_not_found(&self) -> bool {
        self.accept_not_found
    }

    pub fn cached(&self, parent: &P::Id) -> Option<N> {
        self.cache.get(parent)
    }

    pub fn cached_parents(&self) -> usize {
        self.cache.len()
    }

    /// Returns the node related to `parent`, resolving and caching it on a miss.
    ///
    /// `Ok(None)` only happens for an accepted missing target.
    #[instrument(skip_all, fields(relation = %self.name, parent = %parent.resource_id()))]
    pub async fn load(
        &self,
        ctx: &CancellationToken,
        parent: &P,
    ) -> Result<Option<N>, PreloadError> {
        let id = parent.resource_id();
        if let Some(node) = self.cache.get(&id) {
            debug!("Cache hit");
            return Ok(Some(node));
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

        let node = self.single(&batch, &id)?;
        if let Some(node) = &node {
            self.cache.insert(id, node.clone());
        }
        Ok(node)
    }

    /// Resolves, checks and caches the relation for every parent, then preloads the attached
    /// children with the fetched nodes.
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

        let mut committed = 0;
        for parent in parents {
            let id = parent.resource_id();
            if let Some(node) = self.single(&batch, &id)? {
                self.cache.insert(id, node);
                committed += 1;
            }
        }
        info!(committed, skipped = parents.len() - committed, "Preloaded");

        preload_children(&self.children, &self.config, ctx, &batch.nodes).await
    }

    /// Every cached node. Order is unspecified.
    pub fn loaded(&self) -> Vec<N> {
        self.cache.values()
    }

    /// Applies the zero/one/many rule to one parent of a resolved batch.
    fn single(&self, batch: &Batch<P, N>, parent: &P::Id) -> Result<Option<N>, PreloadError> {
        let ids = batch.ids_for(parent);
        if ids.len() > 1 {
            warn!(relation = %self.name, %parent, found = ids.len(), "Too many targets");
            return Err(PreloadError::TooManyHasOne {
                relation: self.name.clone(),
                parent: parent.to_string(),
                found: ids.len(),
            });
        }

        match ids.first().and_then(|id| batch.node(id)) {
            Some(node) => Ok(Some(node.clone())),
            None if self.accept_not_found => {
                debug!(relation = %self.name, %parent, "No target, skipped");
                Ok(None)
            }
            None => {
                warn!(relation = %self.name, %parent, "No target");
                Err(PreloadError::NotFoundHasOne {
                    relation: self.name.clone(),
                    parent: parent.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl<P: Resource, N: Resource> Preloadable<P> for HasOneLoadable<P, N> {
    fn relation(&self) -> &str {
        &self.name
    }

    async fn preload(&self, ctx: &CancellationToken, parents: &[P]) -> Result<(), PreloadError> {
        HasOneLoadable::preload(self, ctx, parents).await
    }
}
