//! The resolve-then-fetch step shared by both loader kinds.

use crate::config::LoaderConfig;
use crate::error::PreloadError;
use crate::preload::Preloadable;
use crate::resource::Resource;
use crate::source::{NodeFetcher, Relations, RelationResolver};
use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One resolved and fetched tree level.
pub(crate) struct Batch<P: Resource, N: Resource> {
    relations: Relations<P, N>,
    /// Fetched nodes in fetcher order; this is what children receive as parents.
    pub(crate) nodes: Vec<N>,
    index: HashMap<N::Id, N>,
}

impl<P: Resource, N: Resource> Batch<P, N> {
    /// Ids the resolver returned for `parent`, in resolver order.
    pub(crate) fn ids_for(&self, parent: &P::Id) -> &[N::Id] {
        self.relations
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn node(&self, id: &N::Id) -> Option<&N> {
        self.index.get(id)
    }

    /// Nodes for `parent` in resolver order. Ids the fetcher had no node for are skipped.
    pub(crate) fn assemble(&self, parent: &P::Id) -> Vec<N> {
        self.ids_for(parent)
            .iter()
            .filter_map(|id| {
                let node = self.node(id);
                if node.is_none() {
                    debug!(%parent, node = %id, "Fetcher returned no node for id");
                }
                node.cloned()
            })
            .collect()
    }
}

/// Resolves relation ids for `parents` with one resolver call, then fetches every referenced
/// node with one fetcher call. The fetcher is skipped when no ids were resolved.
pub(crate) async fn resolve_batch<P, N>(
    relation: &str,
    resolver: &dyn RelationResolver<P, N>,
    fetcher: &dyn NodeFetcher<N>,
    config: &LoaderConfig,
    ctx: &CancellationToken,
    parents: &[P],
) -> Result<Batch<P, N>, PreloadError>
where
    P: Resource,
    N: Resource,
{
    if ctx.is_cancelled() {
        return Err(PreloadError::cancelled(relation));
    }
    debug!(relation, parents = parents.len(), "Resolving");
    let relations = resolver.resolve(ctx, parents).await.map_err(|e| {
        warn!(relation, error = %e, "Resolver failed");
        PreloadError::collaborator(relation, e)
    })?;

    // Flatten in parent order so the fetcher request is deterministic. A parent listed twice
    // contributes its ids once.
    let mut seen_parents = HashSet::with_capacity(parents.len());
    let mut ids: Vec<N::Id> = parents
        .iter()
        .map(Resource::resource_id)
        .filter(|id| seen_parents.insert(id.clone()))
        .filter_map(|id| relations.get(&id))
        .flatten()
        .cloned()
        .collect();
    if config.dedup_node_ids {
        let mut seen = HashSet::with_capacity(ids.len());
        ids.retain(|id| seen.insert(id.clone()));
    }

    let nodes = if ids.is_empty() {
        Vec::new()
    } else {
        if ctx.is_cancelled() {
            return Err(PreloadError::cancelled(relation));
        }
        debug!(relation, ids = ids.len(), "Fetching");
        fetcher.fetch(ctx, &ids).await.map_err(|e| {
            warn!(relation, error = %e, "Fetcher failed");
            PreloadError::collaborator(relation, e)
        })?
    };

    let index = nodes
        .iter()
        .map(|node| (node.resource_id(), node.clone()))
        .collect();

    Ok(Batch {
        relations,
        nodes,
        index,
    })
}

/// Hands a fetched node batch to every attached child, stopping at the first error. The token
/// is checked before each child, even when the batch is empty.
pub(crate) async fn preload_children<N: Resource>(
    children: &[Arc<dyn Preloadable<N>>],
    config: &LoaderConfig,
    ctx: &CancellationToken,
    nodes: &[N],
) -> Result<(), PreloadError> {
    if config.concurrent_children {
        if let Some(first) = children.first().filter(|_| ctx.is_cancelled()) {
            return Err(PreloadError::cancelled(first.relation()));
        }
        try_join_all(children.iter().map(|child| child.preload(ctx, nodes))).await?;
        return Ok(());
    }

    for child in children {
        if ctx.is_cancelled() {
            return Err(PreloadError::cancelled(child.relation()));
        }
        child.preload(ctx, nodes).await?;
    }
    Ok(())
}
