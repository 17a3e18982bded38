//! # Preloading
//!
//! [`Preloadable`] is the narrow capability shared by every loader: "preload yourself against
//! this batch of parents". Child loaders are stored as `Arc<dyn Preloadable<N>>`, which is what
//! lets one `Book` loader carry an `Author` child and a `Place` child of different node types.
//!
//! [`preload`] is the entry point for a whole tree. It takes its root loaders through the same
//! capability, so a single call can drive unrelated top-level relations from one parent batch.

use crate::error::PreloadError;
use crate::resource::Resource;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// A loader that can be preloaded against a batch of parents of type `P`.
#[async_trait]
pub trait Preloadable<P: Resource>: Send + Sync {
    /// Relation name, used in logs and errors.
    fn relation(&self) -> &str;

    /// Resolves and caches this relation for every parent, then cascades into children.
    async fn preload(&self, ctx: &CancellationToken, parents: &[P]) -> Result<(), PreloadError>;
}

#[async_trait]
impl<P, T> Preloadable<P> for Arc<T>
where
    P: Resource,
    T: Preloadable<P> + ?Sized,
{
    fn relation(&self) -> &str {
        (**self).relation()
    }

    async fn preload(&self, ctx: &CancellationToken, parents: &[P]) -> Result<(), PreloadError> {
        (**self).preload(ctx, parents).await
    }
}

/// Preloads every root loader against `parents`, in order.
///
/// The first error aborts the remaining roots. An empty parent batch or an empty loader list
/// returns `Ok(())` without touching any collaborator.
#[instrument(skip_all, fields(parents = parents.len(), roots = loaders.len()))]
pub async fn preload<P: Resource>(
    ctx: &CancellationToken,
    parents: &[P],
    loaders: &[&dyn Preloadable<P>],
) -> Result<(), PreloadError> {
    if parents.is_empty() || loaders.is_empty() {
        debug!("Nothing to preload");
        return Ok(());
    }

    for loader in loaders {
        debug!(relation = loader.relation(), "Preloading root");
        loader.preload(ctx, parents).await?;
    }
    Ok(())
}
