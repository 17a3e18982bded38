use super::{Backend, RepositoryError};
use crate::model::{Place, PlaceId};
use async_trait::async_trait;
use preloader::{BoxError, NodeFetcher};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct PlaceRepository {
    places: HashMap<PlaceId, Place>,
    backend: Backend,
}

impl PlaceRepository {
    pub fn new(places: impl IntoIterator<Item = Place>) -> Self {
        Self {
            places: places.into_iter().map(|place| (place.id, place)).collect(),
            backend: Backend::new("place"),
        }
    }

    /// Tokyo and Osaka.
    pub fn seeded() -> Self {
        Self::new([Place::new(1, "Tokyo"), Place::new(2, "Osaka")])
    }

    /// Places for `ids`, in request order. Unknown ids are left out.
    pub async fn list(
        &self,
        ctx: &CancellationToken,
        ids: &[PlaceId],
    ) -> Result<Vec<Place>, RepositoryError> {
        self.backend.enter(ctx)?;
        debug!(?ids, "List places");
        Ok(ids
            .iter()
            .filter_map(|id| self.places.get(id).cloned())
            .collect())
    }

    /// Number of `list` calls so far.
    pub fn list_calls(&self) -> usize {
        self.backend.calls()
    }

    pub fn set_offline(&self, offline: bool) {
        self.backend.set_offline(offline);
    }
}

#[async_trait]
impl NodeFetcher<Place> for PlaceRepository {
    async fn fetch(
        &self,
        ctx: &CancellationToken,
        ids: &[PlaceId],
    ) -> Result<Vec<Place>, BoxError> {
        Ok(self.list(ctx, ids).await?)
    }
}
