use super::{Backend, RepositoryError};
use crate::model::{User, UserId};
use async_trait::async_trait;
use preloader::{BoxError, NodeFetcher};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct UserRepository {
    users: HashMap<UserId, User>,
    backend: Backend,
}

impl UserRepository {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|user| (user.id, user)).collect(),
            backend: Backend::new("user"),
        }
    }

    /// Alice, Bob and Carol.
    pub fn seeded() -> Self {
        Self::new([
            User::new(1, "Alice"),
            User::new(2, "Bob"),
            User::new(3, "Carol"),
        ])
    }

    /// Users for `ids`, in request order. Unknown ids are left out.
    pub async fn list(
        &self,
        ctx: &CancellationToken,
        ids: &[UserId],
    ) -> Result<Vec<User>, RepositoryError> {
        self.backend.enter(ctx)?;
        debug!(?ids, "List users");
        Ok(ids.iter().filter_map(|id| self.users.get(id).cloned()).collect())
    }

    /// Every user, ordered by id.
    pub fn all(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        users
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
impl NodeFetcher<User> for UserRepository {
    async fn fetch(&self, ctx: &CancellationToken, ids: &[UserId]) -> Result<Vec<User>, BoxError> {
        Ok(self.list(ctx, ids).await?)
    }
}
