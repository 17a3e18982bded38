use super::{Backend, RepositoryError};
use crate::model::{Book, BookId, UserId};
use async_trait::async_trait;
use preloader::{BoxError, NodeFetcher};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Books plus the user → books ownership table.
pub struct BookRepository {
    books: HashMap<BookId, Book>,
    owners: HashMap<UserId, Vec<BookId>>,
    list_backend: Backend,
    ownership_backend: Backend,
}

impl BookRepository {
    pub fn new(
        books: impl IntoIterator<Item = Book>,
        owners: impl IntoIterator<Item = (UserId, Vec<BookId>)>,
    ) -> Self {
        Self {
            books: books.into_iter().map(|book| (book.id, book)).collect(),
            owners: owners.into_iter().collect(),
            list_backend: Backend::new("book"),
            ownership_backend: Backend::new("ownership"),
        }
    }

    /// Alice owns two books she wrote. Bob owns one he wrote, shelved at a place that no longer
    /// exists, and one by an author who is not a member. Carol owns nothing.
    pub fn seeded() -> Self {
        Self::new(
            [
                Book::new(1, "The Rust Programming Language", 1, 1),
                Book::new(2, "Rust for Rustaceans", 1, 2),
                Book::new(3, "Zero To Production", 2, 3),
                Book::new(4, "Anonymous Essays", 9, 1),
            ],
            [
                (UserId(1), vec![BookId(1), BookId(2)]),
                (UserId(2), vec![BookId(3), BookId(4)]),
            ],
        )
    }

    /// Books for `ids`, in request order, one entry per requested id.
    pub async fn list(
        &self,
        ctx: &CancellationToken,
        ids: &[BookId],
    ) -> Result<Vec<Book>, RepositoryError> {
        self.list_backend.enter(ctx)?;
        debug!(?ids, "List books");
        Ok(ids.iter().filter_map(|id| self.books.get(id).cloned()).collect())
    }

    /// The books owned by each of `user_ids`. Users without books are left out.
    pub async fn by_users(
        &self,
        ctx: &CancellationToken,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, Vec<BookId>>, RepositoryError> {
        self.ownership_backend.enter(ctx)?;
        debug!(?user_ids, "Books by users");
        Ok(user_ids
            .iter()
            .filter_map(|id| self.owners.get(id).map(|books| (*id, books.clone())))
            .collect())
    }

    /// Number of `list` calls so far.
    pub fn list_calls(&self) -> usize {
        self.list_backend.calls()
    }

    /// Number of `by_users` calls so far.
    pub fn by_users_calls(&self) -> usize {
        self.ownership_backend.calls()
    }

    /// Takes both the book table and the ownership table offline.
    pub fn set_offline(&self, offline: bool) {
        self.list_backend.set_offline(offline);
        self.ownership_backend.set_offline(offline);
    }
}

#[async_trait]
impl NodeFetcher<Book> for BookRepository {
    async fn fetch(&self, ctx: &CancellationToken, ids: &[BookId]) -> Result<Vec<Book>, BoxError> {
        Ok(self.list(ctx, ids).await?)
    }
}
