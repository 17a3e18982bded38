//! # Library Relations
//!
//! The three edges of the library graph and the registry keys they are shared under:
//!
//! | Relation | Kind | Resolver | Fetcher |
//! |----------|------|----------|---------|
//! | User → Books | to-many | [`UsersToBooks`] (ownership table) | [`BookRepository`] |
//! | Book → Author | to-one | [`book_to_author`] (`author_id`) | [`UserRepository`](crate::repository::UserRepository) |
//! | Book → Place | to-one | [`book_to_place`] (`place_id`) | [`PlaceRepository`](crate::repository::PlaceRepository) |

use crate::model::{Book, Place, User, UserId};
use crate::repository::BookRepository;
use async_trait::async_trait;
use preloader::{
    relation_key, resolver_fn, BoxError, HasOneLoadable, Loadable, RelationResolver, Relations,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

relation_key!(
    /// A user's books.
    pub Books => Loadable<User, Book>
);
relation_key!(
    /// The user who wrote a book.
    pub Authors => HasOneLoadable<Book, User>
);
relation_key!(
    /// Where a book is shelved.
    pub Places => HasOneLoadable<Book, Place>
);

/// Resolves user → books through [`BookRepository::by_users`].
pub struct UsersToBooks {
    books: Arc<BookRepository>,
}

impl UsersToBooks {
    pub fn new(books: Arc<BookRepository>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl RelationResolver<User, Book> for UsersToBooks {
    async fn resolve(
        &self,
        ctx: &CancellationToken,
        users: &[User],
    ) -> Result<Relations<User, Book>, BoxError> {
        let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
        Ok(self.books.by_users(ctx, &ids).await?)
    }
}

/// Book → author, read from the book's `author_id`.
pub fn book_to_author() -> impl RelationResolver<Book, User> {
    resolver_fn(|_ctx: CancellationToken, books: Vec<Book>| async move {
        let relations: Relations<Book, User> = books
            .iter()
            .map(|book| (book.id, vec![book.author_id]))
            .collect();
        Ok::<_, BoxError>(relations)
    })
}

/// Book → place, read from the book's `place_id`.
pub fn book_to_place() -> impl RelationResolver<Book, Place> {
    resolver_fn(|_ctx: CancellationToken, books: Vec<Book>| async move {
        let relations: Relations<Book, Place> = books
            .iter()
            .map(|book| (book.id, vec![book.place_id]))
            .collect();
        Ok::<_, BoxError>(relations)
    })
}
