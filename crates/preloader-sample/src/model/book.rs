use super::{PlaceId, UserId};
use preloader::Resource;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(pub u32);

impl From<u32> for BookId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "book_{}", self.0)
    }
}

/// A book. The author and the shelf place are foreign keys; ownership lives in the
/// [`BookRepository`](crate::repository::BookRepository).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author_id: UserId,
    pub place_id: PlaceId,
}

impl Book {
    /// Creates a new Book instance.
    ///
    /// # Arguments
    /// * `id` - Unique identifier
    /// * `title` - Book title
    /// * `author_id` - The [`User`](crate::model::User) who wrote it
    /// * `place_id` - The [`Place`](crate::model::Place) it is shelved at
    pub fn new(
        id: impl Into<BookId>,
        title: impl Into<String>,
        author_id: impl Into<UserId>,
        place_id: impl Into<PlaceId>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author_id: author_id.into(),
            place_id: place_id.into(),
        }
    }
}

impl Resource for Book {
    type Id = BookId;

    fn resource_id(&self) -> BookId {
        self.id
    }
}
