//! Library entities. Each one is a [`Resource`](preloader::Resource) keyed by its own id newtype.

pub mod book;
pub mod place;
pub mod user;

pub use book::{Book, BookId};
pub use place::{Place, PlaceId};
pub use user::{User, UserId};
