//! # Resource Trait
//!
//! The `Resource` trait is the one capability every parent and node must expose: a stable,
//! comparable identifier. The engine uses it to key the per-loader cache (by parent id) and to
//! index a fetched node batch (by node id).
//!
//! # Architecture Note
//! The identifier is an **associated type**, so a `User` keyed by `UserId` can never be looked up
//! with a `BookId`, even when both wrap the same integer. Give every entity kind its own newtype.
//!
//! The same concrete type may appear at several levels of a tree (a `User` owns `Book`s whose
//! author is again a `User`); the loaders only care that both ends implement `Resource`.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Any value with a stable identifier that can act as a parent or a node of a relation.
///
/// # Example
///
/// ```rust
/// use preloader::Resource;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// struct UserId(u32);
///
/// impl std::fmt::Display for UserId {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "user_{}", self.0)
///     }
/// }
///
/// #[derive(Debug, Clone)]
/// struct User { id: UserId, name: String }
///
/// impl Resource for User {
///     type Id = UserId;
///     fn resource_id(&self) -> UserId { self.id }
/// }
///
/// let alice = User { id: UserId(1), name: "Alice".into() };
/// assert_eq!(alice.resource_id().to_string(), "user_1");
/// ```
pub trait Resource: Clone + Send + Sync + 'static {
    /// The identifier used as cache key (as a parent) and index key (as a node).
    ///
    /// `Display` is required so errors and logs can name the offending parent.
    type Id: Eq + Hash + Clone + Send + Sync + Debug + Display + 'static;

    /// Returns this value's identifier.
    fn resource_id(&self) -> Self::Id;
}
