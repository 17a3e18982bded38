//! # Loader Registry
//!
//! Repositories often need each other's loaders: the user repository builds users that point at
//! the "books" loader, while the book loader's fetcher is the book repository, whose books point
//! back at the "authors" loader. Passing loaders through constructors turns that into a
//! construction cycle. A registry breaks it: loaders are registered once, after construction,
//! and looked up by whoever needs them.
//!
//! Two flavours are provided:
//!
//! - [`TypedRegistry`] is keyed by **token types**. Each relation declares a zero-sized key with
//!   [`relation_key!`](crate::relation_key), and the key's associated `Loader` type fixes the
//!   capability (to-many or to-one) and the parent/node types. Asking for the wrong kind of loader
//!   does not compile.
//! - [`LoadableProvider`] is keyed by **strings** and checks the loader type at run time. Use it
//!   when relation names only exist as data.
//!
//! Both are safe to share across tasks.

use crate::error::PreloadError;
use crate::has_one::HasOneLoadable;
use crate::loadable::Loadable;
use crate::resource::Resource;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, warn};

type AnyLoader = Arc<dyn Any + Send + Sync>;

/// Identifies one relation in a [`TypedRegistry`].
///
/// Implement it through [`relation_key!`](crate::relation_key) rather than by hand.
pub trait RelationKey: 'static {
    /// The loader registered under this key.
    type Loader: Send + Sync + 'static;

    /// Human-readable relation name, used in logs and errors.
    const NAME: &'static str;
}

/// Declares a relation key type for a [`TypedRegistry`].
///
/// `relation_key!(pub Books => Loadable<User, Book>)` declares a unit struct `BooksKey` whose
/// registered loader must be a `Loadable<User, Book>`.
///
/// ```rust
/// use preloader::{relation_key, HasOneLoadable, Loadable, RelationKey, Resource};
/// # #[derive(Debug, Clone)] struct User { id: u32 }
/// # #[derive(Debug, Clone)] struct Book { id: u32 }
/// # impl Resource for User { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
/// # impl Resource for Book { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
///
/// relation_key!(Books => Loadable<User, Book>);
/// relation_key!(
///     /// The author of a book.
///     Authors => HasOneLoadable<Book, User>
/// );
///
/// assert_eq!(BooksKey::NAME, "Books");
/// assert_eq!(AuthorsKey::NAME, "Authors");
/// ```
#[macro_export]
macro_rules! relation_key {
    ($(#[$meta:meta])* $vis:vis $name:ident => $loader:ty) => {
        $crate::__private::paste! {
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            $vis struct [<$name Key>];

            impl $crate::RelationKey for [<$name Key>] {
                type Loader = $loader;
                const NAME: &'static str = stringify!($name);
            }
        }
    };
}

/// Registry keyed by [`RelationKey`] types.
#[derive(Default)]
pub struct TypedRegistry {
    loaders: DashMap<TypeId, AnyLoader>,
}

impl TypedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `loader` under `K`, replacing any earlier registration.
    pub fn register<K: RelationKey>(&self, loader: Arc<K::Loader>) {
        debug!(relation = K::NAME, "Registering loader");
        self.loaders.insert(TypeId::of::<K>(), loader);
    }

    pub fn is_registered<K: RelationKey>(&self) -> bool {
        self.loaders.contains_key(&TypeId::of::<K>())
    }

    /// The loader registered under `K`, if any.
    pub fn get<K: RelationKey>(&self) -> Option<Arc<K::Loader>> {
        let loader = self.loaders.get(&TypeId::of::<K>())?.value().clone();
        // `register` is the only writer and always stores `K::Loader` under `K`.
        loader.downcast::<K::Loader>().ok()
    }

    /// Like [`get`](Self::get), but a missing registration is an error.
    pub fn require<K: RelationKey>(&self) -> Result<Arc<K::Loader>, PreloadError> {
        self.get::<K>().ok_or_else(|| {
            warn!(relation = K::NAME, "Loader not registered");
            PreloadError::NotRegistered {
                key: K::NAME.to_string(),
            }
        })
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

/// String-keyed registry holding loaders of any type.
#[derive(Default)]
pub struct LoadableProvider {
    loaders: DashMap<String, AnyLoader>,
}

impl LoadableProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `loader` under `name`, replacing any earlier registration.
    pub fn register<L: Send + Sync + 'static>(&self, name: impl Into<String>, loader: Arc<L>) {
        let name = name.into();
        debug!(relation = %name, "Registering loader");
        self.loaders.insert(name, loader);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loaders.contains_key(name)
    }

    /// The entry under `name` if it exists and is an `L`.
    pub fn get<L: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<L>> {
        self.entry(name)?.downcast::<L>().ok()
    }

    /// The to-many loader under `name`.
    pub fn loadable<P: Resource, N: Resource>(
        &self,
        name: &str,
    ) -> Result<Arc<Loadable<P, N>>, PreloadError> {
        self.checked(name, "to-many loadable")
    }

    /// The to-one loader under `name`.
    pub fn has_one<P: Resource, N: Resource>(
        &self,
        name: &str,
    ) -> Result<Arc<HasOneLoadable<P, N>>, PreloadError> {
        self.checked(name, "to-one loadable")
    }

    fn entry(&self, name: &str) -> Option<AnyLoader> {
        self.loaders.get(name).map(|entry| entry.value().clone())
    }

    fn checked<L: Send + Sync + 'static>(
        &self,
        name: &str,
        expected: &'static str,
    ) -> Result<Arc<L>, PreloadError> {
        let entry = self.entry(name).ok_or_else(|| {
            warn!(relation = name, "Loader not registered");
            PreloadError::NotRegistered {
                key: name.to_string(),
            }
        })?;

        entry.downcast::<L>().map_err(|_| {
            warn!(relation = name, expected, "Loader type mismatch");
            PreloadError::RegistryMismatch {
                key: name.to_string(),
                expected,
            }
        })
    }
}
