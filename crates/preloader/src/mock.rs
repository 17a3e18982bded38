//! # Mock Collaborators & Testing Guide
//!
//! [`MockResolver`] and [`MockFetcher`] implement the resolver and fetcher contracts entirely
//! in memory. They record every batch they receive, so tests can assert the property that
//! matters most for a batching engine: **how many times** each collaborator was called, and
//! with which ids.
//!
//! Both types are cheap handles around shared state. Clone one into the loader and keep the
//! other in the test to configure it and inspect calls afterwards.
//!
//! ## When to use Mocks vs Real Repositories
//!
//! | Feature | Mocks | Real repositories |
//! |---------|-------|-------------------|
//! | **Call recording** | Built in (`calls`, `call_count`) | Up to the repository |
//! | **Error injection** | `fail_next` | Hard |
//! | **Use Case** | Engine semantics, cascade shape | End-to-end domain flows |
//!
//! ## Example
//!
//! ```rust
//! use preloader::mock::{MockFetcher, MockResolver};
//! use preloader::{Loadable, Resource};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Clone, PartialEq)] struct User { id: u32 }
//! #[derive(Debug, Clone, PartialEq)] struct Book { id: u32 }
//! impl Resource for User { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
//! impl Resource for Book { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
//!
//! #[tokio::main]
//! async fn main() {
//!     // 1. Setup mocks
//!     let resolver = MockResolver::<User, Book>::new();
//!     resolver.relate(1, vec![10, 11]).relate(2, vec![12]);
//!     let fetcher = MockFetcher::<Book>::new();
//!     fetcher.with_nodes([Book { id: 10 }, Book { id: 11 }, Book { id: 12 }]);
//!
//!     // 2. Build the loader with clones
//!     let books = Loadable::new("books", resolver.clone(), fetcher.clone());
//!
//!     // 3. Exercise and verify
//!     let ctx = CancellationToken::new();
//!     books.preload(&ctx, &[User { id: 1 }, User { id: 2 }]).await.unwrap();
//!     assert_eq!(resolver.call_count(), 1);
//!     assert_eq!(fetcher.calls(), vec![vec![10, 11, 12]]);
//! }
//! ```
//!
//! ## Testing Failure Scenarios
//!
//! `fail_next` queues an error for the next call, which the loader surfaces as
//! [`PreloadError::Collaborator`](crate::PreloadError::Collaborator):
//!
//! ```rust
//! # use preloader::mock::{MockFetcher, MockResolver};
//! # use preloader::{Loadable, PreloadError, Resource};
//! # use tokio_util::sync::CancellationToken;
//! # #[derive(Debug, Clone)] struct User { id: u32 }
//! # #[derive(Debug, Clone)] struct Book { id: u32 }
//! # impl Resource for User { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
//! # impl Resource for Book { type Id = u32; fn resource_id(&self) -> u32 { self.id } }
//! # #[tokio::main]
//! # async fn main() {
//! let resolver = MockResolver::<User, Book>::new();
//! resolver.fail_next("database unavailable");
//! let books = Loadable::new("books", resolver, MockFetcher::<Book>::new());
//!
//! let result = books.load(&CancellationToken::new(), &User { id: 1 }).await;
//! assert!(matches!(result, Err(PreloadError::Collaborator { .. })));
//! # }
//! ```

use crate::error::BoxError;
use crate::resource::Resource;
use crate::source::{NodeFetcher, Relations, RelationResolver};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Error returned by a mock after `fail_next`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("mock failure: {0}")]
pub struct MockError(pub String);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ResolverState<P: Resource, N: Resource> {
    relations: Relations<P, N>,
    failures: VecDeque<MockError>,
    calls: Vec<Vec<P::Id>>,
}

/// In-memory [`RelationResolver`] with a fixed relation table.
pub struct MockResolver<P: Resource, N: Resource> {
    state: Arc<Mutex<ResolverState<P, N>>>,
}

impl<P: Resource, N: Resource> Clone for MockResolver<P, N> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<P: Resource, N: Resource> Default for MockResolver<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Resource, N: Resource> MockResolver<P, N> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ResolverState {
                relations: HashMap::new(),
                failures: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Relates `parent` to `ids`, replacing any earlier entry.
    pub fn relate(&self, parent: P::Id, ids: Vec<N::Id>) -> &Self {
        lock(&self.state).relations.insert(parent, ids);
        self
    }

    /// Makes the next call fail with `message`. Queued failures are consumed in order.
    pub fn fail_next(&self, message: impl Into<String>) -> &Self {
        lock(&self.state)
            .failures
            .push_back(MockError(message.into()));
        self
    }

    /// Parent id batches received so far, one entry per call.
    pub fn calls(&self) -> Vec<Vec<P::Id>> {
        lock(&self.state).calls.clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.state).calls.len()
    }
}

#[async_trait]
impl<P: Resource, N: Resource> RelationResolver<P, N> for MockResolver<P, N> {
    async fn resolve(
        &self,
        _ctx: &CancellationToken,
        parents: &[P],
    ) -> Result<Relations<P, N>, BoxError> {
        let mut state = lock(&self.state);
        state
            .calls
            .push(parents.iter().map(Resource::resource_id).collect());
        if let Some(failure) = state.failures.pop_front() {
            return Err(Box::new(failure));
        }

        Ok(parents
            .iter()
            .filter_map(|parent| {
                let id = parent.resource_id();
                state.relations.get(&id).map(|ids| (id, ids.clone()))
            })
            .collect())
    }
}

struct FetcherState<N: Resource> {
    nodes: HashMap<N::Id, N>,
    failures: VecDeque<MockError>,
    calls: Vec<Vec<N::Id>>,
}

/// In-memory [`NodeFetcher`] over a fixed set of nodes.
///
/// Returns one node per requested id that it knows, in request order, repeats included.
pub struct MockFetcher<N: Resource> {
    state: Arc<Mutex<FetcherState<N>>>,
}

impl<N: Resource> Clone for MockFetcher<N> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<N: Resource> Default for MockFetcher<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Resource> MockFetcher<N> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FetcherState {
                nodes: HashMap::new(),
                failures: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn with_nodes(&self, nodes: impl IntoIterator<Item = N>) -> &Self {
        let mut state = lock(&self.state);
        for node in nodes {
            state.nodes.insert(node.resource_id(), node);
        }
        self
    }

    pub fn fail_next(&self, message: impl Into<String>) -> &Self {
        lock(&self.state)
            .failures
            .push_back(MockError(message.into()));
        self
    }

    /// Id batches received so far, one entry per call.
    pub fn calls(&self) -> Vec<Vec<N::Id>> {
        lock(&self.state).calls.clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.state).calls.len()
    }
}

#[async_trait]
impl<N: Resource> NodeFetcher<N> for MockFetcher<N> {
    async fn fetch(&self, _ctx: &CancellationToken, ids: &[N::Id]) -> Result<Vec<N>, BoxError> {
        let mut state = lock(&self.state);
        state.calls.push(ids.to_vec());
        if let Some(failure) = state.failures.pop_front() {
            return Err(Box::new(failure));
        }

        Ok(ids
            .iter()
            .filter_map(|id| state.nodes.get(id).cloned())
            .collect())
    }
}

/// Small resources shared by the unit tests of this crate.
#[cfg(test)]
pub(crate) mod fixtures {
    use crate::Resource;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Shelf {
        pub(crate) id: u32,
    }

    impl Resource for Shelf {
        type Id = u32;

        fn resource_id(&self) -> u32 {
            self.id
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Item {
        pub(crate) id: u32,
    }

    impl Resource for Item {
        type Id = u32;

        fn resource_id(&self) -> u32 {
            self.id
        }
    }

    pub(crate) fn item(id: u32) -> Item {
        Item { id }
    }
}
