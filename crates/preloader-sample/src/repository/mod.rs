//! # In-Memory Repositories
//!
//! Each repository stands in for a remote data source. They count their calls, can be switched
//! offline to simulate an outage, and honour the cancellation token, which is everything the
//! loaders need to be exercised end to end.
//!
//! Every repository implements [`NodeFetcher`](preloader::NodeFetcher) for its entity, so it can
//! be handed to a loader directly.

pub mod book;
pub mod error;
pub mod place;
pub mod user;

pub use book::BookRepository;
pub use error::RepositoryError;
pub use place::PlaceRepository;
pub use user::UserRepository;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Availability switch and call counter shared by the repositories.
struct Backend {
    entity: &'static str,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl Backend {
    fn new(entity: &'static str) -> Self {
        Self {
            entity,
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Counts one call and fails it when the backend is offline or the request is cancelled.
    fn enter(&self, ctx: &CancellationToken) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if ctx.is_cancelled() {
            return Err(RepositoryError::Cancelled(self.entity));
        }
        if self.offline.load(Ordering::SeqCst) {
            warn!(entity = self.entity, "Repository offline");
            return Err(RepositoryError::Unavailable(self.entity));
        }
        Ok(())
    }

    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
