//! Shared fixtures for service-level tests.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{
    dao::pool_store::memory::MemoryPoolStore,
    feed::{FeedError, RawGameSnapshot, ScoreFeed},
    state::{AppState, SharedState},
};

/// Feed stub for tests that never reach the scoreboard.
pub(crate) struct NoFeed;

impl ScoreFeed for NoFeed {
    fn fetch(&self) -> BoxFuture<'static, Result<Option<RawGameSnapshot>, FeedError>> {
        Box::pin(async { Ok(None) })
    }
}

/// Fresh application state over an empty in-memory store.
pub(crate) fn test_state() -> SharedState {
    AppState::new(Arc::new(MemoryPoolStore::new()), Arc::new(NoFeed), None)
}

/// Fresh application state with a caller-supplied feed.
pub(crate) fn test_state_with_feed(feed: Arc<dyn ScoreFeed>) -> SharedState {
    AppState::new(Arc::new(MemoryPoolStore::new()), feed, None)
}
