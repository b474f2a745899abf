pub mod board;
pub mod digits;
pub mod session;
mod sse;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::dao::pool_store::PoolStore;
use crate::feed::ScoreFeed;

pub use self::board::{Board, BoardError, CELL_COUNT};
pub use self::digits::{AxisNumbers, DIGIT_COUNT, Digits, InvalidDigits, winning_cell};
pub use self::session::{DEFAULT_CLAIM_LIMIT, InvalidPoolRecord, JoinOutcome, PoolSession};
pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Capacity of the public SSE broadcast channel.
const SSE_CAPACITY: usize = 16;

/// Central application state: storage and feed handles, the live pool
/// sessions, and the SSE fan-out hub.
///
/// Each pool session sits behind its own async `Mutex`; operations hold that
/// lock across the whole read-validate-persist sequence.
pub struct AppState {
    store: Arc<dyn PoolStore>,
    feed: Arc<dyn ScoreFeed>,
    admin_secret: Option<String>,
    sessions: DashMap<String, Arc<Mutex<PoolSession>>>,
    sse: SseHub,
    tick_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        store: Arc<dyn PoolStore>,
        feed: Arc<dyn ScoreFeed>,
        admin_secret: Option<String>,
    ) -> SharedState {
        Arc::new(Self {
            store,
            feed,
            admin_secret,
            sessions: DashMap::new(),
            sse: SseHub::new(SSE_CAPACITY),
            tick_gate: Mutex::new(()),
        })
    }

    /// Handle to the pool store.
    pub fn store(&self) -> Arc<dyn PoolStore> {
        self.store.clone()
    }

    /// Handle to the external score feed.
    pub fn feed(&self) -> Arc<dyn ScoreFeed> {
        self.feed.clone()
    }

    /// Shared secret operator endpoints are gated behind, when configured.
    pub fn admin_secret(&self) -> Option<&str> {
        self.admin_secret.as_deref()
    }

    /// Live pool sessions keyed by slug, the identifier every caller holds.
    pub fn sessions(&self) -> &DashMap<String, Arc<Mutex<PoolSession>>> {
        &self.sessions
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.sse
    }

    /// Gate serializing score ticks, so the scheduled poll and a forced fetch
    /// never overlap.
    pub fn tick_gate(&self) -> &Mutex<()> {
        &self.tick_gate
    }
}
