/// ESPN scoreboard client.
pub mod espn;
/// Raw-to-cumulative score normalization and write deduplication.
pub mod normalize;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::dao::models::Possession;

/// Game-state flag reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedGameState {
    /// Kickoff has not happened yet.
    NotStarted,
    /// The game is being played.
    InProgress,
    /// The game is over.
    Finished,
}

/// Raw scoreboard data for the one tracked game, typed at the boundary.
///
/// Feeds report points scored *within* each period plus the current totals;
/// turning that into cumulative end-of-period scores is the normalizer's job,
/// not the feed's. Possession is already resolved to a grid side here because
/// only the feed knows which team identifier is which.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGameSnapshot {
    /// Feed-side identifier of the game.
    pub external_id: String,
    /// Display name of the matchup.
    pub name: String,
    /// Coarse game state.
    pub state: FeedGameState,
    /// Whether the feed explicitly marked the game completed.
    pub completed: bool,
    /// Current period number, `0` before any period has started.
    pub period: u32,
    /// Row-side (home) total score right now.
    pub row_total: u32,
    /// Column-side (away) total score right now.
    pub col_total: u32,
    /// Points the row side scored within each elapsed period.
    pub row_period_points: Vec<u32>,
    /// Points the column side scored within each elapsed period.
    pub col_period_points: Vec<u32>,
    /// Which side has the ball.
    pub possession: Possession,
    /// Free-text situation line, when the feed provides one.
    pub situation: Option<String>,
    /// Whether the offense is in a high-leverage spot.
    pub high_leverage: bool,
}

/// Error raised while fetching the external scoreboard.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("scoreboard request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("scoreboard responded with status {status}")]
    Status {
        /// HTTP status the feed answered with.
        status: reqwest::StatusCode,
    },
}

/// Boundary to the external score feed.
///
/// Selecting *which* game to track is the implementation's responsibility;
/// callers only ever see the one tracked game. `Ok(None)` means the feed
/// answered but the tracked game was not found in it.
pub trait ScoreFeed: Send + Sync {
    fn fetch(&self) -> BoxFuture<'static, Result<Option<RawGameSnapshot>, FeedError>>;
}
