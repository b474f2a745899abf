use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Lifecycle state of a pool. Locking is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    /// Cells can still be claimed and released freely.
    Open,
    /// Claiming is closed; the board layout is final.
    Locked,
}

/// Which side of the grid currently has the ball, as reported by the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Possession {
    /// The row-axis (home) side.
    Row,
    /// The column-axis (away) side.
    Col,
    /// Nobody, or the feed did not say.
    #[default]
    None,
}

/// Where a score snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Entered by an operator.
    Manual,
    /// Fetched from the external scoreboard feed.
    Scrape,
}

/// A participant registered in a pool, persisted alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantEntity {
    /// Stable identifier for the participant.
    pub id: Uuid,
    /// Display name chosen at join time (unique within the pool).
    pub display_name: String,
    /// When the participant first joined.
    pub joined_at: SystemTime,
}

/// One cell of a pool board, persisted alongside the pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellEntity {
    /// Position on the board, `0..100` in row-major order.
    pub index: usize,
    /// Owning participant, if claimed.
    pub owner_id: Option<Uuid>,
}

/// Aggregate pool entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolEntity {
    /// Primary key of the pool.
    pub id: Uuid,
    /// URL-safe shareable identifier, unique across pools.
    pub slug: String,
    /// Human readable pool name.
    pub name: String,
    /// Whether claiming is still open.
    pub status: PoolStatus,
    /// Maximum number of cells a single participant may claim.
    pub claim_limit: usize,
    /// Row-axis digit permutation, absent until assigned.
    pub row_numbers: Option<Vec<u8>>,
    /// Column-axis digit permutation, absent until assigned.
    pub col_numbers: Option<Vec<u8>>,
    /// Registered participants in join order.
    pub participants: Vec<ParticipantEntity>,
    /// All 100 cells with their owner slots.
    pub cells: Vec<CellEntity>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the pool entity was updated.
    pub updated_at: SystemTime,
}

/// Summary of a pool for operator listings (subset of [`PoolEntity`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolListItemEntity {
    /// Primary key of the pool.
    pub id: Uuid,
    /// URL-safe shareable identifier.
    pub slug: String,
    /// Human readable pool name.
    pub name: String,
    /// Whether claiming is still open.
    pub status: PoolStatus,
    /// Maximum number of cells a single participant may claim.
    pub claim_limit: usize,
    /// Number of registered participants.
    pub participant_count: usize,
    /// Number of claimed cells.
    pub claimed_count: usize,
    /// Whether axis digits have been assigned.
    pub has_numbers: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Cumulative score line for one period of play.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodScoreEntity {
    /// Period label, `Q1` through `Q4`.
    pub label: String,
    /// Row-side cumulative score at the end of this period.
    pub row: u32,
    /// Column-side cumulative score at the end of this period.
    pub col: u32,
    /// Whether the period has finished.
    pub complete: bool,
}

/// One normalized scoreboard observation, append-only in storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreSnapshotEntity {
    /// Primary key of the snapshot.
    pub id: Uuid,
    /// Where the snapshot came from.
    pub source: ScoreSource,
    /// Display name of the matchup.
    pub name: String,
    /// Cumulative per-period scores observed so far.
    pub periods: Vec<PeriodScoreEntity>,
    /// Whether the game has ended.
    pub game_complete: bool,
    /// Which side currently has the ball.
    pub possession: Possession,
    /// Free-text situation line (down and distance), when available.
    pub situation: Option<String>,
    /// Whether the offense is in a high-leverage spot (red zone).
    pub high_leverage: bool,
    /// When the snapshot was recorded.
    pub updated_at: SystemTime,
}

/// Counters backing the pool-creation rate limit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreationLimitsEntity {
    /// Pools created since the counters were last reset.
    pub created_count: usize,
    /// Extra creation capacity granted on top of the base cap.
    pub bonus_capacity: usize,
}
