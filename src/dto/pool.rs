use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::PoolStatus,
    dto::{format_system_time, validation::validate_nonblank},
    state::session::PoolSession,
};

/// Payload used to open a brand-new pool.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePoolRequest {
    /// Display name for the pool.
    #[validate(custom(function = validate_nonblank))]
    pub name: String,
    /// Per-participant claim limit; defaults to 10 and is clamped into 1..=100.
    #[serde(default)]
    pub claim_limit: Option<usize>,
}

/// Returned once a pool has been created.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolCreated {
    pub id: Uuid,
    /// Shareable identifier to hand out to participants.
    pub slug: String,
}

/// Payload to join a pool under a display name.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinPoolRequest {
    #[validate(custom(function = validate_nonblank))]
    pub display_name: String,
}

/// Identity resolved by a join; the same name always maps to the same id.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinedPool {
    pub participant_id: Uuid,
    pub display_name: String,
}

/// Request to claim specific cells for a participant.
///
/// Out-of-range and already-claimed indexes are skipped, not rejected, so no
/// field-level validation applies here.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClaimRequest {
    pub participant_id: Uuid,
    pub indexes: Vec<usize>,
}

/// Cells actually claimed, in request order.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimOutcome {
    pub claimed: Vec<usize>,
}

/// Request to clear ownership on specific cells.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReleaseRequest {
    pub indexes: Vec<usize>,
}

/// Cells actually released, in request order.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReleaseOutcome {
    pub released: Vec<usize>,
}

/// Number of cells handed out by a distribution pass.
#[derive(Debug, Serialize, ToSchema)]
pub struct DistributeOutcome {
    pub distributed: usize,
}

/// Freshly drawn axis permutations.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignedNumbers {
    pub row_numbers: Vec<u8>,
    pub col_numbers: Vec<u8>,
}

/// Request to change the per-participant claim limit.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateClaimLimitRequest {
    pub claim_limit: usize,
}

/// Claim limit in force after an update.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimLimitOutcome {
    pub claim_limit: usize,
}

/// Pool lifecycle state after a lock request.
#[derive(Debug, Serialize, ToSchema)]
pub struct LockOutcome {
    pub status: PoolStatusDto,
}

/// Publicly visible pool lifecycle state.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatusDto {
    /// Claiming is open.
    Open,
    /// The board is locked for claiming.
    Locked,
}

impl From<PoolStatus> for PoolStatusDto {
    fn from(value: PoolStatus) -> Self {
        match value {
            PoolStatus::Open => PoolStatusDto::Open,
            PoolStatus::Locked => PoolStatusDto::Locked,
        }
    }
}

/// One cell of the rendered board.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct CellView {
    pub index: usize,
    pub owner_id: Option<Uuid>,
}

/// Participant as rendered to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantView {
    pub id: Uuid,
    pub display_name: String,
    pub joined_at: String,
}

/// Full pool view: metadata, all 100 cells, and all participants.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolSummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub status: PoolStatusDto,
    pub claim_limit: usize,
    pub row_numbers: Option<Vec<u8>>,
    pub col_numbers: Option<Vec<u8>>,
    pub cells: Vec<CellView>,
    pub participants: Vec<ParticipantView>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&PoolSession> for PoolSummary {
    fn from(session: &PoolSession) -> Self {
        Self {
            id: session.id,
            slug: session.slug.clone(),
            name: session.name.clone(),
            status: session.status.into(),
            claim_limit: session.claim_limit,
            row_numbers: session.numbers.map(|n| n.rows.into()),
            col_numbers: session.numbers.map(|n| n.cols.into()),
            cells: session
                .board
                .entries()
                .map(|(index, owner_id)| CellView { index, owner_id })
                .collect(),
            participants: session
                .participants
                .iter()
                .map(|(id, participant)| ParticipantView {
                    id: *id,
                    display_name: participant.display_name.clone(),
                    joined_at: format_system_time(participant.joined_at),
                })
                .collect(),
            created_at: format_system_time(session.created_at),
            updated_at: format_system_time(session.updated_at),
        }
    }
}

/// Running total of pools ever created.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolCount {
    pub count: usize,
}

/// Winning cell for one scoring period.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct PeriodWinner {
    pub label: String,
    pub row: u32,
    pub col: u32,
    pub complete: bool,
    /// Index of the winning cell; absent while digits are unassigned.
    pub cell_index: Option<usize>,
    pub owner_id: Option<Uuid>,
    pub owner_name: Option<String>,
}

/// Per-period winners for a pool against the current score snapshot.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct WinnersView {
    /// Whether the pool has digits assigned at all.
    pub assigned: bool,
    /// Whether the tracked game has ended.
    pub game_complete: bool,
    /// Name of the tracked game, when a snapshot exists.
    pub game_name: Option<String>,
    pub periods: Vec<PeriodWinner>,
}
