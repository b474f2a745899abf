//! DTO definitions used by the operator REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{CreationLimitsEntity, PoolListItemEntity},
    dao::pool_store::BASE_CREATION_CAP,
    dto::{format_system_time, pool::PoolStatusDto, scores::ScoreSnapshotView},
};

/// Pool projection for the operator dashboard list.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListItem {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub status: PoolStatusDto,
    pub claim_limit: usize,
    pub participant_count: usize,
    pub claimed_count: usize,
    pub has_numbers: bool,
    pub created_at: String,
}

impl From<PoolListItemEntity> for PoolListItem {
    fn from(value: PoolListItemEntity) -> Self {
        Self {
            id: value.id,
            slug: value.slug,
            name: value.name,
            status: value.status.into(),
            claim_limit: value.claim_limit,
            participant_count: value.participant_count,
            claimed_count: value.claimed_count,
            has_numbers: value.has_numbers,
            created_at: format_system_time(value.created_at),
        }
    }
}

/// Request to grant extra pool-creation capacity.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BonusCapacityRequest {
    /// Number of extra pools allowed on top of the base cap.
    #[validate(range(min = 1))]
    pub amount: usize,
}

/// Creation rate-limit counters and the effective cap.
#[derive(Debug, Serialize, ToSchema)]
pub struct LimitsView {
    pub created_count: usize,
    pub bonus_capacity: usize,
    /// Effective cap: base plus bonus.
    pub cap: usize,
}

impl From<CreationLimitsEntity> for LimitsView {
    fn from(value: CreationLimitsEntity) -> Self {
        Self {
            created_count: value.created_count,
            bonus_capacity: value.bonus_capacity,
            cap: BASE_CREATION_CAP + value.bonus_capacity,
        }
    }
}

/// Aggregate backend status for the operator dashboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusView {
    /// Total pools ever created.
    pub pools: usize,
    /// Score snapshots persisted so far.
    pub snapshots: usize,
    /// Most recent snapshot, if any scores have been recorded.
    pub latest: Option<ScoreSnapshotView>,
    pub limits: LimitsView,
}
