pub mod memory;

use crate::dao::models::{
    CreationLimitsEntity, PoolEntity, PoolListItemEntity, ScoreSnapshotEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Pools that may be created before the rate limit kicks in, on top of any
/// granted bonus capacity.
pub const BASE_CREATION_CAP: usize = 100;

/// Result of an atomic pool-creation attempt.
///
/// Creation bundles three effects into one storage step: the cap check, the
/// slug uniqueness check, and the insert plus counter increment. Returning an
/// outcome instead of an error keeps the retry decision with the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePoolOutcome {
    /// The pool was inserted and the creation counter advanced.
    Created,
    /// The creation cap is exhausted; nothing was written.
    RateLimited {
        /// Pools created so far.
        created: usize,
        /// Cap in force at the time of the attempt.
        cap: usize,
    },
    /// The slug is already in use; the caller should redraw and retry.
    SlugTaken,
}

/// Abstraction over the persistence layer for pools, score snapshots, and
/// creation limits.
///
/// Every method is one serializable transaction: implementations apply the
/// whole effect or none of it, and concurrent calls observe each other's
/// completed writes.
pub trait PoolStore: Send + Sync {
    fn create_pool(&self, pool: PoolEntity) -> BoxFuture<'static, StorageResult<CreatePoolOutcome>>;
    fn save_pool(&self, pool: PoolEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_pool(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PoolEntity>>>;
    fn find_pool_by_slug(&self, slug: String)
    -> BoxFuture<'static, StorageResult<Option<PoolEntity>>>;
    fn list_pools(&self, limit: usize) -> BoxFuture<'static, StorageResult<Vec<PoolListItemEntity>>>;
    fn pool_count(&self) -> BoxFuture<'static, StorageResult<usize>>;
    fn append_snapshot(&self, snapshot: ScoreSnapshotEntity)
    -> BoxFuture<'static, StorageResult<()>>;
    fn latest_snapshot(&self) -> BoxFuture<'static, StorageResult<Option<ScoreSnapshotEntity>>>;
    fn snapshot_count(&self) -> BoxFuture<'static, StorageResult<usize>>;
    fn creation_limits(&self) -> BoxFuture<'static, StorageResult<CreationLimitsEntity>>;
    fn add_bonus_capacity(&self, amount: usize)
    -> BoxFuture<'static, StorageResult<CreationLimitsEntity>>;
    fn reset_creation_count(&self) -> BoxFuture<'static, StorageResult<CreationLimitsEntity>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
