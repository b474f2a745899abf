use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{CreationLimitsEntity, PoolEntity, PoolListItemEntity, ScoreSnapshotEntity},
    pool_store::{BASE_CREATION_CAP, CreatePoolOutcome, PoolStore},
    storage::StorageResult,
};

/// In-memory [`PoolStore`] backing a single-process deployment.
///
/// Every trait method holds the inner lock for its whole body, so each call
/// is one serializable transaction: the cap check, slug check, and insert
/// inside [`PoolStore::create_pool`] never interleave with a concurrent
/// creation.
#[derive(Clone, Default)]
pub struct MemoryPoolStore {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    /// Pools keyed by id, in creation order.
    pools: IndexMap<Uuid, PoolEntity>,
    /// Append-only score snapshot log.
    snapshots: Vec<ScoreSnapshotEntity>,
    /// Creation rate-limit counters.
    limits: CreationLimitsEntity,
}

impl MemoryPoolStore {
    /// Build an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn list_item(pool: &PoolEntity) -> PoolListItemEntity {
    PoolListItemEntity {
        id: pool.id,
        slug: pool.slug.clone(),
        name: pool.name.clone(),
        status: pool.status,
        claim_limit: pool.claim_limit,
        participant_count: pool.participants.len(),
        claimed_count: pool.cells.iter().filter(|c| c.owner_id.is_some()).count(),
        has_numbers: pool.row_numbers.is_some(),
        created_at: pool.created_at,
    }
}

impl PoolStore for MemoryPoolStore {
    fn create_pool(&self, pool: PoolEntity) -> BoxFuture<'static, StorageResult<CreatePoolOutcome>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            let cap = BASE_CREATION_CAP + inner.limits.bonus_capacity;
            if inner.limits.created_count >= cap {
                return Ok(CreatePoolOutcome::RateLimited {
                    created: inner.limits.created_count,
                    cap,
                });
            }
            if inner.pools.values().any(|p| p.slug == pool.slug) {
                return Ok(CreatePoolOutcome::SlugTaken);
            }
            inner.limits.created_count += 1;
            inner.pools.insert(pool.id, pool);
            Ok(CreatePoolOutcome::Created)
        })
    }

    fn save_pool(&self, pool: PoolEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            inner.pools.insert(pool.id, pool);
            Ok(())
        })
    }

    fn find_pool(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PoolEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            Ok(inner.pools.get(&id).cloned())
        })
    }

    fn find_pool_by_slug(
        &self,
        slug: String,
    ) -> BoxFuture<'static, StorageResult<Option<PoolEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            Ok(inner.pools.values().find(|p| p.slug == slug).cloned())
        })
    }

    fn list_pools(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<PoolListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            // Newest first; the map keeps creation order.
            Ok(inner.pools.values().rev().take(limit).map(list_item).collect())
        })
    }

    fn pool_count(&self) -> BoxFuture<'static, StorageResult<usize>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            Ok(inner.pools.len())
        })
    }

    fn append_snapshot(
        &self,
        snapshot: ScoreSnapshotEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            inner.snapshots.push(snapshot);
            Ok(())
        })
    }

    fn latest_snapshot(&self) -> BoxFuture<'static, StorageResult<Option<ScoreSnapshotEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            // Last write wins on equal timestamps.
            Ok(inner
                .snapshots
                .iter()
                .max_by_key(|snapshot| snapshot.updated_at)
                .cloned())
        })
    }

    fn snapshot_count(&self) -> BoxFuture<'static, StorageResult<usize>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            Ok(inner.snapshots.len())
        })
    }

    fn creation_limits(&self) -> BoxFuture<'static, StorageResult<CreationLimitsEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            Ok(inner.limits)
        })
    }

    fn add_bonus_capacity(
        &self,
        amount: usize,
    ) -> BoxFuture<'static, StorageResult<CreationLimitsEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            inner.limits.bonus_capacity += amount;
            Ok(inner.limits)
        })
    }

    fn reset_creation_count(&self) -> BoxFuture<'static, StorageResult<CreationLimitsEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            inner.limits.created_count = 0;
            Ok(inner.limits)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }
}
