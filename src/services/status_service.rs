use tracing::info;

use crate::{
    dao::pool_store::PoolStore,
    dto::admin::{BonusCapacityRequest, LimitsView, StatusView},
    error::ServiceError,
    state::SharedState,
};

/// Aggregate backend counters for the operator dashboard.
pub async fn status(state: &SharedState) -> Result<StatusView, ServiceError> {
    let store = state.store();
    let pools = store.pool_count().await?;
    let snapshots = store.snapshot_count().await?;
    let latest = store.latest_snapshot().await?;
    let limits = store.creation_limits().await?;

    Ok(StatusView {
        pools,
        snapshots,
        latest: latest.map(Into::into),
        limits: limits.into(),
    })
}

/// Grant extra pool-creation capacity on top of the base cap.
pub async fn add_bonus_capacity(
    state: &SharedState,
    request: BonusCapacityRequest,
) -> Result<LimitsView, ServiceError> {
    let limits = state.store().add_bonus_capacity(request.amount).await?;
    info!(
        amount = request.amount,
        bonus = limits.bonus_capacity,
        "bonus creation capacity granted"
    );
    Ok(limits.into())
}

/// Zero the creation counter, reopening the full capacity window.
pub async fn reset_creation_count(state: &SharedState) -> Result<LimitsView, ServiceError> {
    let limits = state.store().reset_creation_count().await?;
    info!("pool creation counter reset");
    Ok(limits.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::pool::CreatePoolRequest,
        services::{pool_service, testing::test_state},
    };

    #[tokio::test]
    async fn test_status_reflects_created_pools() {
        let state = test_state();
        pool_service::create_pool(
            &state,
            CreatePoolRequest {
                name: "pool".into(),
                claim_limit: None,
            },
        )
        .await
        .unwrap();

        let view = status(&state).await.unwrap();
        assert_eq!(view.pools, 1);
        assert_eq!(view.snapshots, 0);
        assert!(view.latest.is_none());
        assert_eq!(view.limits.created_count, 1);
        assert_eq!(view.limits.cap, 100);
    }

    #[tokio::test]
    async fn test_bonus_and_reset_adjust_the_limits() {
        let state = test_state();

        let granted = add_bonus_capacity(&state, BonusCapacityRequest { amount: 5 })
            .await
            .unwrap();
        assert_eq!(granted.bonus_capacity, 5);
        assert_eq!(granted.cap, 105);

        let reset = reset_creation_count(&state).await.unwrap();
        assert_eq!(reset.created_count, 0);
    }
}
