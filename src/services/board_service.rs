use tracing::info;

use crate::{
    dao::pool_store::PoolStore,
    dto::pool::{
        AssignedNumbers, ClaimOutcome, ClaimRequest, DistributeOutcome, ReleaseOutcome,
        ReleaseRequest,
    },
    error::ServiceError,
    services::{pool_service, sse_events},
    state::SharedState,
};

/// Claim cells for a participant.
///
/// The whole read-validate-write runs under the pool's session lock, so two
/// racing claims for the same cell resolve to exactly one owner; the loser
/// simply sees the cell skipped.
pub async fn claim_squares(
    state: &SharedState,
    slug: &str,
    request: ClaimRequest,
) -> Result<ClaimOutcome, ServiceError> {
    let session = pool_service::ensure_session(state, slug).await?;
    let mut guard = session.lock().await;
    let claimed = guard.claim(request.participant_id, &request.indexes)?;
    if !claimed.is_empty() {
        state.store().save_pool(guard.to_entity()).await?;
        sse_events::broadcast_pool_updated(state, &guard);
    }
    Ok(ClaimOutcome { claimed })
}

/// Release cells back to the unclaimed state.
///
/// Clears any owned cell among the given indexes regardless of who holds it;
/// unowned and out-of-range indexes are ignored.
pub async fn release_squares(
    state: &SharedState,
    slug: &str,
    request: ReleaseRequest,
) -> Result<ReleaseOutcome, ServiceError> {
    let session = pool_service::ensure_session(state, slug).await?;
    let mut guard = session.lock().await;
    let released = guard.release(&request.indexes);
    if !released.is_empty() {
        state.store().save_pool(guard.to_entity()).await?;
        sse_events::broadcast_pool_updated(state, &guard);
    }
    Ok(ReleaseOutcome { released })
}

/// Deal every unclaimed cell out across the roster, round-robin in join
/// order after a shuffle.
pub async fn distribute_squares(
    state: &SharedState,
    slug: &str,
) -> Result<DistributeOutcome, ServiceError> {
    let session = pool_service::ensure_session(state, slug).await?;
    let mut guard = session.lock().await;
    let distributed = guard.distribute(&mut rand::rng())?;
    state.store().save_pool(guard.to_entity()).await?;
    info!(pool = %guard.slug, distributed, "distributed unclaimed squares");
    sse_events::broadcast_pool_updated(state, &guard);
    Ok(DistributeOutcome { distributed })
}

/// Draw fresh random digit permutations for both axes.
///
/// Redrawing over an existing assignment is allowed and replaces it.
pub async fn assign_numbers(
    state: &SharedState,
    slug: &str,
) -> Result<AssignedNumbers, ServiceError> {
    let session = pool_service::ensure_session(state, slug).await?;
    let mut guard = session.lock().await;
    let numbers = guard.assign_numbers(&mut rand::rng());
    state.store().save_pool(guard.to_entity()).await?;
    info!(pool = %guard.slug, "axis numbers assigned");
    sse_events::broadcast_pool_updated(state, &guard);
    Ok(AssignedNumbers {
        row_numbers: numbers.rows.into(),
        col_numbers: numbers.cols.into(),
    })
}
