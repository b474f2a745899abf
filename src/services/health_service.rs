use tracing::warn;

use crate::{dao::pool_store::PoolStore, dto::health::HealthResponse, state::SharedState};

/// Report whether the backend can serve traffic, probing the store.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::unavailable()
        }
    }
}
