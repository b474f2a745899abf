use serde::Serialize;
use tracing::warn;

use crate::{
    dao::models::ScoreSnapshotEntity,
    dto::sse::{PoolCreatedEvent, PoolUpdatedEvent, ScoresUpdatedEvent, ServerEvent},
    state::{SharedState, session::PoolSession},
};

const EVENT_POOL_CREATED: &str = "pool.created";
const EVENT_POOL_UPDATED: &str = "pool.updated";
const EVENT_SCORES_UPDATED: &str = "scores.updated";

/// Broadcast that a new pool is available.
pub fn broadcast_pool_created(state: &SharedState, session: &PoolSession) {
    let payload = PoolCreatedEvent {
        id: session.id,
        slug: session.slug.clone(),
        name: session.name.clone(),
    };
    send_event(state, EVENT_POOL_CREATED, &payload);
}

/// Broadcast that a pool changed so clients watching it can refetch.
pub fn broadcast_pool_updated(state: &SharedState, session: &PoolSession) {
    let payload = PoolUpdatedEvent {
        slug: session.slug.clone(),
    };
    send_event(state, EVENT_POOL_UPDATED, &payload);
}

/// Broadcast a freshly persisted score snapshot to every subscriber.
pub fn broadcast_scores_updated(state: &SharedState, snapshot: ScoreSnapshotEntity) {
    let payload = ScoresUpdatedEvent {
        game: snapshot.into(),
    };
    send_event(state, EVENT_SCORES_UPDATED, &payload);
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
