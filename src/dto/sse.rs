use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::scores::ScoreSnapshotView;

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a brand new pool becomes available.
pub struct PoolCreatedEvent {
    pub id: Uuid,
    /// Slug clients can use to look the pool up.
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a pool's board, roster, numbers, or settings change.
pub struct PoolUpdatedEvent {
    /// Slug of the pool that changed; clients watching it should refetch.
    pub slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a new score snapshot is persisted.
pub struct ScoresUpdatedEvent {
    pub game: ScoreSnapshotView,
}
