use serde::Serialize;
use utoipa::ToSchema;

/// Health payload served by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Either "ok" or "unavailable".
    pub status: String,
}

impl HealthResponse {
    /// Backend is up and storage answered the probe.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// Storage did not answer the probe.
    pub fn unavailable() -> Self {
        Self {
            status: "unavailable".to_string(),
        }
    }
}
