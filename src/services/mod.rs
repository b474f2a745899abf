/// Board operations: claiming, releasing, distribution, number assignment.
pub mod board_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Pool lifecycle: creation, joining, settings, listings.
pub mod pool_service;
/// Periodic score feed polling.
pub mod score_poller;
/// Score pipeline: feed ticks, manual entry, winner resolution.
pub mod score_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Operator status and creation-limit management.
pub mod status_service;

#[cfg(test)]
pub(crate) mod testing;
