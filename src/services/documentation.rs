use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the squares backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::pools::create_pool,
        crate::routes::pools::pool_count,
        crate::routes::pools::get_pool,
        crate::routes::pools::join_pool,
        crate::routes::pools::claim_squares,
        crate::routes::pools::release_squares,
        crate::routes::pools::distribute_squares,
        crate::routes::pools::assign_numbers,
        crate::routes::pools::lock_pool,
        crate::routes::pools::update_claim_limit,
        crate::routes::pools::winners,
        crate::routes::scores::current_score,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::PoolCreatedEvent,
            crate::dto::sse::PoolUpdatedEvent,
            crate::dto::sse::ScoresUpdatedEvent,
        )
    ),
    tags(
        (name = "pools", description = "Pool lifecycle and board operations"),
        (name = "scores", description = "Shared scoreboard endpoints"),
        (name = "sse", description = "Server-sent events stream"),
    )
)]
pub struct ApiDoc;
