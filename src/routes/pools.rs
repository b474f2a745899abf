use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::pool::{
        AssignedNumbers, ClaimLimitOutcome, ClaimOutcome, ClaimRequest, CreatePoolRequest,
        DistributeOutcome, JoinPoolRequest, JoinedPool, LockOutcome, PoolCount, PoolCreated,
        PoolSummary, ReleaseOutcome, ReleaseRequest, UpdateClaimLimitRequest, WinnersView,
    },
    error::AppError,
    services::{board_service, pool_service, score_service},
    state::SharedState,
};

/// Routes for the participant-facing pool lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/pools", post(create_pool))
        .route("/pools/count", get(pool_count))
        .route("/pools/{slug}", get(get_pool))
        .route("/pools/{slug}/join", post(join_pool))
        .route("/pools/{slug}/claim", post(claim_squares))
        .route("/pools/{slug}/release", post(release_squares))
        .route("/pools/{slug}/distribute", post(distribute_squares))
        .route("/pools/{slug}/assign-numbers", post(assign_numbers))
        .route("/pools/{slug}/lock", post(lock_pool))
        .route("/pools/{slug}/max-claims", put(update_claim_limit))
        .route("/pools/{slug}/winners", get(winners))
}

/// Open a new pool and hand back its shareable slug.
#[utoipa::path(
    post,
    path = "/pools",
    tag = "pools",
    request_body = CreatePoolRequest,
    responses(
        (status = 200, description = "Pool created", body = PoolCreated),
        (status = 429, description = "Pool creation limit reached")
    )
)]
pub async fn create_pool(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreatePoolRequest>>,
) -> Result<Json<PoolCreated>, AppError> {
    Ok(Json(pool_service::create_pool(&state, payload).await?))
}

/// Count every pool created so far.
#[utoipa::path(
    get,
    path = "/pools/count",
    tag = "pools",
    responses((status = 200, description = "Number of pools", body = PoolCount))
)]
pub async fn pool_count(State(state): State<SharedState>) -> Result<Json<PoolCount>, AppError> {
    Ok(Json(pool_service::pool_count(&state).await?))
}

/// Fetch a pool with its full board and roster.
#[utoipa::path(
    get,
    path = "/pools/{slug}",
    tag = "pools",
    params(("slug" = String, Path, description = "Shareable pool identifier")),
    responses(
        (status = 200, description = "Pool state", body = PoolSummary),
        (status = 404, description = "No pool under that slug")
    )
)]
pub async fn get_pool(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<PoolSummary>, AppError> {
    Ok(Json(pool_service::get_pool(&state, &slug).await?))
}

/// Join a pool under a display name, or resolve the existing participant.
#[utoipa::path(
    post,
    path = "/pools/{slug}/join",
    tag = "pools",
    params(("slug" = String, Path, description = "Shareable pool identifier")),
    request_body = JoinPoolRequest,
    responses((status = 200, description = "Participant identity", body = JoinedPool))
)]
pub async fn join_pool(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Valid(Json(payload)): Valid<Json<JoinPoolRequest>>,
) -> Result<Json<JoinedPool>, AppError> {
    Ok(Json(pool_service::join_pool(&state, &slug, payload).await?))
}

/// Claim cells for a participant.
#[utoipa::path(
    post,
    path = "/pools/{slug}/claim",
    tag = "pools",
    params(("slug" = String, Path, description = "Shareable pool identifier")),
    request_body = ClaimRequest,
    responses(
        (status = 200, description = "Cells actually claimed", body = ClaimOutcome),
        (status = 409, description = "Pool locked or claim limit reached")
    )
)]
pub async fn claim_squares(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Json(payload): Json<ClaimRequest>,
) -> Result<Json<ClaimOutcome>, AppError> {
    Ok(Json(
        board_service::claim_squares(&state, &slug, payload).await?,
    ))
}

/// Release cells back to the board.
#[utoipa::path(
    post,
    path = "/pools/{slug}/release",
    tag = "pools",
    params(("slug" = String, Path, description = "Shareable pool identifier")),
    request_body = ReleaseRequest,
    responses((status = 200, description = "Cells actually released", body = ReleaseOutcome))
)]
pub async fn release_squares(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Json(payload): Json<ReleaseRequest>,
) -> Result<Json<ReleaseOutcome>, AppError> {
    Ok(Json(
        board_service::release_squares(&state, &slug, payload).await?,
    ))
}

/// Spread every unclaimed cell across the current roster.
#[utoipa::path(
    post,
    path = "/pools/{slug}/distribute",
    tag = "pools",
    params(("slug" = String, Path, description = "Shareable pool identifier")),
    responses(
        (status = 200, description = "Cells handed out", body = DistributeOutcome),
        (status = 409, description = "No participants, or nothing left to distribute")
    )
)]
pub async fn distribute_squares(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<DistributeOutcome>, AppError> {
    Ok(Json(board_service::distribute_squares(&state, &slug).await?))
}

/// Draw random digits for both axes of the board.
#[utoipa::path(
    post,
    path = "/pools/{slug}/assign-numbers",
    tag = "pools",
    params(("slug" = String, Path, description = "Shareable pool identifier")),
    responses((status = 200, description = "Digits now on the axes", body = AssignedNumbers))
)]
pub async fn assign_numbers(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<AssignedNumbers>, AppError> {
    Ok(Json(board_service::assign_numbers(&state, &slug).await?))
}

/// Close the pool for claiming.
#[utoipa::path(
    post,
    path = "/pools/{slug}/lock",
    tag = "pools",
    params(("slug" = String, Path, description = "Shareable pool identifier")),
    responses((status = 200, description = "Pool status after locking", body = LockOutcome))
)]
pub async fn lock_pool(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<LockOutcome>, AppError> {
    Ok(Json(pool_service::lock_pool(&state, &slug).await?))
}

/// Change how many cells one participant may hold.
#[utoipa::path(
    put,
    path = "/pools/{slug}/max-claims",
    tag = "pools",
    params(("slug" = String, Path, description = "Shareable pool identifier")),
    request_body = UpdateClaimLimitRequest,
    responses(
        (status = 200, description = "Limit now in force", body = ClaimLimitOutcome),
        (status = 409, description = "A participant already holds more than the new limit")
    )
)]
pub async fn update_claim_limit(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateClaimLimitRequest>,
) -> Result<Json<ClaimLimitOutcome>, AppError> {
    Ok(Json(
        pool_service::update_claim_limit(&state, &slug, payload).await?,
    ))
}

/// Resolve the winning cell and owner for every known period.
#[utoipa::path(
    get,
    path = "/pools/{slug}/winners",
    tag = "pools",
    params(("slug" = String, Path, description = "Shareable pool identifier")),
    responses((status = 200, description = "Per-period winners", body = WinnersView))
)]
pub async fn winners(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<WinnersView>, AppError> {
    Ok(Json(score_service::winners(&state, &slug).await?))
}
