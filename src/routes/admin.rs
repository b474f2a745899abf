use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        admin::{BonusCapacityRequest, LimitsView, PoolListItem, StatusView},
        scores::{ManualScoresRequest, ScoreSnapshotView, TickOutcome},
    },
    error::AppError,
    services::{pool_service, score_service, status_service},
    state::SharedState,
};

const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Operator-only endpoints, all gated behind the shared admin secret.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/pools", get(list_pools))
        .route("/admin/status", get(status))
        .route("/admin/scores", post(set_manual_scores))
        .route("/admin/scores/fetch", post(fetch_scores))
        .route("/admin/limits/bonus", post(add_bonus_capacity))
        .route("/admin/limits/reset", post(reset_creation_count))
        .route_layer(middleware::from_fn_with_state(state, require_admin_secret))
}

/// List every pool, newest first, with occupancy counts.
#[utoipa::path(
    get,
    path = "/admin/pools",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared operator secret")),
    responses((status = 200, description = "Pools, newest first", body = [PoolListItem]))
)]
pub async fn list_pools(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PoolListItem>>, AppError> {
    Ok(Json(pool_service::list_pools(&state).await?))
}

/// Aggregate counters for the operator dashboard.
#[utoipa::path(
    get,
    path = "/admin/status",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared operator secret")),
    responses((status = 200, description = "Backend status", body = StatusView))
)]
pub async fn status(State(state): State<SharedState>) -> Result<Json<StatusView>, AppError> {
    Ok(Json(status_service::status(&state).await?))
}

/// Record a manually entered score snapshot.
#[utoipa::path(
    post,
    path = "/admin/scores",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared operator secret")),
    request_body = ManualScoresRequest,
    responses(
        (status = 200, description = "Snapshot recorded", body = ScoreSnapshotView),
        (status = 400, description = "A period score is out of range")
    )
)]
pub async fn set_manual_scores(
    State(state): State<SharedState>,
    Json(payload): Json<ManualScoresRequest>,
) -> Result<Json<ScoreSnapshotView>, AppError> {
    Ok(Json(score_service::set_manual_scores(&state, payload).await?))
}

/// Run one feed tick right now instead of waiting for the poller.
#[utoipa::path(
    post,
    path = "/admin/scores/fetch",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared operator secret")),
    responses((status = 200, description = "Tick outcome", body = TickOutcome))
)]
pub async fn fetch_scores(State(state): State<SharedState>) -> Result<Json<TickOutcome>, AppError> {
    Ok(Json(score_service::run_tick(&state).await?))
}

/// Grant extra pool-creation capacity.
#[utoipa::path(
    post,
    path = "/admin/limits/bonus",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared operator secret")),
    request_body = BonusCapacityRequest,
    responses((status = 200, description = "Limits after the grant", body = LimitsView))
)]
pub async fn add_bonus_capacity(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<BonusCapacityRequest>>,
) -> Result<Json<LimitsView>, AppError> {
    Ok(Json(
        status_service::add_bonus_capacity(&state, payload).await?,
    ))
}

/// Zero the creation counter.
#[utoipa::path(
    post,
    path = "/admin/limits/reset",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared operator secret")),
    responses((status = 200, description = "Limits after the reset", body = LimitsView))
)]
pub async fn reset_creation_count(
    State(state): State<SharedState>,
) -> Result<Json<LimitsView>, AppError> {
    Ok(Json(status_service::reset_creation_count(&state).await?))
}

async fn require_admin_secret(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized(format!(
                "missing admin secret header `{ADMIN_SECRET_HEADER}`"
            ))
        })?;

    match state.admin_secret() {
        Some(expected) if expected == provided => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid admin secret".into())),
        None => Err(AppError::Unauthorized(
            "admin access is not configured".into(),
        )),
    }
}
