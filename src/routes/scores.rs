use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::scores::CurrentScoreResponse, error::AppError, services::score_service,
    state::SharedState,
};

/// Routes exposing the shared scoreboard.
pub fn router() -> Router<SharedState> {
    Router::new().route("/scores/current", get(current_score))
}

/// Latest score snapshot, or an empty payload before any game is tracked.
#[utoipa::path(
    get,
    path = "/scores/current",
    tag = "scores",
    responses((status = 200, description = "Current score state", body = CurrentScoreResponse))
)]
pub async fn current_score(
    State(state): State<SharedState>,
) -> Result<Json<CurrentScoreResponse>, AppError> {
    Ok(Json(score_service::current_score(&state).await?))
}
