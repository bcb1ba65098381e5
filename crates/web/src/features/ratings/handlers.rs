use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        common::{PaginatedResponse, PaginationParams},
        rating::RatingStanding,
    },
    models::RecordedRatingChange,
    services::rating::SweepReport,
};
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/ratings",
    params(PaginationParams),
    responses(
        (status = 200, description = "Rating leaderboard", body = PaginatedResponse<RatingStanding>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "ratings"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, WebError> {
    params.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) = services::get_leaderboard(state.db.pool(), &params).await?;

    Ok(Json(PaginatedResponse::new(entries, &params, total_items)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/players/{player_id}/rating-history",
    params(
        ("player_id" = Uuid, Path, description = "Participant id"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Rating changes, newest first", body = PaginatedResponse<RecordedRatingChange>),
        (status = 404, description = "Participant not found")
    ),
    tag = "ratings"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(player_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, WebError> {
    params.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) = services::get_history(state.db.pool(), player_id, &params).await?;

    Ok(Json(PaginatedResponse::new(entries, &params, total_items)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/ratings/sweep",
    responses(
        (status = 200, description = "Pending games rated", body = SweepReport)
    ),
    tag = "ratings"
)]
pub async fn sweep(State(state): State<AppState>) -> Result<Response, WebError> {
    let report = services::sweep(state.db.pool(), &state.rating).await?;

    Ok(Json(report).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/ratings/recalculate",
    responses(
        (status = 200, description = "All ratings rebuilt from scratch", body = SweepReport)
    ),
    tag = "ratings"
)]
pub async fn recalculate(State(state): State<AppState>) -> Result<Response, WebError> {
    let report = services::recalculate(state.db.pool(), &state.rating).await?;

    Ok(Json(report).into_response())
}
