use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        schedule::{PlanGamedaysRequest, PlannedGamedaysResponse},
        standings::StandingsResponse,
    },
    models::Scope,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/leagues/{league_id}/gamedays",
    params(
        ("league_id" = Uuid, Path, description = "League id")
    ),
    request_body = PlanGamedaysRequest,
    responses(
        (status = 201, description = "Playing days and their schedules created", body = PlannedGamedaysResponse),
        (status = 400, description = "Validation error, unsupported team count or no courts"),
        (status = 404, description = "League not found")
    ),
    tag = "leagues"
)]
pub async fn plan_gamedays(
    State(state): State<AppState>,
    Path(league_id): Path<Uuid>,
    Json(req): Json<PlanGamedaysRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let gamedays = services::plan_gamedays(state.db.pool(), league_id, req.count).await?;

    Ok((StatusCode::CREATED, Json(PlannedGamedaysResponse { gamedays })).into_response())
}

#[utoipa::path(
    get,
    path = "/api/leagues/{league_id}/standings",
    params(
        ("league_id" = Uuid, Path, description = "League id")
    ),
    responses(
        (status = 200, description = "League table", body = StandingsResponse),
        (status = 404, description = "League not found")
    ),
    tag = "leagues"
)]
pub async fn get_standings(
    State(state): State<AppState>,
    Path(league_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let rows = services::get_standings(state.db.pool(), league_id).await?;

    Ok(Json(StandingsResponse {
        scope: Scope::League(league_id),
        rows,
    })
    .into_response())
}
