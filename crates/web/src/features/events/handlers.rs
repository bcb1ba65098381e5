use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        results::SubmitResultsRequest,
        schedule::ScheduleResponse,
        standings::StandingsResponse,
        teams::{AssignTeamsRequest, TeamResponse},
    },
    models::Scope,
    services::results::SubmissionOutcome,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/schedule",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 201, description = "Round-robin schedule created", body = ScheduleResponse),
        (status = 400, description = "Unsupported team count or no courts"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "The event already has results")
    ),
    tag = "events"
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let games = services::create_schedule(state.db.pool(), event_id).await?;

    let response = ScheduleResponse {
        scope: Scope::Event(event_id),
        games,
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/teams",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = AssignTeamsRequest,
    responses(
        (status = 200, description = "Teams drawn and bound to the schedule", body = Vec<TeamResponse>),
        (status = 400, description = "Wrong number of participants"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "The event already has results")
    ),
    tag = "events"
)]
pub async fn assign_teams(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<AssignTeamsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let bindings =
        services::assign_teams(state.db.pool(), event_id, req.mode, &req.player_ids).await?;

    Ok(Json(TeamResponse::from_bindings(bindings)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/results",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = SubmitResultsRequest,
    responses(
        (status = 200, description = "Scores stored, standings and ratings refreshed", body = SubmissionOutcome),
        (status = 400, description = "Invalid score"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn submit_results(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<SubmitResultsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let outcome =
        services::submit_results(state.db.pool(), event_id, &req.scores, &state.rating).await?;

    Ok(Json(outcome).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/standings",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Event table", body = StandingsResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn get_standings(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let rows = services::get_standings(state.db.pool(), event_id).await?;

    Ok(Json(StandingsResponse {
        scope: Scope::Event(event_id),
        rows,
    })
    .into_response())
}
