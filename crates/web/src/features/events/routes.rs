use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{assign_teams, create_schedule, get_standings, submit_results};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:event_id/schedule", post(create_schedule))
        .route("/:event_id/teams", post(assign_teams))
        .route("/:event_id/results", post(submit_results))
        .route("/:event_id/standings", get(get_standings))
}
