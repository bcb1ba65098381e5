use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{get_standings, plan_gamedays};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:league_id/gamedays", post(plan_gamedays))
        .route("/:league_id/standings", get(get_standings))
}
