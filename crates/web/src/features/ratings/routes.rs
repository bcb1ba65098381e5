use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{get_history, get_leaderboard, recalculate, sweep};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ratings", get(get_leaderboard))
        .route("/players/:player_id/rating-history", get(get_history))
        .route("/admin/ratings/sweep", post(sweep))
        .route("/admin/ratings/recalculate", post(recalculate))
}
