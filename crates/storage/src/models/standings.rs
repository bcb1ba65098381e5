use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One participant's line in a scope's table. Always derived: rows are
/// rebuilt as a whole on every recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StandingsRow {
    pub scope_kind: String,
    pub scope_id: Uuid,
    pub player_id: Uuid,
    pub position: i32,
    pub points: i32,
    pub wins: i32,
    pub draws: i32,
    pub losses: i32,
    pub games_played: i32,
    pub games_for: i32,
    pub games_against: i32,
    pub games_diff: i32,
    pub ranking: f64,
}
