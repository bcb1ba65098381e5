use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One line of the rating leaderboard
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RatingStanding {
    pub rank: i64,
    pub player_id: Uuid,
    pub name: String,
    pub rating: f64,
    pub wins: i32,
    pub losses: i32,
    pub games_played: i32,
}
