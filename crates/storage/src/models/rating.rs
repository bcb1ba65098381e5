use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Current skill rating of a participant across all rated competitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RatingProfile {
    pub player_id: Uuid,
    pub rating: f64,
    pub wins: i32,
    pub losses: i32,
    pub games_played: i32,
}

impl RatingProfile {
    /// Profile of a participant who has not been rated yet.
    pub fn seeded(player_id: Uuid, rating: f64) -> Self {
        Self {
            player_id,
            rating,
            wins: 0,
            losses: 0,
            games_played: 0,
        }
    }
}

/// Immutable record of one participant's rating change in one game.
///
/// The `(game_id, player_id)` pair is the primary key; the presence of any
/// entry for a `game_id` marks that game as rated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RatingHistoryEntry {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub game_date: NaiveDate,
    pub start_time: NaiveTime,
    pub teammate_id: Uuid,
    pub opponent1_id: Uuid,
    pub opponent2_id: Uuid,
    /// Score of team A, the same on all four entries of a game.
    pub result_a: i32,
    pub result_b: i32,
    pub rating_before: f64,
    pub rating_after: f64,
}

/// History entry as read back, with the time it was written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RecordedRatingChange {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: RatingHistoryEntry,
    pub recorded_at: NaiveDateTime,
}
