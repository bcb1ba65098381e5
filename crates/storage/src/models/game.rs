use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One scheduled doubles game. Belongs either to a playing day (and its
/// league) or to an event, never both.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Game {
    pub game_id: Uuid,
    pub league_id: Option<Uuid>,
    pub gameday_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub game_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub court_id: Uuid,
    pub round: i32,
    pub slot: i32,
    pub team_a: String,
    pub team_b: String,
    pub player_a1_id: Option<Uuid>,
    pub player_a2_id: Option<Uuid>,
    pub player_b1_id: Option<Uuid>,
    pub player_b2_id: Option<Uuid>,
    pub result_a: Option<i32>,
    pub result_b: Option<i32>,
}

impl Game {
    /// Both sides, once all four participants are bound.
    pub fn sides(&self) -> Option<([Uuid; 2], [Uuid; 2])> {
        Some((
            [self.player_a1_id?, self.player_a2_id?],
            [self.player_b1_id?, self.player_b2_id?],
        ))
    }

    /// Final score, or `None` while the game is unplayed (a missing value
    /// or the 0-0 placeholder written at scheduling time).
    pub fn score(&self) -> Option<(i32, i32)> {
        match (self.result_a, self.result_b) {
            (Some(0), Some(0)) => None,
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}
