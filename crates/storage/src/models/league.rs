use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::fixtures::SlotTiming;

/// A multi-day league. Each playing day (`Gameday`) reuses its timing,
/// courts and team count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct League {
    pub league_id: Uuid,
    pub name: String,
    pub status: String,
    pub team_count: i32,
    pub presence_points: i32,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub warm_up_minutes: i32,
    pub minutes_per_game: i32,
    pub minutes_between_games: i32,
    pub elo_k: i32,
    pub winner1_id: Option<Uuid>,
    pub winner2_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

impl League {
    pub fn slot_timing(&self, date: NaiveDate) -> SlotTiming {
        SlotTiming {
            start: date.and_time(self.start_time),
            warm_up_minutes: self.warm_up_minutes.max(0) as i64,
            minutes_per_game: self.minutes_per_game.max(0) as i64,
            minutes_between_games: self.minutes_between_games.max(0) as i64,
        }
    }
}
