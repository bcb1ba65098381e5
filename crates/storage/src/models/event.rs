use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::fixtures::SlotTiming;
use crate::services::standings::ScoreRules;

/// A standalone single-day tournament.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub event_id: Uuid,
    pub title: String,
    pub status: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub team_count: i32,
    pub presence_points: i32,
    pub max_points: Option<i32>,
    pub allow_draws: bool,
    pub allow_overtime: bool,
    pub warm_up_minutes: i32,
    pub minutes_per_game: i32,
    pub minutes_between_games: i32,
    pub elo_k: i32,
    pub winner1_id: Option<Uuid>,
    pub winner2_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

impl Event {
    pub fn slot_timing(&self) -> SlotTiming {
        SlotTiming {
            start: self.event_date.and_time(self.start_time),
            warm_up_minutes: self.warm_up_minutes.max(0) as i64,
            minutes_per_game: self.minutes_per_game.max(0) as i64,
            minutes_between_games: self.minutes_between_games.max(0) as i64,
        }
    }

    pub fn score_rules(&self) -> ScoreRules {
        ScoreRules {
            max_points: self.max_points,
            allow_draws: self.allow_draws,
            allow_overtime: self.allow_overtime,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventRegistration {
    pub event_id: Uuid,
    pub player_id: Uuid,
    pub is_substitute: bool,
    pub team: Option<String>,
}
