use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Gameday {
    pub gameday_id: Uuid,
    pub league_id: Uuid,
    pub name: String,
    pub game_date: NaiveDate,
    pub status: String,
    pub winner1_id: Option<Uuid>,
    pub winner2_id: Option<Uuid>,
}

/// A participant taking part in a playing day, with the team letter they
/// were assigned to (if teams were drawn already).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GamedayPlayer {
    pub gameday_id: Uuid,
    pub player_id: Uuid,
    pub team: Option<String>,
}
