use sqlx::PgPool;
use storage::{
    error::Result,
    models::{Gameday, Scope, StandingsRow},
    services::{fixtures, standings},
};
use uuid::Uuid;

/// Create weekly playing days, each with its schedule
pub async fn plan_gamedays(pool: &PgPool, league_id: Uuid, count: u32) -> Result<Vec<Gameday>> {
    fixtures::plan_league_calendar(pool, league_id, count).await
}

pub async fn get_standings(pool: &PgPool, league_id: Uuid) -> Result<Vec<StandingsRow>> {
    standings::list(pool, Scope::League(league_id)).await
}
