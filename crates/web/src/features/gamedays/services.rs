use sqlx::PgPool;
use storage::{
    dto::results::GameScore,
    error::Result,
    models::{Game, Scope, StandingsRow},
    services::{
        fixtures::{self, TeamBindings},
        rating::RatingSettings,
        results::{self, SubmissionOutcome},
        standings,
        teams::{self, TeamMode},
    },
};
use uuid::Uuid;

pub async fn create_schedule(pool: &PgPool, gameday_id: Uuid) -> Result<Vec<Game>> {
    fixtures::create_gameday_schedule(pool, gameday_id).await
}

pub async fn assign_teams(
    pool: &PgPool,
    gameday_id: Uuid,
    mode: TeamMode,
    player_ids: &[Uuid],
) -> Result<TeamBindings> {
    teams::assign_gameday_teams(pool, gameday_id, mode, player_ids).await
}

pub async fn submit_results(
    pool: &PgPool,
    gameday_id: Uuid,
    scores: &[GameScore],
    settings: &RatingSettings,
) -> Result<SubmissionOutcome> {
    results::submit_gameday_results(pool, gameday_id, scores, settings).await
}

pub async fn get_standings(pool: &PgPool, gameday_id: Uuid) -> Result<Vec<StandingsRow>> {
    standings::list(pool, Scope::Gameday(gameday_id)).await
}
