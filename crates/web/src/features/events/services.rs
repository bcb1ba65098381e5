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

pub async fn create_schedule(pool: &PgPool, event_id: Uuid) -> Result<Vec<Game>> {
    fixtures::create_event_schedule(pool, event_id).await
}

pub async fn assign_teams(
    pool: &PgPool,
    event_id: Uuid,
    mode: TeamMode,
    player_ids: &[Uuid],
) -> Result<TeamBindings> {
    teams::assign_event_teams(pool, event_id, mode, player_ids).await
}

pub async fn submit_results(
    pool: &PgPool,
    event_id: Uuid,
    scores: &[GameScore],
    settings: &RatingSettings,
) -> Result<SubmissionOutcome> {
    results::submit_event_results(pool, event_id, scores, settings).await
}

pub async fn get_standings(pool: &PgPool, event_id: Uuid) -> Result<Vec<StandingsRow>> {
    standings::list(pool, Scope::Event(event_id)).await
}
