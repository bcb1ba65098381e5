//! Results submission: write the scores, then refresh everything derived
//! from them.

use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::results::GameScore;
use crate::error::{Result, StorageError};
use crate::models::{Scope, StandingsRow};
use crate::repository::event::EventRepository;
use crate::repository::game::GameRepository;
use crate::repository::gameday::GamedayRepository;
use crate::repository::league::LeagueRepository;
use crate::services::fixtures::not_found_as_scope;
use crate::services::rating::{self, RatingSettings, SweepReport};
use crate::services::standings::{self, ScoreRules};
use crate::services::winners::Winners;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionOutcome {
    /// Table of the submitted playing day or event.
    pub standings: Vec<StandingsRow>,
    pub winners: Option<Winners>,
    pub ratings: SweepReport,
}

async fn write_scores(
    tx: &mut Transaction<'_, Postgres>,
    scope: Scope,
    rules: &ScoreRules,
    scores: &[GameScore],
) -> Result<()> {
    for score in scores {
        rules
            .validate(score.result_a, score.result_b)
            .map_err(|reason| StorageError::InvalidScore {
                game_id: score.game_id,
                reason,
            })?;
        let updated =
            GameRepository::set_result(tx, scope, score.game_id, score.result_a, score.result_b)
                .await?;
        if !updated {
            return Err(StorageError::InvalidScore {
                game_id: score.game_id,
                reason: format!("game is not part of {scope}"),
            });
        }
    }
    Ok(())
}

/// Records the results of a playing day and finishes it (and its league,
/// once every playing day is finished). Standings of the day and of the
/// league are rebuilt and pending games are rated.
pub async fn submit_gameday_results(
    pool: &PgPool,
    gameday_id: Uuid,
    scores: &[GameScore],
    settings: &RatingSettings,
) -> Result<SubmissionOutcome> {
    let scope = Scope::Gameday(gameday_id);
    let gameday = GamedayRepository::find_by_id(pool, gameday_id)
        .await
        .map_err(|e| not_found_as_scope(e, scope))?;

    let mut tx = pool.begin().await?;
    write_scores(&mut tx, scope, &ScoreRules::LEAGUE, scores).await?;
    GamedayRepository::mark_finished(&mut tx, gameday_id).await?;
    let league_finished = LeagueRepository::finish_if_complete(&mut tx, gameday.league_id).await?;
    tx.commit().await?;

    info!(%scope, games = scores.len(), league_finished, "Results submitted");

    let day = standings::recompute(pool, scope).await?;
    standings::recompute(pool, Scope::League(gameday.league_id)).await?;
    let ratings = rating::apply_pending_matches(pool, settings).await?;

    Ok(SubmissionOutcome {
        standings: day.rows,
        winners: day.winners,
        ratings,
    })
}

/// Records the results of an event, finishes it, rebuilds its table and
/// rates pending games.
pub async fn submit_event_results(
    pool: &PgPool,
    event_id: Uuid,
    scores: &[GameScore],
    settings: &RatingSettings,
) -> Result<SubmissionOutcome> {
    let scope = Scope::Event(event_id);
    let event = EventRepository::find_by_id(pool, event_id)
        .await
        .map_err(|e| not_found_as_scope(e, scope))?;

    let mut tx = pool.begin().await?;
    write_scores(&mut tx, scope, &event.score_rules(), scores).await?;
    EventRepository::mark_finished(&mut tx, event_id).await?;
    tx.commit().await?;

    info!(%scope, games = scores.len(), "Results submitted");

    let table = standings::recompute(pool, scope).await?;
    let ratings = rating::apply_pending_matches(pool, settings).await?;

    Ok(SubmissionOutcome {
        standings: table.rows,
        winners: table.winners,
        ratings,
    })
}
