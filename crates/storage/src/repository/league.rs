use sqlx::{PgExecutor, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::League;

const LEAGUE_COLUMNS: &str = r#"
    league_id, name, status, team_count, presence_points, start_date, start_time,
    warm_up_minutes, minutes_per_game, minutes_between_games, elo_k,
    winner1_id, winner2_id, created_at
"#;

pub struct LeagueRepository;

impl LeagueRepository {
    pub async fn find_by_id<'e, E>(executor: E, league_id: Uuid) -> Result<League>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, League>(&format!(
            "SELECT {LEAGUE_COLUMNS} FROM leagues WHERE league_id = $1"
        ))
        .bind(league_id)
        .fetch_optional(executor)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Courts of the league in display order.
    pub async fn court_ids<'e, E>(executor: E, league_id: Uuid) -> Result<Vec<Uuid>>
    where
        E: PgExecutor<'e>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT court_id
            FROM league_courts
            WHERE league_id = $1
            ORDER BY display_order, court_id
            "#,
        )
        .bind(league_id)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    pub async fn registered_player_ids<'e, E>(executor: E, league_id: Uuid) -> Result<Vec<Uuid>>
    where
        E: PgExecutor<'e>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT player_id FROM league_players WHERE league_id = $1 ORDER BY player_id",
        )
        .bind(league_id)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    pub async fn set_winners(
        tx: &mut Transaction<'_, Postgres>,
        league_id: Uuid,
        winner1_id: Option<Uuid>,
        winner2_id: Option<Uuid>,
    ) -> Result<()> {
        sqlx::query("UPDATE leagues SET winner1_id = $2, winner2_id = $3 WHERE league_id = $1")
            .bind(league_id)
            .bind(winner1_id)
            .bind(winner2_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Marks the league finished when none of its playing days is still
    /// open. Returns whether it is finished now.
    pub async fn finish_if_complete(
        tx: &mut Transaction<'_, Postgres>,
        league_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leagues
            SET status = 'finished'
            WHERE league_id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM gamedays
                  WHERE league_id = $1 AND status <> 'finished'
              )
            "#,
        )
        .bind(league_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
