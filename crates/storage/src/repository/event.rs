use sqlx::{PgExecutor, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Event, EventRegistration};
use crate::repository::gameday::collect_bindings;
use crate::services::fixtures::TeamBindings;

pub struct EventRepository;

impl EventRepository {
    pub async fn find_by_id<'e, E>(executor: E, event_id: Uuid) -> Result<Event>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT event_id, title, status, event_date, start_time, team_count,
                   presence_points, max_points, allow_draws, allow_overtime,
                   warm_up_minutes, minutes_per_game, minutes_between_games, elo_k,
                   winner1_id, winner2_id, created_at
            FROM events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(executor)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn court_ids<'e, E>(executor: E, event_id: Uuid) -> Result<Vec<Uuid>>
    where
        E: PgExecutor<'e>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT court_id
            FROM event_courts
            WHERE event_id = $1
            ORDER BY display_order, court_id
            "#,
        )
        .bind(event_id)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    pub async fn registrations<'e, E>(executor: E, event_id: Uuid) -> Result<Vec<EventRegistration>>
    where
        E: PgExecutor<'e>,
    {
        let registrations = sqlx::query_as::<_, EventRegistration>(
            r#"
            SELECT event_id, player_id, is_substitute, team
            FROM event_registrations
            WHERE event_id = $1
            ORDER BY registered_at, player_id
            "#,
        )
        .bind(event_id)
        .fetch_all(executor)
        .await?;

        Ok(registrations)
    }

    pub async fn team_bindings(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
    ) -> Result<TeamBindings> {
        let rows = sqlx::query_as::<_, (Uuid, Option<String>)>(
            r#"
            SELECT player_id, team
            FROM event_registrations
            WHERE event_id = $1 AND team IS NOT NULL
            ORDER BY team, registered_at, player_id
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(collect_bindings(rows))
    }

    pub async fn set_teams(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        bindings: &TeamBindings,
    ) -> Result<()> {
        sqlx::query("UPDATE event_registrations SET team = NULL WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;

        for (slot, pair) in bindings {
            for player_id in pair {
                sqlx::query(
                    r#"
                    INSERT INTO event_registrations (event_id, player_id, team)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (event_id, player_id)
                    DO UPDATE SET team = EXCLUDED.team, is_substitute = FALSE
                    "#,
                )
                .bind(event_id)
                .bind(player_id)
                .bind(slot.to_string())
                .execute(&mut **tx)
                .await?;
            }
        }

        Ok(())
    }

    pub async fn set_winners(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        winner1_id: Option<Uuid>,
        winner2_id: Option<Uuid>,
    ) -> Result<()> {
        sqlx::query("UPDATE events SET winner1_id = $2, winner2_id = $3 WHERE event_id = $1")
            .bind(event_id)
            .bind(winner1_id)
            .bind(winner2_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn mark_finished(tx: &mut Transaction<'_, Postgres>, event_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE events SET status = 'finished' WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
