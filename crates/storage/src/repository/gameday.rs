use sqlx::{PgExecutor, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Gameday, GamedayPlayer, TeamSlot};
use crate::services::fixtures::{PlannedGameday, TeamBindings};

pub struct GamedayRepository;

impl GamedayRepository {
    pub async fn find_by_id<'e, E>(executor: E, gameday_id: Uuid) -> Result<Gameday>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Gameday>(
            r#"
            SELECT gameday_id, league_id, name, game_date, status, winner1_id, winner2_id
            FROM gamedays
            WHERE gameday_id = $1
            "#,
        )
        .bind(gameday_id)
        .fetch_optional(executor)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn players<'e, E>(executor: E, gameday_id: Uuid) -> Result<Vec<GamedayPlayer>>
    where
        E: PgExecutor<'e>,
    {
        let players = sqlx::query_as::<_, GamedayPlayer>(
            r#"
            SELECT gameday_id, player_id, team
            FROM gameday_players
            WHERE gameday_id = $1
            ORDER BY registered_at, player_id
            "#,
        )
        .bind(gameday_id)
        .fetch_all(executor)
        .await?;

        Ok(players)
    }

    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        league_id: Uuid,
        planned: &PlannedGameday,
    ) -> Result<Gameday> {
        let gameday = sqlx::query_as::<_, Gameday>(
            r#"
            INSERT INTO gamedays (league_id, name, game_date)
            VALUES ($1, $2, $3)
            RETURNING gameday_id, league_id, name, game_date, status, winner1_id, winner2_id
            "#,
        )
        .bind(league_id)
        .bind(&planned.name)
        .bind(planned.date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(gameday)
    }

    /// Team letter → participants, for the teams already drawn.
    pub async fn team_bindings(
        tx: &mut Transaction<'_, Postgres>,
        gameday_id: Uuid,
    ) -> Result<TeamBindings> {
        let rows = sqlx::query_as::<_, (Uuid, Option<String>)>(
            r#"
            SELECT player_id, team
            FROM gameday_players
            WHERE gameday_id = $1 AND team IS NOT NULL
            ORDER BY team, registered_at, player_id
            "#,
        )
        .bind(gameday_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(collect_bindings(rows))
    }

    /// Stores the drawn teams, registering participants who were not on the
    /// day's list yet and clearing the team of everyone else.
    pub async fn set_teams(
        tx: &mut Transaction<'_, Postgres>,
        gameday_id: Uuid,
        bindings: &TeamBindings,
    ) -> Result<()> {
        sqlx::query("UPDATE gameday_players SET team = NULL WHERE gameday_id = $1")
            .bind(gameday_id)
            .execute(&mut **tx)
            .await?;

        for (slot, pair) in bindings {
            for player_id in pair {
                sqlx::query(
                    r#"
                    INSERT INTO gameday_players (gameday_id, player_id, team)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (gameday_id, player_id) DO UPDATE SET team = EXCLUDED.team
                    "#,
                )
                .bind(gameday_id)
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
        gameday_id: Uuid,
        winner1_id: Option<Uuid>,
        winner2_id: Option<Uuid>,
    ) -> Result<()> {
        sqlx::query("UPDATE gamedays SET winner1_id = $2, winner2_id = $3 WHERE gameday_id = $1")
            .bind(gameday_id)
            .bind(winner1_id)
            .bind(winner2_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn mark_finished(tx: &mut Transaction<'_, Postgres>, gameday_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE gamedays SET status = 'finished' WHERE gameday_id = $1")
            .bind(gameday_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

/// Groups `(player, team)` rows into complete pairs. Letters with fewer than
/// two participants are left unbound.
pub(crate) fn collect_bindings(rows: Vec<(Uuid, Option<String>)>) -> TeamBindings {
    let mut partial: std::collections::BTreeMap<TeamSlot, Vec<Uuid>> = Default::default();
    for (player_id, team) in rows {
        if let Some(slot) = team.as_deref().and_then(TeamSlot::parse) {
            partial.entry(slot).or_default().push(player_id);
        }
    }

    partial
        .into_iter()
        .filter_map(|(slot, ids)| match ids.as_slice() {
            [first, second, ..] => Some((slot, [*first, *second])),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_bindings_skips_incomplete_teams() {
        let p = |n| Uuid::from_u128(n);
        let rows = vec![
            (p(1), Some("A".to_string())),
            (p(2), Some("a".to_string())),
            (p(3), Some("B".to_string())),
            (p(4), None),
            (p(5), Some("?".to_string())),
        ];
        let bindings = collect_bindings(rows);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[&TeamSlot::parse("A").unwrap()], [p(1), p(2)]);
    }
}
