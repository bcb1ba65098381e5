use sqlx::{PgExecutor, Postgres, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Game, Scope};
use crate::services::fixtures::{Fixture, TeamBindings};

const GAME_COLUMNS: &str = r#"
    game_id, league_id, gameday_id, event_id, game_date, start_time, end_time,
    court_id, round, slot, team_a, team_b,
    player_a1_id, player_a2_id, player_b1_id, player_b2_id, result_a, result_b
"#;

/// Who a newly scheduled game belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOwner {
    Gameday { league_id: Uuid, gameday_id: Uuid },
    Event { event_id: Uuid },
}

fn scope_column(scope: Scope) -> &'static str {
    match scope {
        Scope::Gameday(_) => "gameday_id",
        Scope::League(_) => "league_id",
        Scope::Event(_) => "event_id",
    }
}

pub struct GameRepository;

impl GameRepository {
    /// Games of the scope in playing order.
    pub async fn list_for_scope<'e, E>(executor: E, scope: Scope) -> Result<Vec<Game>>
    where
        E: PgExecutor<'e>,
    {
        let games = sqlx::query_as::<_, Game>(&format!(
            r#"
            SELECT {GAME_COLUMNS}
            FROM games
            WHERE {} = $1
            ORDER BY game_date, start_time, slot, team_a, game_id
            "#,
            scope_column(scope)
        ))
        .bind(scope.id())
        .fetch_all(executor)
        .await?;

        Ok(games)
    }

    /// Whether any game of the scope carries a real score.
    pub async fn has_results(tx: &mut Transaction<'_, Postgres>, scope: Scope) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(&format!(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM games
                WHERE {} = $1
                  AND result_a IS NOT NULL AND result_b IS NOT NULL
                  AND NOT (result_a = 0 AND result_b = 0)
            )
            "#,
            scope_column(scope)
        ))
        .bind(scope.id())
        .fetch_one(&mut **tx)
        .await?;

        Ok(exists)
    }

    pub async fn delete_for_scope(tx: &mut Transaction<'_, Postgres>, scope: Scope) -> Result<u64> {
        let result = sqlx::query(&format!(
            "DELETE FROM games WHERE {} = $1",
            scope_column(scope)
        ))
        .bind(scope.id())
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// Inserts the fixtures without scores, filling in players for the team
    /// letters present in `bindings`.
    pub async fn insert_fixtures(
        tx: &mut Transaction<'_, Postgres>,
        owner: GameOwner,
        fixtures: &[Fixture],
        bindings: &TeamBindings,
    ) -> Result<Vec<Game>> {
        let (league_id, gameday_id, event_id) = match owner {
            GameOwner::Gameday {
                league_id,
                gameday_id,
            } => (Some(league_id), Some(gameday_id), None),
            GameOwner::Event { event_id } => (None, None, Some(event_id)),
        };

        let mut games = Vec::with_capacity(fixtures.len());
        for fixture in fixtures {
            let side_a = bindings.get(&fixture.team_a);
            let side_b = bindings.get(&fixture.team_b);

            let game = sqlx::query_as::<_, Game>(&format!(
                r#"
                INSERT INTO games (
                    league_id, gameday_id, event_id, game_date, start_time, end_time,
                    court_id, round, slot, team_a, team_b,
                    player_a1_id, player_a2_id, player_b1_id, player_b2_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                RETURNING {GAME_COLUMNS}
                "#
            ))
            .bind(league_id)
            .bind(gameday_id)
            .bind(event_id)
            .bind(fixture.start.date())
            .bind(fixture.start.time())
            .bind(fixture.end.time())
            .bind(fixture.court_id)
            .bind(fixture.round as i32)
            .bind(fixture.slot as i32)
            .bind(fixture.team_a.to_string())
            .bind(fixture.team_b.to_string())
            .bind(side_a.map(|p| p[0]))
            .bind(side_a.map(|p| p[1]))
            .bind(side_b.map(|p| p[0]))
            .bind(side_b.map(|p| p[1]))
            .fetch_one(&mut **tx)
            .await?;

            games.push(game);
        }

        Ok(games)
    }

    /// Rewrites the players of every game of the scope from the team
    /// letters. Letters missing from `bindings` are left empty.
    pub async fn bind_teams(
        tx: &mut Transaction<'_, Postgres>,
        scope: Scope,
        bindings: &TeamBindings,
    ) -> Result<()> {
        let column = scope_column(scope);
        sqlx::query(&format!(
            r#"
            UPDATE games
            SET player_a1_id = NULL, player_a2_id = NULL,
                player_b1_id = NULL, player_b2_id = NULL
            WHERE {column} = $1
            "#
        ))
        .bind(scope.id())
        .execute(&mut **tx)
        .await?;

        for (slot, pair) in bindings {
            for (side, team_column) in [("a", "team_a"), ("b", "team_b")] {
                sqlx::query(&format!(
                    r#"
                    UPDATE games
                    SET player_{side}1_id = $3, player_{side}2_id = $4
                    WHERE {column} = $1 AND {team_column} = $2
                    "#
                ))
                .bind(scope.id())
                .bind(slot.to_string())
                .bind(pair[0])
                .bind(pair[1])
                .execute(&mut **tx)
                .await?;
            }
        }

        Ok(())
    }

    /// Stores a score. Returns `false` when the game is not part of `scope`.
    pub async fn set_result(
        tx: &mut Transaction<'_, Postgres>,
        scope: Scope,
        game_id: Uuid,
        result_a: i32,
        result_b: i32,
    ) -> Result<bool> {
        let result = sqlx::query(&format!(
            "UPDATE games SET result_a = $3, result_b = $4 WHERE game_id = $2 AND {} = $1",
            scope_column(scope)
        ))
        .bind(scope.id())
        .bind(game_id)
        .bind(result_a)
        .bind(result_b)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
