use sqlx::{PgExecutor, Postgres, QueryBuilder, Transaction};

use crate::error::Result;
use crate::models::{Scope, StandingsRow};

pub struct StandingsRepository;

impl StandingsRepository {
    /// Stored table of a scope, best first.
    pub async fn list<'e, E>(executor: E, scope: Scope) -> Result<Vec<StandingsRow>>
    where
        E: PgExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, StandingsRow>(
            r#"
            SELECT scope_kind, scope_id, player_id, position, points, wins, draws, losses,
                   games_played, games_for, games_against, games_diff, ranking
            FROM standings
            WHERE scope_kind = $1 AND scope_id = $2
            ORDER BY position, player_id
            "#,
        )
        .bind(scope.kind().as_str())
        .bind(scope.id())
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Serializes writers of one scope until the transaction ends.
    pub async fn lock_scope(tx: &mut Transaction<'_, Postgres>, scope: Scope) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(scope.lock_key())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Swaps the scope's table for `rows`.
    pub async fn replace(
        tx: &mut Transaction<'_, Postgres>,
        scope: Scope,
        rows: &[StandingsRow],
    ) -> Result<()> {
        sqlx::query("DELETE FROM standings WHERE scope_kind = $1 AND scope_id = $2")
            .bind(scope.kind().as_str())
            .bind(scope.id())
            .execute(&mut **tx)
            .await?;

        if rows.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            INSERT INTO standings (
                scope_kind, scope_id, player_id, position, points, wins, draws, losses,
                games_played, games_for, games_against, games_diff, ranking
            )
            "#,
        );
        query.push_values(rows, |mut b, row| {
            b.push_bind(scope.kind().as_str())
                .push_bind(scope.id())
                .push_bind(row.player_id)
                .push_bind(row.position)
                .push_bind(row.points)
                .push_bind(row.wins)
                .push_bind(row.draws)
                .push_bind(row.losses)
                .push_bind(row.games_played)
                .push_bind(row.games_for)
                .push_bind(row.games_against)
                .push_bind(row.games_diff)
                .push_bind(row.ranking);
        });
        query.build().execute(&mut **tx).await?;

        Ok(())
    }
}
