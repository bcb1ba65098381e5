use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::rating::RatingStanding;
use crate::error::Result;
use crate::models::{RatingHistoryEntry, RatingProfile, RecordedRatingChange};
use crate::services::rating::RatableGame;

/// Session lock shared by every sweep and recalculation.
const RATING_LOCK_KEY: i64 = 0x5241_5449_4e47;

/// Rows per multi-row INSERT; keeps binds well under the Postgres limit.
const INSERT_CHUNK: usize = 1000;

pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn lock(conn: &mut PgConnection) -> Result<()> {
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(RATING_LOCK_KEY)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn unlock(conn: &mut PgConnection) -> Result<()> {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(RATING_LOCK_KEY)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Scored, unrated games with four distinct players whose competition
    /// has a positive K-factor and starts on or after `epoch`, oldest first.
    pub async fn pending_games(conn: &mut PgConnection, epoch: NaiveDate) -> Result<Vec<RatableGame>> {
        let games = sqlx::query_as::<_, RatableGame>(
            r#"
            SELECT g.game_id, g.game_date, g.start_time,
                   g.player_a1_id, g.player_a2_id, g.player_b1_id, g.player_b2_id,
                   g.result_a, g.result_b,
                   COALESCE(l.elo_k, e.elo_k) AS elo_k
            FROM games g
            LEFT JOIN leagues l ON l.league_id = g.league_id
            LEFT JOIN events e ON e.event_id = g.event_id
            WHERE g.result_a IS NOT NULL AND g.result_b IS NOT NULL
              AND NOT (g.result_a = 0 AND g.result_b = 0)
              AND g.player_a1_id IS NOT NULL AND g.player_a2_id IS NOT NULL
              AND g.player_b1_id IS NOT NULL AND g.player_b2_id IS NOT NULL
              AND g.player_a1_id NOT IN (g.player_a2_id, g.player_b1_id, g.player_b2_id)
              AND g.player_a2_id NOT IN (g.player_b1_id, g.player_b2_id)
              AND g.player_b1_id <> g.player_b2_id
              AND COALESCE(l.elo_k, e.elo_k, 0) > 0
              AND COALESCE(l.start_date, e.event_date) >= $1
              AND NOT EXISTS (SELECT 1 FROM rating_history h WHERE h.game_id = g.game_id)
            ORDER BY g.game_date, g.start_time, g.game_id
            "#,
        )
        .bind(epoch)
        .fetch_all(conn)
        .await?;

        Ok(games)
    }

    /// Stored profiles among `ids`, locked for the rest of the transaction.
    pub async fn profiles(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<RatingProfile>> {
        let profiles = sqlx::query_as::<_, RatingProfile>(
            r#"
            SELECT player_id, rating, wins, losses, games_played
            FROM rating_profiles
            WHERE player_id = ANY($1)
            FOR UPDATE
            "#,
        )
        .bind(ids)
        .fetch_all(conn)
        .await?;

        Ok(profiles)
    }

    pub async fn upsert_profiles(conn: &mut PgConnection, profiles: &[RatingProfile]) -> Result<()> {
        for chunk in profiles.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO rating_profiles (player_id, rating, wins, losses, games_played) ",
            );
            query.push_values(chunk, |mut b, p| {
                b.push_bind(p.player_id)
                    .push_bind(p.rating)
                    .push_bind(p.wins)
                    .push_bind(p.losses)
                    .push_bind(p.games_played);
            });
            query.push(
                r#"
                ON CONFLICT (player_id) DO UPDATE SET
                    rating = EXCLUDED.rating,
                    wins = EXCLUDED.wins,
                    losses = EXCLUDED.losses,
                    games_played = EXCLUDED.games_played,
                    updated_at = CURRENT_TIMESTAMP
                "#,
            );
            query.build().execute(&mut *conn).await?;
        }

        Ok(())
    }

    pub async fn insert_history(conn: &mut PgConnection, entries: &[RatingHistoryEntry]) -> Result<()> {
        for chunk in entries.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Postgres>::new(
                r#"
                INSERT INTO rating_history (
                    game_id, player_id, game_date, start_time, teammate_id,
                    opponent1_id, opponent2_id, result_a, result_b,
                    rating_before, rating_after
                )
                "#,
            );
            query.push_values(chunk, |mut b, e| {
                b.push_bind(e.game_id)
                    .push_bind(e.player_id)
                    .push_bind(e.game_date)
                    .push_bind(e.start_time)
                    .push_bind(e.teammate_id)
                    .push_bind(e.opponent1_id)
                    .push_bind(e.opponent2_id)
                    .push_bind(e.result_a)
                    .push_bind(e.result_b)
                    .push_bind(e.rating_before)
                    .push_bind(e.rating_after);
            });
            query.build().execute(&mut *conn).await?;
        }

        Ok(())
    }

    pub async fn delete_all(conn: &mut PgConnection) -> Result<()> {
        sqlx::query("DELETE FROM rating_history")
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM rating_profiles")
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Every participant flagged as a player.
    pub async fn player_ids(conn: &mut PgConnection) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT player_id FROM players WHERE is_player ORDER BY player_id",
        )
        .fetch_all(conn)
        .await?;

        Ok(ids)
    }

    /// Leaderboard page, best rating first, and the total number of profiles.
    pub async fn leaderboard(&self, limit: i64, offset: i64) -> Result<(Vec<RatingStanding>, i64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rating_profiles")
            .fetch_one(self.pool)
            .await?;

        let entries = sqlx::query_as::<_, RatingStanding>(
            r#"
            SELECT ROW_NUMBER() OVER (ORDER BY r.rating DESC, r.player_id) AS rank,
                   r.player_id, p.name, r.rating, r.wins, r.losses, r.games_played
            FROM rating_profiles r
            INNER JOIN players p ON p.player_id = r.player_id
            ORDER BY r.rating DESC, r.player_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok((entries, total))
    }

    /// A participant's rating changes, newest game first.
    pub async fn history(
        &self,
        player_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RecordedRatingChange>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM rating_history WHERE player_id = $1",
        )
        .bind(player_id)
        .fetch_one(self.pool)
        .await?;

        let entries = sqlx::query_as::<_, RecordedRatingChange>(
            r#"
            SELECT game_id, player_id, game_date, start_time, teammate_id,
                   opponent1_id, opponent2_id, result_a, result_b,
                   rating_before, rating_after, recorded_at
            FROM rating_history
            WHERE player_id = $1
            ORDER BY game_date DESC, start_time DESC, game_id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(player_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok((entries, total))
    }
}
