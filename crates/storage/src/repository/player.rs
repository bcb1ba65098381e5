use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Player;

pub struct PlayerRepository;

impl PlayerRepository {
    pub async fn find_by_id<'e, E>(executor: E, player_id: Uuid) -> Result<Player>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Player>(
            r#"
            SELECT player_id, name, birth_date, is_player, created_at
            FROM players
            WHERE player_id = $1
            "#,
        )
        .bind(player_id)
        .fetch_optional(executor)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Players among `ids`; unknown ids are silently left out.
    pub async fn find_many<'e, E>(executor: E, ids: &[Uuid]) -> Result<Vec<Player>>
    where
        E: PgExecutor<'e>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT player_id, name, birth_date, is_player, created_at
            FROM players
            WHERE player_id = ANY($1)
            ORDER BY player_id
            "#,
        )
        .bind(ids)
        .fetch_all(executor)
        .await?;

        Ok(players)
    }
}
