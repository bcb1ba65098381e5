use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Scope, StandingsRow};
use crate::repository::event::EventRepository;
use crate::repository::gameday::GamedayRepository;
use crate::repository::league::LeagueRepository;
use crate::repository::standings::StandingsRepository;

/// The two winners of a scope. Both ids are equal when the table has a
/// single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Winners {
    pub winner1_id: Uuid,
    pub winner2_id: Uuid,
}

/// Takes the two best rows of the table; of those, the lower id is
/// `winner1` and the higher id is `winner2`.
pub fn resolve_winners(rows: &[StandingsRow]) -> Option<Winners> {
    let mut top: Vec<&StandingsRow> = rows.iter().collect();
    top.sort_by(|x, y| {
        y.ranking
            .total_cmp(&x.ranking)
            .then_with(|| x.position.cmp(&y.position))
    });
    top.truncate(2);

    let winner1_id = top.iter().map(|r| r.player_id).min()?;
    let winner2_id = top.iter().map(|r| r.player_id).max()?;
    Some(Winners {
        winner1_id,
        winner2_id,
    })
}

/// Writes `winners` onto the scope's own record; `None` clears them.
pub async fn record(
    tx: &mut Transaction<'_, Postgres>,
    scope: Scope,
    winners: Option<Winners>,
) -> Result<()> {
    let (w1, w2) = match winners {
        Some(w) => (Some(w.winner1_id), Some(w.winner2_id)),
        None => (None, None),
    };

    match scope {
        Scope::Gameday(id) => GamedayRepository::set_winners(tx, id, w1, w2).await?,
        Scope::League(id) => LeagueRepository::set_winners(tx, id, w1, w2).await?,
        Scope::Event(id) => EventRepository::set_winners(tx, id, w1, w2).await?,
    }

    Ok(())
}

/// Re-derives the winners of `scope` from its stored table. The table is
/// read under the scope lock, so a concurrent recomputation is either fully
/// seen or not at all.
pub async fn resolve(pool: &PgPool, scope: Scope) -> Result<Option<Winners>> {
    let mut tx = pool.begin().await?;
    StandingsRepository::lock_scope(&mut tx, scope).await?;
    let rows = StandingsRepository::list(&mut *tx, scope).await?;
    let winners = resolve_winners(&rows);
    record(&mut tx, scope, winners).await?;
    tx.commit().await?;

    info!(%scope, ?winners, "Winners recorded");
    Ok(winners)
}
