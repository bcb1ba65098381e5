use sqlx::PgPool;
use storage::{
    dto::{common::PaginationParams, rating::RatingStanding},
    error::Result,
    models::RecordedRatingChange,
    repository::{player::PlayerRepository, rating::RatingRepository},
    services::rating::{self, RatingSettings, SweepReport},
};
use uuid::Uuid;

pub async fn get_leaderboard(
    pool: &PgPool,
    params: &PaginationParams,
) -> Result<(Vec<RatingStanding>, i64)> {
    RatingRepository::new(pool)
        .leaderboard(params.limit(), params.offset())
        .await
}

/// Rating history of an existing participant
pub async fn get_history(
    pool: &PgPool,
    player_id: Uuid,
    params: &PaginationParams,
) -> Result<(Vec<RecordedRatingChange>, i64)> {
    PlayerRepository::find_by_id(pool, player_id).await?;

    RatingRepository::new(pool)
        .history(player_id, params.limit(), params.offset())
        .await
}

pub async fn sweep(pool: &PgPool, settings: &RatingSettings) -> Result<SweepReport> {
    rating::apply_pending_matches(pool, settings).await
}

pub async fn recalculate(pool: &PgPool, settings: &RatingSettings) -> Result<SweepReport> {
    rating::full_recalculate(pool, settings).await
}
