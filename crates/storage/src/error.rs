use thiserror::Error;
use uuid::Uuid;

use crate::models::Scope;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Unsupported roster size: {0} teams (expected 2 to 8)")]
    UnsupportedRosterSize(i32),

    #[error("Scope not found: {0}")]
    ScopeNotFound(Scope),

    #[error("No courts configured")]
    NoCourts,

    #[error("Invalid score for game {game_id}: {reason}")]
    InvalidScore { game_id: Uuid, reason: String },

    #[error("Invalid team assignment: {0}")]
    InvalidTeamAssignment(String),

    #[error("Schedule for {0} already has results")]
    ScheduleLocked(Scope),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Errors caused by the caller's input rather than by the database.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StorageError::UnsupportedRosterSize(_)
                | StorageError::NoCourts
                | StorageError::InvalidScore { .. }
                | StorageError::InvalidTeamAssignment(_)
        )
    }
}
