use storage::Database;
use storage::services::rating::RatingSettings;

/// Shared by every handler and the background sweep.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub rating: RatingSettings,
}
