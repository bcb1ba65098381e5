use std::time::Duration;

use storage::services::rating;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::AppState;

/// Runs the rating sweep every `every`. Errors are logged and the loop keeps
/// going.
pub fn spawn_rating_sweep(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = rating::apply_pending_matches(state.db.pool(), &state.rating).await {
                tracing::error!("Periodic rating sweep failed: {}", e);
            }
        }
    })
}
