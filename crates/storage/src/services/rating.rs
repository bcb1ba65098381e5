//! Elo-style doubles rating.
//!
//! Every scored game of an eligible competition is rated exactly once, in
//! chronological order. Each of the four players is compared individually
//! against the opposing team's average rating. The history table doubles as
//! the dedup ledger: a game with history rows is never picked up again.
//!
//! Sweeps and full recalculations hold a session-level advisory lock so only
//! one of them runs at a time.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::pool::PoolConnection;
use sqlx::{Connection, FromRow, PgConnection, PgPool, Postgres};
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{RatingHistoryEntry, RatingProfile};
use crate::repository::rating::RatingRepository;

pub const INITIAL_RATING: f64 = 1000.0;

/// Engine-wide rating settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSettings {
    /// Competitions starting before this date are never rated.
    pub epoch: NaiveDate,
    pub initial_rating: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            epoch: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            initial_rating: INITIAL_RATING,
        }
    }
}

/// Expected score of a player rated `rating` against a team averaging
/// `opponent_average`.
pub fn expected_score(rating: f64, opponent_average: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent_average - rating) / 400.0))
}

/// A scored game waiting to be rated, with its competition's K-factor.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RatableGame {
    pub game_id: Uuid,
    pub game_date: NaiveDate,
    pub start_time: NaiveTime,
    pub player_a1_id: Uuid,
    pub player_a2_id: Uuid,
    pub player_b1_id: Uuid,
    pub player_b2_id: Uuid,
    pub result_a: i32,
    pub result_b: i32,
    pub elo_k: i32,
}

impl RatableGame {
    /// The four players as `[a1, a2, b1, b2]`.
    pub fn players(&self) -> [Uuid; 4] {
        [
            self.player_a1_id,
            self.player_a2_id,
            self.player_b1_id,
            self.player_b2_id,
        ]
    }

    pub fn has_distinct_players(&self) -> bool {
        let p = self.players();
        (0..4).all(|i| (i + 1..4).all(|j| p[i] != p[j]))
    }

    pub fn is_tie(&self) -> bool {
        self.result_a == self.result_b
    }
}

/// Profiles after a game, plus the four history entries describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedGame {
    pub profiles: [RatingProfile; 4],
    pub history: [RatingHistoryEntry; 4],
}

/// Applies one game to the players' current profiles, given in
/// `[a1, a2, b1, b2]` order.
///
/// A tied game changes nothing but still produces history entries (with
/// equal before and after ratings) so that it is not picked up again.
pub fn rate_game(game: &RatableGame, current: [RatingProfile; 4]) -> RatedGame {
    let ids = game.players();
    let before: [f64; 4] = [
        current[0].rating,
        current[1].rating,
        current[2].rating,
        current[3].rating,
    ];
    let avg_a = (before[0] + before[1]) / 2.0;
    let avg_b = (before[2] + before[3]) / 2.0;
    let k = game.elo_k as f64;
    let a_won = game.result_a > game.result_b;

    let mut profiles = current;
    if !game.is_tie() {
        for (i, profile) in profiles.iter_mut().enumerate() {
            let on_a = i < 2;
            let opponent_average = if on_a { avg_b } else { avg_a };
            let actual = if on_a == a_won { 1.0 } else { 0.0 };
            profile.rating += k * (actual - expected_score(before[i], opponent_average));
            if actual > 0.0 {
                profile.wins += 1;
            } else {
                profile.losses += 1;
            }
            profile.games_played += 1;
        }
    }

    let history = std::array::from_fn(|i| {
        let on_a = i < 2;
        let teammate = ids[i ^ 1];
        let (opponent1, opponent2) = if on_a { (ids[2], ids[3]) } else { (ids[0], ids[1]) };
        RatingHistoryEntry {
            game_id: game.game_id,
            player_id: ids[i],
            game_date: game.game_date,
            start_time: game.start_time,
            teammate_id: teammate,
            opponent1_id: opponent1,
            opponent2_id: opponent2,
            result_a: game.result_a,
            result_b: game.result_b,
            rating_before: before[i],
            rating_after: profiles[i].rating,
        }
    });

    RatedGame { profiles, history }
}

/// In-memory set of profiles used to replay games.
#[derive(Debug, Clone)]
pub struct RatingLedger {
    initial_rating: f64,
    profiles: BTreeMap<Uuid, RatingProfile>,
}

impl RatingLedger {
    pub fn new(initial_rating: f64) -> Self {
        Self {
            initial_rating,
            profiles: BTreeMap::new(),
        }
    }

    /// Ledger resuming from previously stored profiles.
    pub fn with_profiles(
        initial_rating: f64,
        profiles: impl IntoIterator<Item = RatingProfile>,
    ) -> Self {
        Self {
            initial_rating,
            profiles: profiles.into_iter().map(|p| (p.player_id, p)).collect(),
        }
    }

    /// Creates a fresh profile for every id that has none yet.
    pub fn seed(&mut self, player_ids: impl IntoIterator<Item = Uuid>) {
        for id in player_ids {
            self.profiles
                .entry(id)
                .or_insert_with(|| RatingProfile::seeded(id, self.initial_rating));
        }
    }

    pub fn profile(&self, player_id: Uuid) -> RatingProfile {
        self.profiles
            .get(&player_id)
            .cloned()
            .unwrap_or_else(|| RatingProfile::seeded(player_id, self.initial_rating))
    }

    /// Rates `game` and stores the updated profiles. `None` when the game
    /// does not have four distinct players.
    pub fn apply(&mut self, game: &RatableGame) -> Option<RatedGame> {
        if !game.has_distinct_players() {
            return None;
        }
        let current = game.players().map(|id| self.profile(id));
        let rated = rate_game(game, current);
        for profile in &rated.profiles {
            self.profiles.insert(profile.player_id, profile.clone());
        }
        Some(rated)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn into_profiles(self) -> Vec<RatingProfile> {
        self.profiles.into_values().collect()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SweepReport {
    /// Games that changed ratings.
    pub rated: usize,
    /// Tied games recorded without a rating change.
    pub tied: usize,
}

impl SweepReport {
    fn count(&mut self, game: &RatableGame) {
        if game.is_tie() {
            self.tied += 1;
        } else {
            self.rated += 1;
        }
    }
}

/// Rates every pending game, oldest first. Each game commits on its own, so
/// a failure leaves earlier games rated and the failing one untouched.
pub async fn apply_pending_matches(pool: &PgPool, settings: &RatingSettings) -> Result<SweepReport> {
    let mut conn = pool.acquire().await?;
    RatingRepository::lock(&mut conn).await?;
    let result = sweep(&mut conn, settings).await;
    release(&mut conn).await?;
    let report = result?;

    info!(
        rated = report.rated,
        tied = report.tied,
        "Rating sweep finished"
    );
    Ok(report)
}

async fn sweep(conn: &mut PgConnection, settings: &RatingSettings) -> Result<SweepReport> {
    let pending = RatingRepository::pending_games(conn, settings.epoch).await?;
    let mut report = SweepReport::default();

    for game in &pending {
        let mut tx = conn.begin().await?;
        let stored = RatingRepository::profiles(&mut tx, &game.players()).await?;
        let current = game.players().map(|id| {
            stored
                .iter()
                .find(|p| p.player_id == id)
                .cloned()
                .unwrap_or_else(|| RatingProfile::seeded(id, settings.initial_rating))
        });
        let rated = rate_game(game, current);
        RatingRepository::upsert_profiles(&mut tx, &rated.profiles).await?;
        RatingRepository::insert_history(&mut tx, &rated.history).await?;
        tx.commit().await?;

        debug!(game_id = %game.game_id, tie = game.is_tie(), "Game rated");
        report.count(game);
    }

    Ok(report)
}

/// Throws away all profiles and history and replays every eligible game
/// from a fresh baseline, in one transaction.
pub async fn full_recalculate(pool: &PgPool, settings: &RatingSettings) -> Result<SweepReport> {
    let mut conn = pool.acquire().await?;
    RatingRepository::lock(&mut conn).await?;
    let result = replay(&mut conn, settings).await;
    release(&mut conn).await?;
    let report = result?;

    info!(
        rated = report.rated,
        tied = report.tied,
        "Ratings recalculated"
    );
    Ok(report)
}

async fn replay(conn: &mut PgConnection, settings: &RatingSettings) -> Result<SweepReport> {
    let mut tx = conn.begin().await?;
    RatingRepository::delete_all(&mut tx).await?;

    let mut ledger = RatingLedger::new(settings.initial_rating);
    ledger.seed(RatingRepository::player_ids(&mut tx).await?);

    let games = RatingRepository::pending_games(&mut tx, settings.epoch).await?;
    let mut report = SweepReport::default();
    let mut history = Vec::with_capacity(games.len() * 4);
    for game in &games {
        if let Some(rated) = ledger.apply(game) {
            history.extend(rated.history);
            report.count(game);
        }
    }

    RatingRepository::upsert_profiles(&mut tx, &ledger.into_profiles()).await?;
    RatingRepository::insert_history(&mut tx, &history).await?;
    tx.commit().await?;

    Ok(report)
}

async fn release(conn: &mut PoolConnection<Postgres>) -> Result<()> {
    if let Err(e) = RatingRepository::unlock(conn).await {
        // Closing the session is the only other way to drop the lock.
        conn.close_on_drop();
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn game(n: u32, players: [u128; 4], score: (i32, i32), k: i32) -> RatableGame {
        RatableGame {
            game_id: Uuid::from_u128(1000 + n as u128),
            game_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap() + chrono::Duration::minutes(n as i64),
            player_a1_id: id(players[0]),
            player_a2_id: id(players[1]),
            player_b1_id: id(players[2]),
            player_b2_id: id(players[3]),
            result_a: score.0,
            result_b: score.1,
            elo_k: k,
        }
    }

    #[test]
    fn test_expected_score_is_symmetric() {
        assert_eq!(expected_score(1000.0, 1000.0), 0.5);
        let e = expected_score(1100.0, 1000.0);
        assert!((e + expected_score(1000.0, 1100.0) - 1.0).abs() < 1e-12);
        assert!(e > 0.5);
    }

    #[test]
    fn test_even_teams_move_by_half_k() {
        let mut ledger = RatingLedger::new(INITIAL_RATING);
        let rated = ledger.apply(&game(1, [1, 2, 3, 4], (6, 2), 20)).unwrap();

        let ratings: Vec<f64> = rated.profiles.iter().map(|p| p.rating).collect();
        assert_eq!(ratings, vec![1010.0, 1010.0, 990.0, 990.0]);
        assert_eq!(rated.profiles[0].wins, 1);
        assert_eq!(rated.profiles[2].losses, 1);
        assert!(rated.profiles.iter().all(|p| p.games_played == 1));
    }

    #[test]
    fn test_each_player_is_compared_to_the_opposing_average() {
        let mut ledger = RatingLedger::new(INITIAL_RATING);
        ledger.profiles.insert(id(1), RatingProfile::seeded(id(1), 1100.0));
        ledger.profiles.insert(id(2), RatingProfile::seeded(id(2), 900.0));

        let rated = ledger.apply(&game(1, [1, 2, 3, 4], (6, 4), 32)).unwrap();
        let strong = rated.profiles[0].rating - 1100.0;
        let weak = rated.profiles[1].rating - 900.0;
        assert!((strong - 32.0 * (1.0 - expected_score(1100.0, 1000.0))).abs() < 1e-9);
        assert!(weak > strong);
    }

    #[test]
    fn test_history_from_each_players_perspective() {
        let rated = rate_game(
            &game(1, [1, 2, 3, 4], (6, 3), 20),
            [1, 2, 3, 4].map(|n| RatingProfile::seeded(id(n), INITIAL_RATING)),
        );
        let b1 = &rated.history[2];
        assert_eq!(b1.player_id, id(3));
        assert_eq!(b1.teammate_id, id(4));
        assert_eq!((b1.opponent1_id, b1.opponent2_id), (id(1), id(2)));
        assert_eq!((b1.result_a, b1.result_b), (6, 3));
        assert_eq!(b1.rating_before, 1000.0);
        assert_eq!(b1.rating_after, 990.0);
        assert_eq!(rated.history[1].teammate_id, id(1));
    }

    #[test]
    fn test_tie_is_recorded_without_rating_change() {
        let mut ledger = RatingLedger::new(INITIAL_RATING);
        let rated = ledger.apply(&game(1, [1, 2, 3, 4], (5, 5), 20)).unwrap();
        assert_eq!(rated.history.len(), 4);
        for (profile, entry) in rated.profiles.iter().zip(&rated.history) {
            assert_eq!(profile.rating, INITIAL_RATING);
            assert_eq!(profile.games_played, 0);
            assert_eq!(entry.rating_before, entry.rating_after);
        }
    }

    #[test]
    fn test_repeated_player_is_not_rated() {
        let mut ledger = RatingLedger::new(INITIAL_RATING);
        assert!(ledger.apply(&game(1, [1, 2, 1, 4], (6, 2), 20)).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_rating_is_path_dependent_but_replay_is_exact() {
        let games = vec![
            game(1, [1, 2, 3, 4], (6, 2), 20),
            game(2, [1, 3, 2, 4], (3, 6), 20),
            game(3, [4, 1, 2, 3], (6, 5), 32),
            game(4, [2, 3, 1, 4], (6, 0), 32),
        ];

        let mut first = RatingLedger::new(INITIAL_RATING);
        let mut second = RatingLedger::new(INITIAL_RATING);
        for g in &games {
            first.apply(g);
        }
        for g in &games {
            second.apply(g);
        }
        assert_eq!(first.clone().into_profiles(), second.into_profiles());

        let mut reversed = RatingLedger::new(INITIAL_RATING);
        for g in games.iter().rev() {
            reversed.apply(g);
        }
        assert_ne!(first.into_profiles(), reversed.into_profiles());
    }

    #[test]
    fn test_seeded_players_keep_initial_rating() {
        let mut ledger = RatingLedger::new(INITIAL_RATING);
        ledger.seed([id(1), id(9)]);
        ledger.apply(&game(1, [1, 2, 3, 4], (6, 2), 20));
        assert_eq!(ledger.len(), 5);
        assert_eq!(ledger.profile(id(9)).rating, INITIAL_RATING);
        assert_eq!(ledger.profile(id(1)).rating, 1010.0);
    }
}
