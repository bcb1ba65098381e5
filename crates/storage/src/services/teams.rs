//! Drawing doubles teams for a playing day or an event.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{MAX_TEAMS, Player, Scope, TeamSlot};
use crate::repository::event::EventRepository;
use crate::repository::game::GameRepository;
use crate::repository::gameday::GamedayRepository;
use crate::repository::league::LeagueRepository;
use crate::repository::player::PlayerRepository;
use crate::repository::standings::StandingsRepository;
use crate::services::fixtures::{MIN_TEAMS, TeamBindings, not_found_as_scope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TeamMode {
    /// Strongest participant paired with the weakest, by league standing.
    Ranking,
    Random,
    /// Consecutive pairs in the order given.
    Manual,
}

/// Splits `participants` into `team_count` pairs, team `A` first.
///
/// `seeds` is only read in [`TeamMode::Ranking`]; missing entries count as 0.
pub fn assign_teams<R: Rng + ?Sized>(
    mode: TeamMode,
    participants: &[Uuid],
    team_count: i32,
    seeds: &HashMap<Uuid, f64>,
    rng: &mut R,
) -> Result<TeamBindings> {
    if !(MIN_TEAMS..=MAX_TEAMS as i32).contains(&team_count) {
        return Err(StorageError::UnsupportedRosterSize(team_count));
    }
    let needed = team_count as usize * 2;
    if participants.len() != needed {
        return Err(StorageError::InvalidTeamAssignment(format!(
            "{} teams need {} participants, got {}",
            team_count,
            needed,
            participants.len()
        )));
    }
    let unique: HashSet<&Uuid> = participants.iter().collect();
    if unique.len() != participants.len() {
        return Err(StorageError::InvalidTeamAssignment(
            "a participant is listed twice".to_string(),
        ));
    }

    let mut order = participants.to_vec();
    let pairs: Vec<[Uuid; 2]> = match mode {
        TeamMode::Manual => order.chunks(2).map(|c| [c[0], c[1]]).collect(),
        TeamMode::Ranking | TeamMode::Random => {
            if mode == TeamMode::Ranking {
                let seed = |id: &Uuid| seeds.get(id).copied().unwrap_or(0.0);
                order.sort_by(|x, y| seed(y).total_cmp(&seed(x)).then_with(|| x.cmp(y)));
            } else {
                order.shuffle(rng);
            }
            (0..team_count as usize)
                .map(|i| [order[i], order[needed - 1 - i]])
                .collect()
        }
    };

    Ok(pairs
        .into_iter()
        .enumerate()
        .filter_map(|(i, pair)| TeamSlot::from_index(i).map(|slot| (slot, pair)))
        .collect())
}

/// Ranking seeds from the league table: `ranking * 100`, or `age / 100` for
/// participants without a row. `None` when the league has no table yet.
async fn league_seeds(
    pool: &PgPool,
    league_id: Uuid,
    participants: &[Uuid],
) -> Result<Option<HashMap<Uuid, f64>>> {
    let rows = StandingsRepository::list(pool, Scope::League(league_id)).await?;
    if rows.is_empty() {
        return Ok(None);
    }

    let ranked: HashMap<Uuid, f64> = rows.iter().map(|r| (r.player_id, r.ranking)).collect();
    let today = Utc::now().date_naive();
    let players: HashMap<Uuid, Player> = PlayerRepository::find_many(pool, participants)
        .await?
        .into_iter()
        .map(|p| (p.player_id, p))
        .collect();

    let seeds = participants
        .iter()
        .map(|id| {
            let seed = match ranked.get(id) {
                Some(ranking) if *ranking != 0.0 => ranking * 100.0,
                _ => players
                    .get(id)
                    .map(|p| p.age_on(today) as f64 / 100.0)
                    .unwrap_or(0.0),
            };
            (*id, seed)
        })
        .collect();

    Ok(Some(seeds))
}

/// Draws the teams of a playing day and binds them into its games.
///
/// An empty `participants` list means everyone registered for the day.
pub async fn assign_gameday_teams(
    pool: &PgPool,
    gameday_id: Uuid,
    mode: TeamMode,
    participants: &[Uuid],
) -> Result<TeamBindings> {
    let scope = Scope::Gameday(gameday_id);
    let gameday = GamedayRepository::find_by_id(pool, gameday_id)
        .await
        .map_err(|e| not_found_as_scope(e, scope))?;
    let league = LeagueRepository::find_by_id(pool, gameday.league_id).await?;

    let participants = if participants.is_empty() {
        GamedayRepository::players(pool, gameday_id)
            .await?
            .into_iter()
            .map(|p| p.player_id)
            .collect()
    } else {
        participants.to_vec()
    };

    let (mode, seeds) = match mode {
        TeamMode::Ranking => match league_seeds(pool, league.league_id, &participants).await? {
            Some(seeds) => (TeamMode::Ranking, seeds),
            None => (TeamMode::Random, HashMap::new()),
        },
        other => (other, HashMap::new()),
    };
    let bindings = assign_teams(
        mode,
        &participants,
        league.team_count,
        &seeds,
        &mut rand::rng(),
    )?;

    let mut tx = pool.begin().await?;
    if GameRepository::has_results(&mut tx, scope).await? {
        return Err(StorageError::ScheduleLocked(scope));
    }
    GamedayRepository::set_teams(&mut tx, gameday_id, &bindings).await?;
    GameRepository::bind_teams(&mut tx, scope, &bindings).await?;
    tx.commit().await?;

    info!(%scope, ?mode, teams = bindings.len(), "Teams assigned");
    Ok(bindings)
}

/// Draws the teams of an event. An event has no league table, so
/// [`TeamMode::Ranking`] draws at random.
///
/// An empty `participants` list means every registered non-substitute.
pub async fn assign_event_teams(
    pool: &PgPool,
    event_id: Uuid,
    mode: TeamMode,
    participants: &[Uuid],
) -> Result<TeamBindings> {
    let scope = Scope::Event(event_id);
    let event = EventRepository::find_by_id(pool, event_id)
        .await
        .map_err(|e| not_found_as_scope(e, scope))?;

    let participants = if participants.is_empty() {
        EventRepository::registrations(pool, event_id)
            .await?
            .into_iter()
            .filter(|r| !r.is_substitute)
            .map(|r| r.player_id)
            .collect()
    } else {
        participants.to_vec()
    };

    let mode = match mode {
        TeamMode::Ranking => TeamMode::Random,
        other => other,
    };
    let bindings = assign_teams(
        mode,
        &participants,
        event.team_count,
        &HashMap::new(),
        &mut rand::rng(),
    )?;

    let mut tx = pool.begin().await?;
    if GameRepository::has_results(&mut tx, scope).await? {
        return Err(StorageError::ScheduleLocked(scope));
    }
    EventRepository::set_teams(&mut tx, event_id, &bindings).await?;
    GameRepository::bind_teams(&mut tx, scope, &bindings).await?;
    tx.commit().await?;

    info!(%scope, ?mode, teams = bindings.len(), "Teams assigned");
    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn ids(n: u128) -> Vec<Uuid> {
        (1..=n).map(Uuid::from_u128).collect()
    }

    fn slot(c: &str) -> TeamSlot {
        TeamSlot::parse(c).unwrap()
    }

    #[test]
    fn test_ranking_pairs_best_with_worst() {
        let players = ids(6);
        let seeds: HashMap<Uuid, f64> = players
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, (i as f64 + 1.0) * 10.0))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let teams = assign_teams(TeamMode::Ranking, &players, 3, &seeds, &mut rng).unwrap();

        // Seeds ascend with the id, so 6 is best and 1 is worst.
        assert_eq!(teams[&slot("A")], [Uuid::from_u128(6), Uuid::from_u128(1)]);
        assert_eq!(teams[&slot("B")], [Uuid::from_u128(5), Uuid::from_u128(2)]);
        assert_eq!(teams[&slot("C")], [Uuid::from_u128(4), Uuid::from_u128(3)]);
    }

    #[test]
    fn test_manual_keeps_given_order() {
        let players = ids(4);
        let mut rng = StdRng::seed_from_u64(1);
        let teams = assign_teams(TeamMode::Manual, &players, 2, &HashMap::new(), &mut rng).unwrap();
        assert_eq!(teams[&slot("A")], [Uuid::from_u128(1), Uuid::from_u128(2)]);
        assert_eq!(teams[&slot("B")], [Uuid::from_u128(3), Uuid::from_u128(4)]);
    }

    #[test]
    fn test_random_uses_everyone_once() {
        let players = ids(8);
        let mut rng = StdRng::seed_from_u64(7);
        let teams = assign_teams(TeamMode::Random, &players, 4, &HashMap::new(), &mut rng).unwrap();

        let mut used: Vec<Uuid> = teams.values().flatten().copied().collect();
        used.sort();
        assert_eq!(used, players);
        assert_eq!(teams.len(), 4);
    }

    #[test]
    fn test_random_is_reproducible_with_a_seeded_rng() {
        let players = ids(8);
        let a = assign_teams(TeamMode::Random, &players, 4, &HashMap::new(), &mut StdRng::seed_from_u64(3));
        let b = assign_teams(TeamMode::Random, &players, 4, &HashMap::new(), &mut StdRng::seed_from_u64(3));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_wrong_participant_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = assign_teams(TeamMode::Manual, &ids(5), 3, &HashMap::new(), &mut rng);
        assert!(matches!(result, Err(StorageError::InvalidTeamAssignment(_))));
    }

    #[test]
    fn test_duplicate_participant() {
        let mut players = ids(3);
        players.push(Uuid::from_u128(1));
        let mut rng = StdRng::seed_from_u64(1);
        let result = assign_teams(TeamMode::Manual, &players, 2, &HashMap::new(), &mut rng);
        assert!(matches!(result, Err(StorageError::InvalidTeamAssignment(_))));
    }

    #[test]
    fn test_unsupported_team_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = assign_teams(TeamMode::Manual, &ids(18), 9, &HashMap::new(), &mut rng);
        assert!(matches!(result, Err(StorageError::UnsupportedRosterSize(9))));
    }
}
