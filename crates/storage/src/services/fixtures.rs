//! Round-robin schedule generation.
//!
//! Pairings come from the circle method: team 0 stays fixed while the others
//! rotate one seat per round, with a bye seat added for odd rosters. Each
//! round is then laid out on the courts in court-list order; a round with
//! more games than courts is split into consecutive time slots.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Game, Gameday, MAX_TEAMS, Scope, TeamSlot};
use crate::repository::event::EventRepository;
use crate::repository::game::{GameOwner, GameRepository};
use crate::repository::gameday::GamedayRepository;
use crate::repository::league::LeagueRepository;

pub const MIN_TEAMS: i32 = 2;

/// Days between two consecutive playing days of a league.
pub const DAYS_BETWEEN_GAMEDAYS: i64 = 7;

/// Timing parameters shared by every slot of one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTiming {
    /// Scheduled start of the session; the first slot begins after warm-up.
    pub start: NaiveDateTime,
    pub warm_up_minutes: i64,
    pub minutes_per_game: i64,
    pub minutes_between_games: i64,
}

/// One game of a generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Fixture {
    /// Zero-based round of the round-robin.
    pub round: u32,
    /// Zero-based time slot across the whole schedule.
    pub slot: u32,
    pub team_a: TeamSlot,
    pub team_b: TeamSlot,
    pub court_id: Uuid,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Number of games in a complete round-robin of `team_count` teams.
pub fn expected_game_count(team_count: i32) -> usize {
    let n = team_count.max(0) as usize;
    n * n.saturating_sub(1) / 2
}

/// Pairings grouped by round. Within a round no team appears twice.
pub fn round_robin(team_count: i32) -> Result<Vec<Vec<(TeamSlot, TeamSlot)>>> {
    if !(MIN_TEAMS..=MAX_TEAMS as i32).contains(&team_count) {
        return Err(StorageError::UnsupportedRosterSize(team_count));
    }

    let n = team_count as usize;
    let slots: Vec<TeamSlot> = (0..n).filter_map(TeamSlot::from_index).collect();
    // Odd rosters get a phantom seat; whoever faces it sits the round out.
    let seats = n + n % 2;
    let mut ring: Vec<usize> = (0..seats).collect();
    let mut rounds = Vec::with_capacity(seats - 1);

    for round in 0..seats - 1 {
        let mut pairs = Vec::with_capacity(seats / 2);
        for i in 0..seats / 2 {
            let (mut home, mut away) = (ring[i], ring[seats - 1 - i]);
            if home >= n || away >= n {
                continue;
            }
            // Alternate sides for the fixed team so it is not always team A.
            if i == 0 && round % 2 == 1 {
                std::mem::swap(&mut home, &mut away);
            }
            pairs.push((slots[home], slots[away]));
        }
        rounds.push(pairs);
        ring[1..].rotate_right(1);
    }

    Ok(rounds)
}

/// Lays out a full round-robin on the given courts.
pub fn generate(team_count: i32, courts: &[Uuid], timing: &SlotTiming) -> Result<Vec<Fixture>> {
    let rounds = round_robin(team_count)?;
    if courts.is_empty() {
        return Err(StorageError::NoCourts);
    }

    let game_length = Duration::minutes(timing.minutes_per_game);
    let gap = Duration::minutes(timing.minutes_between_games);

    let mut fixtures = Vec::with_capacity(expected_game_count(team_count));
    let mut slot_start = timing.start + Duration::minutes(timing.warm_up_minutes);
    let mut slot = 0u32;

    for (round, pairs) in rounds.iter().enumerate() {
        for wave in pairs.chunks(courts.len()) {
            let mut slot_end = slot_start;
            for (&(team_a, team_b), &court_id) in wave.iter().zip(courts) {
                let end = slot_start + game_length;
                slot_end = slot_end.max(end);
                fixtures.push(Fixture {
                    round: round as u32,
                    slot,
                    team_a,
                    team_b,
                    court_id,
                    start: slot_start,
                    end,
                });
            }
            slot_start = slot_end + gap;
            slot += 1;
        }
    }

    Ok(fixtures)
}

/// A playing day to be created for a league.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGameday {
    pub name: String,
    pub date: NaiveDate,
}

/// Weekly calendar: `count` playing days named "<league> <n>" starting on `start_date`.
pub fn plan_gamedays(league_name: &str, start_date: NaiveDate, count: u32) -> Vec<PlannedGameday> {
    (0..count)
        .map(|i| PlannedGameday {
            name: format!("{} {}", league_name, i + 1),
            date: start_date + Duration::days(DAYS_BETWEEN_GAMEDAYS * i as i64),
        })
        .collect()
}

/// Team letter → the two participants bound to it.
pub type TeamBindings = HashMap<TeamSlot, [Uuid; 2]>;

/// (Re)creates the schedule of a playing day from its league's settings.
///
/// Refuses to touch a day that already has scores. Any teams already drawn
/// for the day are bound into the new games.
pub async fn create_gameday_schedule(pool: &PgPool, gameday_id: Uuid) -> Result<Vec<Game>> {
    let scope = Scope::Gameday(gameday_id);
    let gameday = GamedayRepository::find_by_id(pool, gameday_id)
        .await
        .map_err(|e| not_found_as_scope(e, scope))?;
    let league = LeagueRepository::find_by_id(pool, gameday.league_id).await?;
    let courts = LeagueRepository::court_ids(pool, league.league_id).await?;

    let fixtures = generate(league.team_count, &courts, &league.slot_timing(gameday.game_date))?;

    let mut tx = pool.begin().await?;
    if GameRepository::has_results(&mut tx, scope).await? {
        return Err(StorageError::ScheduleLocked(scope));
    }
    let bindings = GamedayRepository::team_bindings(&mut tx, gameday_id).await?;
    GameRepository::delete_for_scope(&mut tx, scope).await?;
    let games = GameRepository::insert_fixtures(
        &mut tx,
        GameOwner::Gameday {
            league_id: league.league_id,
            gameday_id,
        },
        &fixtures,
        &bindings,
    )
    .await?;
    tx.commit().await?;

    info!(%scope, games = games.len(), "Schedule created");
    Ok(games)
}

/// (Re)creates the schedule of an event.
pub async fn create_event_schedule(pool: &PgPool, event_id: Uuid) -> Result<Vec<Game>> {
    let scope = Scope::Event(event_id);
    let event = EventRepository::find_by_id(pool, event_id)
        .await
        .map_err(|e| not_found_as_scope(e, scope))?;
    let courts = EventRepository::court_ids(pool, event_id).await?;

    let fixtures = generate(event.team_count, &courts, &event.slot_timing())?;

    let mut tx = pool.begin().await?;
    if GameRepository::has_results(&mut tx, scope).await? {
        return Err(StorageError::ScheduleLocked(scope));
    }
    let bindings = EventRepository::team_bindings(&mut tx, event_id).await?;
    GameRepository::delete_for_scope(&mut tx, scope).await?;
    let games = GameRepository::insert_fixtures(
        &mut tx,
        GameOwner::Event { event_id },
        &fixtures,
        &bindings,
    )
    .await?;
    tx.commit().await?;

    info!(%scope, games = games.len(), "Schedule created");
    Ok(games)
}

/// Creates `count` weekly playing days for a league, each with its schedule,
/// in a single transaction.
pub async fn plan_league_calendar(
    pool: &PgPool,
    league_id: Uuid,
    count: u32,
) -> Result<Vec<Gameday>> {
    let league = LeagueRepository::find_by_id(pool, league_id)
        .await
        .map_err(|e| not_found_as_scope(e, Scope::League(league_id)))?;
    let courts = LeagueRepository::court_ids(pool, league_id).await?;

    // Validate once up front so nothing is written for an impossible roster.
    round_robin(league.team_count)?;
    if courts.is_empty() {
        return Err(StorageError::NoCourts);
    }

    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(count as usize);
    for planned in plan_gamedays(&league.name, league.start_date, count) {
        let gameday = GamedayRepository::create(&mut tx, league_id, &planned).await?;
        let fixtures = generate(league.team_count, &courts, &league.slot_timing(planned.date))?;
        GameRepository::insert_fixtures(
            &mut tx,
            GameOwner::Gameday {
                league_id,
                gameday_id: gameday.gameday_id,
            },
            &fixtures,
            &TeamBindings::new(),
        )
        .await?;
        created.push(gameday);
    }
    tx.commit().await?;

    info!(%league_id, gamedays = created.len(), "League calendar planned");
    Ok(created)
}

pub(crate) fn not_found_as_scope(error: StorageError, scope: Scope) -> StorageError {
    match error {
        StorageError::NotFound => StorageError::ScopeNotFound(scope),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveTime;

    use super::*;

    fn timing() -> SlotTiming {
        SlotTiming {
            start: NaiveDate::from_ymd_opt(2024, 3, 2)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            warm_up_minutes: 15,
            minutes_per_game: 20,
            minutes_between_games: 5,
        }
    }

    fn courts(n: u128) -> Vec<Uuid> {
        (1..=n).map(Uuid::from_u128).collect()
    }

    #[test]
    fn test_rejects_unsupported_roster_sizes() {
        for n in [-1, 0, 1, 9, 12] {
            assert!(matches!(
                round_robin(n),
                Err(StorageError::UnsupportedRosterSize(x)) if x == n
            ));
        }
    }

    #[test]
    fn test_every_pair_meets_exactly_once() {
        for n in 2..=8 {
            let fixtures = generate(n, &courts(2), &timing()).unwrap();
            assert_eq!(fixtures.len(), expected_game_count(n), "n = {n}");

            let mut pairs = HashSet::new();
            for f in &fixtures {
                assert_ne!(f.team_a, f.team_b);
                let key = (f.team_a.min(f.team_b), f.team_a.max(f.team_b));
                assert!(pairs.insert(key), "duplicate pairing for n = {n}");
            }

            for team in (0..n as usize).filter_map(TeamSlot::from_index) {
                let appearances = fixtures
                    .iter()
                    .filter(|f| f.team_a == team || f.team_b == team)
                    .count();
                assert_eq!(appearances, (n - 1) as usize, "team {team}, n = {n}");
            }
        }
    }

    #[test]
    fn test_no_team_twice_in_a_slot_or_round() {
        for n in 2..=8 {
            for court_count in 1..=4 {
                let fixtures = generate(n, &courts(court_count), &timing()).unwrap();

                let mut seen_in_slot: HashSet<(u32, TeamSlot)> = HashSet::new();
                let mut seen_in_round: HashSet<(u32, TeamSlot)> = HashSet::new();
                for f in &fixtures {
                    assert!(seen_in_slot.insert((f.slot, f.team_a)));
                    assert!(seen_in_slot.insert((f.slot, f.team_b)));
                    assert!(seen_in_round.insert((f.round, f.team_a)));
                    assert!(seen_in_round.insert((f.round, f.team_b)));
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate(7, &courts(3), &timing()).unwrap();
        let b = generate(7, &courts(3), &timing()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_slot_timing_and_court_usage() {
        // 4 teams: 3 rounds of 2 games, 2 courts -> one slot per round.
        let fixtures = generate(4, &courts(2), &timing()).unwrap();
        let t = timing();

        let first = &fixtures[0];
        assert_eq!(first.start, t.start + Duration::minutes(15));
        assert_eq!(first.end, first.start + Duration::minutes(20));
        assert_eq!(first.court_id, Uuid::from_u128(1));
        assert_eq!(fixtures[1].court_id, Uuid::from_u128(2));
        assert_eq!(fixtures[1].start, first.start);

        let second_slot: Vec<_> = fixtures.iter().filter(|f| f.slot == 1).collect();
        assert_eq!(second_slot.len(), 2);
        assert_eq!(second_slot[0].start, first.end + Duration::minutes(5));
    }

    #[test]
    fn test_partial_round_uses_only_needed_courts() {
        // 5 teams: 2 games per round, 3 courts available.
        let fixtures = generate(5, &courts(3), &timing()).unwrap();
        for slot in 0..5 {
            let used: Vec<_> = fixtures
                .iter()
                .filter(|f| f.slot == slot)
                .map(|f| f.court_id)
                .collect();
            assert_eq!(used, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
        }
    }

    #[test]
    fn test_round_split_across_slots_when_courts_are_scarce() {
        // 8 teams, 1 court: 28 slots, strictly increasing start times.
        let fixtures = generate(8, &courts(1), &timing()).unwrap();
        assert_eq!(fixtures.len(), 28);
        assert_eq!(fixtures.last().unwrap().slot, 27);
        for pair in fixtures.windows(2) {
            assert!(pair[1].start >= pair[0].end + Duration::minutes(5));
        }
    }

    #[test]
    fn test_no_courts_is_an_error() {
        assert!(matches!(
            generate(4, &[], &timing()),
            Err(StorageError::NoCourts)
        ));
    }

    #[test]
    fn test_two_teams_play_once() {
        let fixtures = generate(2, &courts(2), &timing()).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].team_a.letter(), 'A');
        assert_eq!(fixtures[0].team_b.letter(), 'B');
    }

    #[test]
    fn test_weekly_calendar() {
        let start = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();
        let plan = plan_gamedays("Winter League", start, 3);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].name, "Winter League 1");
        assert_eq!(plan[2].name, "Winter League 3");
        assert_eq!(plan[1].date, NaiveDate::from_ymd_opt(2024, 9, 14).unwrap());
        assert_eq!(plan[2].date, NaiveDate::from_ymd_opt(2024, 9, 21).unwrap());
    }
}
