use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::models::{Game, Scope};
use storage::services::fixtures::{self, SlotTiming, TeamBindings};
use storage::services::rating::{INITIAL_RATING, RatableGame, RatingLedger};
use storage::services::standings::{StandingsPolicy, compute_standings};
use storage::services::teams::{TeamMode, assign_teams};
use storage::services::winners::resolve_winners;
use uuid::Uuid;

fn player(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn timing() -> SlotTiming {
    SlotTiming {
        start: NaiveDate::from_ymd_opt(2024, 4, 6)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
        warm_up_minutes: 10,
        minutes_per_game: 20,
        minutes_between_games: 5,
    }
}

/// Schedules a playing day for `team_count` teams and binds manual teams
/// made of players `1..=2 * team_count`.
fn scheduled_day(team_count: i32) -> (Vec<Game>, TeamBindings) {
    let courts = vec![Uuid::from_u128(900), Uuid::from_u128(901)];
    let players: Vec<Uuid> = (1..=(team_count as u128 * 2)).map(player).collect();
    let bindings = assign_teams(
        TeamMode::Manual,
        &players,
        team_count,
        &HashMap::new(),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();

    let games = fixtures::generate(team_count, &courts, &timing())
        .unwrap()
        .into_iter()
        .enumerate()
        .map(|(i, f)| {
            let a = bindings[&f.team_a];
            let b = bindings[&f.team_b];
            Game {
                game_id: Uuid::from_u128(10_000 + i as u128),
                league_id: Some(Uuid::from_u128(1)),
                gameday_id: Some(Uuid::from_u128(2)),
                event_id: None,
                game_date: f.start.date(),
                start_time: f.start.time(),
                end_time: f.end.time(),
                court_id: f.court_id,
                round: f.round as i32,
                slot: f.slot as i32,
                team_a: f.team_a.to_string(),
                team_b: f.team_b.to_string(),
                player_a1_id: Some(a[0]),
                player_a2_id: Some(a[1]),
                player_b1_id: Some(b[0]),
                player_b2_id: Some(b[1]),
                result_a: None,
                result_b: None,
            }
        })
        .collect();

    (games, bindings)
}

/// Team A wins everything 6-x, otherwise the lower letter wins 6-4.
fn play(games: &mut [Game]) {
    for g in games.iter_mut() {
        let a_wins = g.team_a < g.team_b;
        let (a, b) = if a_wins { (6, 4) } else { (4, 6) };
        g.result_a = Some(a);
        g.result_b = Some(b);
    }
}

fn ratable(games: &[Game], k: i32) -> Vec<RatableGame> {
    games
        .iter()
        .filter_map(|g| {
            let (a, b) = g.score()?;
            let (side_a, side_b) = g.sides()?;
            Some(RatableGame {
                game_id: g.game_id,
                game_date: g.game_date,
                start_time: g.start_time,
                player_a1_id: side_a[0],
                player_a2_id: side_a[1],
                player_b1_id: side_b[0],
                player_b2_id: side_b[1],
                result_a: a,
                result_b: b,
                elo_k: k,
            })
        })
        .collect()
}

#[test]
fn test_playing_day_from_schedule_to_winners() {
    let (mut games, _) = scheduled_day(4);
    assert_eq!(games.len(), 6);
    play(&mut games);

    let today = NaiveDate::from_ymd_opt(2024, 4, 6).unwrap();
    let registered: Vec<Uuid> = (1..=9).map(player).collect();
    let rows = compute_standings(
        Scope::Gameday(Uuid::from_u128(2)),
        &StandingsPolicy::league(1, today),
        &HashMap::new(),
        &registered,
        &games,
    );

    // 8 players in games plus one registered spectator.
    assert_eq!(rows.len(), 9);

    // Team A (players 1, 2) wins all three games.
    let top = &rows[0];
    assert_eq!(top.player_id, player(1));
    assert_eq!(top.wins, 3);
    assert_eq!(top.points, 3 * 3 + 1);
    assert_eq!(rows[1].player_id, player(2));

    let spectator = rows.iter().find(|r| r.player_id == player(9)).unwrap();
    assert_eq!(spectator.points, 0);
    assert_eq!(spectator.position, 9);

    let winners = resolve_winners(&rows).unwrap();
    assert_eq!(winners.winner1_id, player(1));
    assert_eq!(winners.winner2_id, player(2));
}

#[test]
fn test_standings_ignore_unscored_games() {
    let (games, _) = scheduled_day(3);
    let today = NaiveDate::from_ymd_opt(2024, 4, 6).unwrap();
    let rows = compute_standings(
        Scope::Gameday(Uuid::from_u128(2)),
        &StandingsPolicy::league(2, today),
        &HashMap::new(),
        &[],
        &games,
    );
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r.points == 0 && r.games_played == 0));
}

#[test]
fn test_incremental_rating_matches_full_replay() {
    let (mut games, _) = scheduled_day(4);
    play(&mut games);
    let rated = ratable(&games, 24);
    assert_eq!(rated.len(), 6);

    // One pass over all games.
    let mut full = RatingLedger::new(INITIAL_RATING);
    for g in &rated {
        full.apply(g).unwrap();
    }

    // Two sweeps, the second resuming from the profiles the first stored.
    let (first, second) = rated.split_at(2);
    let mut sweep = RatingLedger::new(INITIAL_RATING);
    for g in first {
        sweep.apply(g).unwrap();
    }
    let mut resumed = RatingLedger::with_profiles(INITIAL_RATING, sweep.into_profiles());
    for g in second {
        resumed.apply(g).unwrap();
    }

    assert_eq!(resumed.into_profiles(), full.into_profiles());
}

#[test]
fn test_ties_do_not_move_ratings() {
    let (mut games, _) = scheduled_day(2);
    games[0].result_a = Some(5);
    games[0].result_b = Some(5);

    let mut ledger = RatingLedger::new(INITIAL_RATING);
    let outcome = ledger.apply(&ratable(&games, 32)[0]).unwrap();
    assert!(outcome.history.iter().all(|h| h.rating_before == h.rating_after));
    assert!(ledger
        .into_profiles()
        .iter()
        .all(|p| p.rating == INITIAL_RATING && p.games_played == 0));
}
