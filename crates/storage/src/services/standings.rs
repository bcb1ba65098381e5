//! Standings tables for playing days, leagues and events.
//!
//! A table is always rebuilt from the scope's games. The three scopes share
//! one aggregation and differ only in their [`StandingsPolicy`]: presence
//! bonus, score rules, tie-break and whether registered participants without
//! games get a row.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Game, Player, Scope, ScopeKind, StandingsRow};
use crate::repository::event::EventRepository;
use crate::repository::game::GameRepository;
use crate::repository::gameday::GamedayRepository;
use crate::repository::league::LeagueRepository;
use crate::repository::player::PlayerRepository;
use crate::repository::standings::StandingsRepository;
use crate::services::fixtures::not_found_as_scope;
use crate::services::winners::{self, Winners};

pub const WIN_POINTS: i32 = 3;
pub const DRAW_POINTS: i32 = 1;

const POINTS_WEIGHT: f64 = 1e7;
const WINS_WEIGHT: f64 = 1e4;
const DIFF_WEIGHT: f64 = 10.0;

/// Which scores a competition accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRules {
    /// Ceiling for a side's score; unlimited when `None`.
    pub max_points: Option<i32>,
    pub allow_draws: bool,
    /// Accept `max + 1` against `max`.
    pub allow_overtime: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn points(self) -> i32 {
        match self {
            Outcome::Win => WIN_POINTS,
            Outcome::Draw => DRAW_POINTS,
            Outcome::Loss => 0,
        }
    }
}

impl ScoreRules {
    /// Playing days and leagues: no ceiling, draws count.
    pub const LEAGUE: ScoreRules = ScoreRules {
        max_points: None,
        allow_draws: true,
        allow_overtime: false,
    };

    pub fn validate(&self, a: i32, b: i32) -> std::result::Result<(), String> {
        if a < 0 || b < 0 {
            return Err("scores must not be negative".to_string());
        }
        let Some(max) = self.max_points else {
            return Ok(());
        };
        if a <= max && b <= max {
            return Ok(());
        }
        let overtime = (a == max + 1 && b == max) || (b == max + 1 && a == max);
        if self.allow_overtime && overtime {
            return Ok(());
        }
        Err(format!("{a}-{b} exceeds the {max} point limit"))
    }

    /// Outcome for the side that scored `own`. `None` for a tie where draws
    /// are not allowed; such a game is left out of the table.
    pub fn outcome(&self, own: i32, other: i32) -> Option<Outcome> {
        match own.cmp(&other) {
            std::cmp::Ordering::Greater => Some(Outcome::Win),
            std::cmp::Ordering::Less => Some(Outcome::Loss),
            std::cmp::Ordering::Equal => self.allow_draws.then_some(Outcome::Draw),
        }
    }
}

/// Last component of the ranking score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// `age / 100`: older participants rank higher.
    Age { as_of: NaiveDate },
    /// Initial of the display name: A ranks above Z.
    Name,
}

impl TieBreak {
    pub fn score(&self, player_id: Uuid, player: Option<&Player>) -> f64 {
        match self {
            TieBreak::Age { as_of } => match player {
                Some(p) => {
                    if p.birth_date.is_none() {
                        warn!(%player_id, "No birth date, using age 0 for tie-break");
                    }
                    p.age_on(*as_of) as f64 / 100.0
                }
                None => {
                    warn!(%player_id, "Unknown participant, using age 0 for tie-break");
                    0.0
                }
            },
            TieBreak::Name => -name_code(player.map(|p| p.name.as_str()).unwrap_or("")) / 1000.0,
        }
    }
}

fn name_code(name: &str) -> f64 {
    name.trim()
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .map(|c| (c as u32).min(999))
        .unwrap_or(999) as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandingsPolicy {
    pub presence_points: i32,
    pub rules: ScoreRules,
    pub tie_break: TieBreak,
    /// Give registered participants a row even without a game.
    pub include_registered: bool,
}

impl StandingsPolicy {
    pub fn league(presence_points: i32, as_of: NaiveDate) -> Self {
        Self {
            presence_points,
            rules: ScoreRules::LEAGUE,
            tie_break: TieBreak::Age { as_of },
            include_registered: true,
        }
    }

    pub fn event(presence_points: i32, rules: ScoreRules) -> Self {
        Self {
            presence_points,
            rules,
            tie_break: TieBreak::Name,
            include_registered: false,
        }
    }
}

pub fn ranking_score(points: i32, wins: i32, games_diff: i32, tie_break: f64) -> f64 {
    points as f64 * POINTS_WEIGHT + wins as f64 * WINS_WEIGHT + games_diff as f64 * DIFF_WEIGHT + tie_break
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    points: i32,
    wins: i32,
    draws: i32,
    losses: i32,
    games_played: i32,
    games_for: i32,
    games_against: i32,
}

impl Tally {
    fn record(&mut self, outcome: Outcome, own: i32, other: i32) {
        self.points += outcome.points();
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Loss => self.losses += 1,
        }
        self.games_played += 1;
        self.games_for += own;
        self.games_against += other;
    }
}

/// Builds the ranked table of one scope.
///
/// `games` are all games of the scope, played or not; participants bound to
/// any of them get a row. `players` supplies names and birth dates for the
/// tie-break and may be incomplete.
pub fn compute_standings(
    scope: Scope,
    policy: &StandingsPolicy,
    players: &HashMap<Uuid, Player>,
    registered: &[Uuid],
    games: &[Game],
) -> Vec<StandingsRow> {
    let mut tallies: BTreeMap<Uuid, Tally> = BTreeMap::new();

    if policy.include_registered {
        for id in registered {
            tallies.entry(*id).or_default();
        }
    }

    for game in games {
        let bound = [
            game.player_a1_id,
            game.player_a2_id,
            game.player_b1_id,
            game.player_b2_id,
        ];
        for id in bound.into_iter().flatten() {
            tallies.entry(id).or_default();
        }

        let (Some((a, b)), Some((side_a, side_b))) = (game.score(), game.sides()) else {
            continue;
        };
        if let Err(reason) = policy.rules.validate(a, b) {
            warn!(game_id = %game.game_id, %reason, "Ignoring stored score");
            continue;
        }
        let (Some(outcome_a), Some(outcome_b)) =
            (policy.rules.outcome(a, b), policy.rules.outcome(b, a))
        else {
            continue;
        };

        for id in side_a {
            tallies.entry(id).or_default().record(outcome_a, a, b);
        }
        for id in side_b {
            tallies.entry(id).or_default().record(outcome_b, b, a);
        }
    }

    let mut rows: Vec<StandingsRow> = tallies
        .into_iter()
        .map(|(player_id, tally)| {
            let points = if tally.games_played > 0 {
                tally.points + policy.presence_points
            } else {
                0
            };
            let games_diff = tally.games_for - tally.games_against;
            let tie_break = policy.tie_break.score(player_id, players.get(&player_id));
            StandingsRow {
                scope_kind: scope.kind().as_str().to_string(),
                scope_id: scope.id(),
                player_id,
                position: 0,
                points,
                wins: tally.wins,
                draws: tally.draws,
                losses: tally.losses,
                games_played: tally.games_played,
                games_for: tally.games_for,
                games_against: tally.games_against,
                games_diff,
                ranking: ranking_score(points, tally.wins, games_diff, tie_break),
            }
        })
        .collect();

    rows.sort_by(|x, y| {
        y.ranking
            .total_cmp(&x.ranking)
            .then_with(|| x.player_id.cmp(&y.player_id))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i as i32 + 1;
    }

    rows
}

/// Everything needed to rebuild one scope's table.
struct ScopeInput {
    policy: StandingsPolicy,
    registered: Vec<Uuid>,
    games: Vec<Game>,
}

async fn load_input(conn: &mut PgConnection, scope: Scope, today: NaiveDate) -> Result<ScopeInput> {
    let games = GameRepository::list_for_scope(&mut *conn, scope).await?;

    let input = match scope {
        Scope::Gameday(id) => {
            let gameday = GamedayRepository::find_by_id(&mut *conn, id)
                .await
                .map_err(|e| not_found_as_scope(e, scope))?;
            let league = LeagueRepository::find_by_id(&mut *conn, gameday.league_id).await?;
            let registered = GamedayRepository::players(&mut *conn, id)
                .await?
                .into_iter()
                .map(|p| p.player_id)
                .collect();
            ScopeInput {
                policy: StandingsPolicy::league(league.presence_points, today),
                registered,
                games,
            }
        }
        Scope::League(id) => {
            let league = LeagueRepository::find_by_id(&mut *conn, id)
                .await
                .map_err(|e| not_found_as_scope(e, scope))?;
            ScopeInput {
                policy: StandingsPolicy::league(league.presence_points, today),
                registered: LeagueRepository::registered_player_ids(&mut *conn, id).await?,
                games,
            }
        }
        Scope::Event(id) => {
            let event = EventRepository::find_by_id(&mut *conn, id)
                .await
                .map_err(|e| not_found_as_scope(e, scope))?;
            ScopeInput {
                policy: StandingsPolicy::event(event.presence_points, event.score_rules()),
                registered: Vec::new(),
                games,
            }
        }
    };

    Ok(input)
}

/// Result of rebuilding one scope.
#[derive(Debug, Clone)]
pub struct Recomputed {
    pub rows: Vec<StandingsRow>,
    pub winners: Option<Winners>,
}

/// Rebuilds the table of `scope` and records its winners.
///
/// Runs in one transaction holding the scope's advisory lock, so concurrent
/// recomputations of the same scope queue up and readers see either the old
/// or the new table. Every read goes through that transaction, so a
/// recomputation needs a single pooled connection.
pub async fn recompute(pool: &PgPool, scope: Scope) -> Result<Recomputed> {
    let mut tx = pool.begin().await?;
    // Lock before reading so the last writer always saw the latest scores.
    StandingsRepository::lock_scope(&mut tx, scope).await?;

    let today = Utc::now().date_naive();
    let input = load_input(&mut tx, scope, today).await?;

    let mut ids: Vec<Uuid> = input.registered.clone();
    for game in &input.games {
        ids.extend(
            [
                game.player_a1_id,
                game.player_a2_id,
                game.player_b1_id,
                game.player_b2_id,
            ]
            .into_iter()
            .flatten(),
        );
    }
    ids.sort();
    ids.dedup();
    let players: HashMap<Uuid, Player> = PlayerRepository::find_many(&mut *tx, &ids)
        .await?
        .into_iter()
        .map(|p| (p.player_id, p))
        .collect();

    let rows = compute_standings(scope, &input.policy, &players, &input.registered, &input.games);
    let winners = winners::resolve_winners(&rows);

    StandingsRepository::replace(&mut tx, scope, &rows).await?;
    winners::record(&mut tx, scope, winners).await?;
    tx.commit().await?;

    info!(%scope, rows = rows.len(), "Standings recomputed");
    Ok(Recomputed { rows, winners })
}

/// Stored table of `scope`, best first.
pub async fn list(pool: &PgPool, scope: Scope) -> Result<Vec<StandingsRow>> {
    match scope.kind() {
        ScopeKind::Gameday => {
            GamedayRepository::find_by_id(pool, scope.id())
                .await
                .map_err(|e| not_found_as_scope(e, scope))?;
        }
        ScopeKind::League => {
            LeagueRepository::find_by_id(pool, scope.id())
                .await
                .map_err(|e| not_found_as_scope(e, scope))?;
        }
        ScopeKind::Event => {
            EventRepository::find_by_id(pool, scope.id())
                .await
                .map_err(|e| not_found_as_scope(e, scope))?;
        }
    }
    StandingsRepository::list(pool, scope).await
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, NaiveTime};

    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn player(n: u128, name: &str, birth: Option<(i32, u32, u32)>) -> Player {
        Player {
            player_id: id(n),
            name: name.to_string(),
            birth_date: birth.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            is_player: true,
            created_at: NaiveDateTime::default(),
        }
    }

    fn game(n: u128, a: [u128; 2], b: [u128; 2], score: Option<(i32, i32)>) -> Game {
        Game {
            game_id: id(1000 + n),
            league_id: None,
            gameday_id: Some(id(500)),
            event_id: None,
            game_date: today(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 20, 0).unwrap(),
            court_id: id(900),
            round: 0,
            slot: n as i32,
            team_a: "A".to_string(),
            team_b: "B".to_string(),
            player_a1_id: Some(id(a[0])),
            player_a2_id: Some(id(a[1])),
            player_b1_id: Some(id(b[0])),
            player_b2_id: Some(id(b[1])),
            result_a: score.map(|s| s.0),
            result_b: score.map(|s| s.1),
        }
    }

    fn row(rows: &[StandingsRow], n: u128) -> &StandingsRow {
        rows.iter().find(|r| r.player_id == id(n)).unwrap()
    }

    #[test]
    fn test_presence_bonus_and_counters() {
        let games = vec![
            game(1, [1, 2], [3, 4], Some((6, 2))),
            game(2, [3, 1], [2, 4], Some((2, 6))),
        ];
        let policy = StandingsPolicy::league(1, today());
        let rows = compute_standings(Scope::Gameday(id(500)), &policy, &HashMap::new(), &[], &games);

        // Participant 1: one win 6-2, one loss 2-6.
        let x = row(&rows, 1);
        assert_eq!(x.points, 4);
        assert_eq!(x.wins, 1);
        assert_eq!(x.losses, 1);
        assert_eq!(x.games_played, 2);
        assert_eq!(x.games_diff, 0);
    }

    #[test]
    fn test_registered_without_games_gets_a_zero_row() {
        let players: HashMap<_, _> = [(id(9), player(9, "Nina", Some((1980, 1, 1))))].into();
        let games = vec![game(1, [1, 2], [3, 4], Some((6, 2)))];
        let policy = StandingsPolicy::league(2, today());
        let rows = compute_standings(Scope::Gameday(id(500)), &policy, &players, &[id(9)], &games);

        assert_eq!(rows.len(), 5);
        let idle = row(&rows, 9);
        assert_eq!(idle.points, 0);
        assert_eq!(idle.games_played, 0);
        assert!((idle.ranking - 0.44).abs() < 1e-9);
        assert_eq!(idle.position, 5);
    }

    #[test]
    fn test_event_scope_ignores_registered_list() {
        let policy = StandingsPolicy::event(0, ScoreRules::LEAGUE);
        let rows = compute_standings(Scope::Event(id(7)), &policy, &HashMap::new(), &[id(9)], &[]);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_unplayed_games_are_ignored() {
        let games = vec![
            game(1, [1, 2], [3, 4], None),
            game(2, [1, 2], [3, 4], Some((0, 0))),
        ];
        let policy = StandingsPolicy::league(1, today());
        let rows = compute_standings(Scope::Gameday(id(500)), &policy, &HashMap::new(), &[], &games);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.games_played == 0 && r.points == 0));
    }

    #[test]
    fn test_points_dominate_wins_and_diff() {
        // 1/2 win narrowly twice; 3/4 lose once then win 11-0 once; 5/6 draw once.
        let games = vec![
            game(1, [1, 2], [3, 4], Some((6, 5))),
            game(2, [1, 2], [5, 6], Some((6, 5))),
            game(3, [3, 4], [7, 8], Some((11, 0))),
            game(4, [5, 6], [7, 8], Some((3, 3))),
        ];
        let policy = StandingsPolicy::league(0, today());
        let rows = compute_standings(Scope::League(id(1)), &policy, &HashMap::new(), &[], &games);

        assert_eq!(row(&rows, 1).points, 6);
        assert_eq!(row(&rows, 3).points, 3);
        assert!(row(&rows, 3).games_diff > row(&rows, 1).games_diff);
        assert!(row(&rows, 1).ranking > row(&rows, 3).ranking);
        assert_eq!(row(&rows, 5).draws, 1);
        assert_eq!(row(&rows, 5).points, 1);
        assert_eq!(row(&rows, 7).draws, 1);
    }

    #[test]
    fn test_wins_break_equal_points_before_diff() {
        assert!(ranking_score(6, 2, -20, 0.0) > ranking_score(6, 1, 40, 0.9));
        assert!(ranking_score(6, 2, 1, 0.0) > ranking_score(6, 2, 0, 0.99));
        assert!(ranking_score(7, 0, -100, 0.0) > ranking_score(6, 2, 100, 0.99));
    }

    #[test]
    fn test_age_tie_break_prefers_older() {
        let players: HashMap<_, _> = [
            (id(1), player(1, "Young", Some((2000, 1, 1)))),
            (id(2), player(2, "Old", Some((1960, 1, 1)))),
            (id(3), player(3, "Nobody", None)),
        ]
        .into();
        let policy = StandingsPolicy::league(0, today());
        let rows = compute_standings(
            Scope::Gameday(id(500)),
            &policy,
            &players,
            &[id(1), id(2), id(3)],
            &[],
        );
        let order: Vec<_> = rows.iter().map(|r| r.player_id).collect();
        assert_eq!(order, vec![id(2), id(1), id(3)]);
    }

    #[test]
    fn test_name_tie_break_prefers_early_initials() {
        let players: HashMap<_, _> = [
            (id(1), player(1, "zoe", None)),
            (id(2), player(2, "Anna", None)),
            (id(3), player(3, "Bruno", None)),
            (id(4), player(4, "", None)),
        ]
        .into();
        let games = vec![game(1, [1, 2], [3, 4], Some((5, 5)))];
        let policy = StandingsPolicy::event(
            0,
            ScoreRules {
                max_points: None,
                allow_draws: true,
                allow_overtime: false,
            },
        );
        let rows = compute_standings(Scope::Event(id(7)), &policy, &players, &[], &games);
        let order: Vec<_> = rows.iter().map(|r| r.player_id).collect();
        assert_eq!(order, vec![id(2), id(3), id(1), id(4)]);
    }

    #[test]
    fn test_event_tie_without_draws_is_left_out() {
        let rules = ScoreRules {
            max_points: Some(11),
            allow_draws: false,
            allow_overtime: false,
        };
        let games = vec![game(1, [1, 2], [3, 4], Some((7, 7)))];
        let rows = compute_standings(
            Scope::Event(id(7)),
            &StandingsPolicy::event(0, rules),
            &HashMap::new(),
            &[],
            &games,
        );
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.games_played == 0));
    }

    #[test]
    fn test_score_validation() {
        let rules = ScoreRules {
            max_points: Some(11),
            allow_draws: false,
            allow_overtime: true,
        };
        assert!(rules.validate(11, 4).is_ok());
        assert!(rules.validate(12, 11).is_ok());
        assert!(rules.validate(11, 12).is_ok());
        assert!(rules.validate(12, 10).is_err());
        assert!(rules.validate(13, 12).is_err());
        assert!(rules.validate(-1, 3).is_err());

        let strict = ScoreRules {
            allow_overtime: false,
            ..rules
        };
        assert!(strict.validate(12, 11).is_err());
        assert!(ScoreRules::LEAGUE.validate(40, 38).is_ok());
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let games = vec![
            game(1, [1, 2], [3, 4], Some((6, 2))),
            game(2, [1, 3], [2, 4], Some((4, 6))),
        ];
        let policy = StandingsPolicy::league(1, today());
        let scope = Scope::Gameday(id(500));
        let first = compute_standings(scope, &policy, &HashMap::new(), &[id(5)], &games);
        let second = compute_standings(scope, &policy, &HashMap::new(), &[id(5)], &games);
        assert_eq!(first, second);
    }

    #[test]
    fn test_positions_break_exact_ties_by_id() {
        let games = vec![game(1, [4, 3], [2, 1], Some((5, 5)))];
        let policy = StandingsPolicy::league(0, today());
        let rows = compute_standings(Scope::Gameday(id(500)), &policy, &HashMap::new(), &[], &games);
        let order: Vec<_> = rows.iter().map(|r| (r.position, r.player_id)).collect();
        assert_eq!(order, vec![(1, id(1)), (2, id(2)), (3, id(3)), (4, id(4))]);
    }
}
