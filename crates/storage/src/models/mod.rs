pub mod event;
pub mod game;
pub mod gameday;
pub mod league;
pub mod player;
pub mod rating;
pub mod scope;
pub mod standings;
pub mod team_slot;

pub use event::{Event, EventRegistration};
pub use game::Game;
pub use gameday::{Gameday, GamedayPlayer};
pub use league::League;
pub use player::Player;
pub use rating::{RatingHistoryEntry, RatingProfile, RecordedRatingChange};
pub use scope::{Scope, ScopeKind};
pub use standings::StandingsRow;
pub use team_slot::{MAX_TEAMS, TeamSlot};
