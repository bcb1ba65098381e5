pub mod event;
pub mod game;
pub mod gameday;
pub mod league;
pub mod player;
pub mod rating;
pub mod standings;
