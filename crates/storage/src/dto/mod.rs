pub mod common;
pub mod rating;
pub mod results;
pub mod schedule;
pub mod standings;
pub mod teams;
