pub mod events;
pub mod gamedays;
pub mod leagues;
pub mod ratings;
