pub mod fixtures;
pub mod rating;
pub mod results;
pub mod standings;
pub mod teams;
pub mod winners;
