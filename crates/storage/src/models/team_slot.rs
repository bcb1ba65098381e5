use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Largest roster a schedule supports.
pub const MAX_TEAMS: usize = 8;

/// A team letter (`A`..`H`) identifying one side of a scope's schedule.
///
/// The letter is fixed for the whole scope and bound to exactly two
/// participants once teams are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "A")]
pub struct TeamSlot(u8);

impl TeamSlot {
    /// Slot for a zero-based team index.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < MAX_TEAMS).then(|| Self(index as u8))
    }

    pub fn letter(&self) -> char {
        (b'A' + self.0) as char
    }

    pub fn parse(value: &str) -> Option<Self> {
        let mut chars = value.trim().chars();
        let c = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() || !c.is_ascii_uppercase() {
            return None;
        }
        Self::from_index((c as u8 - b'A') as usize)
    }
}

impl fmt::Display for TeamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl TryFrom<String> for TeamSlot {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("'{value}' is not a team letter A-H"))
    }
}

impl From<TeamSlot> for String {
    fn from(slot: TeamSlot) -> Self {
        slot.letter().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_round_trip_through_index() {
        let letters: String = (0..MAX_TEAMS)
            .filter_map(TeamSlot::from_index)
            .map(|s| s.letter())
            .collect();
        assert_eq!(letters, "ABCDEFGH");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(TeamSlot::parse("c"), TeamSlot::from_index(2));
        assert_eq!(TeamSlot::parse(" D "), TeamSlot::from_index(3));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(TeamSlot::parse("I"), None);
        assert_eq!(TeamSlot::parse("AB"), None);
        assert_eq!(TeamSlot::parse(""), None);
        assert_eq!(TeamSlot::parse("1"), None);
    }
}
