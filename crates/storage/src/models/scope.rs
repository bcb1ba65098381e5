use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Which table of standings a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Gameday,
    League,
    Event,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gameday => "gameday",
            Self::League => "league",
            Self::Event => "event",
        }
    }
}

/// A set of games that is ranked together: one playing day, a whole league,
/// or a standalone event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Scope {
    Gameday(Uuid),
    League(Uuid),
    Event(Uuid),
}

impl Scope {
    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::Gameday(_) => ScopeKind::Gameday,
            Self::League(_) => ScopeKind::League,
            Self::Event(_) => ScopeKind::Event,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Gameday(id) | Self::League(id) | Self::Event(id) => *id,
        }
    }

    /// Key for `pg_advisory_xact_lock`, stable for a given scope.
    pub fn lock_key(&self) -> i64 {
        let (high, low) = self.id().as_u64_pair();
        let tag = match self.kind() {
            ScopeKind::Gameday => 1,
            ScopeKind::League => 2,
            ScopeKind::Event => 3,
        };
        ((high ^ low) as i64).wrapping_mul(31).wrapping_add(tag)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind().as_str(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_key_differs_by_kind() {
        let id = Uuid::from_u128(42);
        assert_ne!(Scope::Gameday(id).lock_key(), Scope::League(id).lock_key());
        assert_ne!(Scope::League(id).lock_key(), Scope::Event(id).lock_key());
    }

    #[test]
    fn test_display() {
        let scope = Scope::Event(Uuid::nil());
        assert_eq!(
            scope.to_string(),
            "event 00000000-0000-0000-0000-000000000000"
        );
    }
}
