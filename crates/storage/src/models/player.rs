use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Player {
    pub player_id: Uuid,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub is_player: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl Player {
    /// Age in whole years on `on`; 0 when no birth date is stored.
    pub fn age_on(&self, on: NaiveDate) -> u32 {
        self.birth_date.map(|b| age_on(b, on)).unwrap_or(0)
    }
}

/// Completed years between `birth_date` and `on`.
pub fn age_on(birth_date: NaiveDate, on: NaiveDate) -> u32 {
    let mut years = on.year() - birth_date.year();
    if (on.month(), on.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 14)), 33);
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 15)), 34);
    }

    #[test]
    fn test_birth_in_future_clamps_to_zero() {
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), 0);
    }
}
