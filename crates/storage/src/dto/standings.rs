use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Scope, StandingsRow};

#[derive(Debug, Serialize, ToSchema)]
pub struct StandingsResponse {
    pub scope: Scope,
    pub rows: Vec<StandingsRow>,
}
