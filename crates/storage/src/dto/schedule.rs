use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Game, Gameday, Scope};

/// Request payload for planning a league's playing days
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PlanGamedaysRequest {
    #[validate(range(min = 1, max = 52, message = "Between 1 and 52 playing days"))]
    pub count: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlannedGamedaysResponse {
    pub gamedays: Vec<Gameday>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub scope: Scope,
    pub games: Vec<Game>,
}
