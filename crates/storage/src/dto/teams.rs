use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::TeamSlot;
use crate::services::fixtures::TeamBindings;
use crate::services::teams::TeamMode;

/// Request payload for drawing teams
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignTeamsRequest {
    pub mode: TeamMode,
    /// Participants to split into teams; empty means everyone registered.
    /// The order matters in `manual` mode.
    #[serde(default)]
    #[validate(length(max = 16, message = "At most 16 participants"))]
    pub player_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamResponse {
    pub team: TeamSlot,
    pub player_ids: Vec<Uuid>,
}

impl TeamResponse {
    /// Teams in letter order.
    pub fn from_bindings(bindings: TeamBindings) -> Vec<Self> {
        let mut teams: Vec<Self> = bindings
            .into_iter()
            .map(|(team, pair)| Self {
                team,
                player_ids: pair.to_vec(),
            })
            .collect();
        teams.sort_by_key(|t| t.team);
        teams
    }
}
