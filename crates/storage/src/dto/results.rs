use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct GameScore {
    pub game_id: Uuid,
    #[validate(range(min = 0, message = "Scores cannot be negative"))]
    pub result_a: i32,
    #[validate(range(min = 0, message = "Scores cannot be negative"))]
    pub result_b: i32,
}

/// Request payload for submitting the scores of a playing day or event
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitResultsRequest {
    #[validate(length(min = 1, message = "At least one score is required"))]
    #[validate(nested)]
    pub scores: Vec<GameScore>,
}
