use serde::Deserialize;

use crate::planner::goals::GoalKind;

/// Request body for meal plan generation. The dish catalog is loaded
/// server-side from the available snapshot.
#[derive(Debug, Deserialize)]
pub struct GeneratePlanRequest {
    pub goal: GoalKind,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
}
