use serde::Deserialize;

use crate::planner::goals::GoalKind;

fn default_goal() -> GoalKind {
    GoalKind::Healthy
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default = "default_goal")]
    pub goal: GoalKind,
}
