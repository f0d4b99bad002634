use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::services::AuthUser,
    catalog::repo_types::Dish,
    planner::{
        dto::GeneratePlanRequest,
        engine::{self, MealPlan, PlanError},
        goals::{all_goals, goal_profile, NutritionGoal},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", post(generate_plan))
        .route("/plans/goals", get(list_goals))
}

#[instrument(skip(state, payload))]
pub async fn generate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<GeneratePlanRequest>,
) -> Result<Json<MealPlan>, (StatusCode, String)> {
    let dishes = Dish::list_available(&state.db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let goal = goal_profile(payload.goal);
    match engine::generate(&goal, &payload.allergies, &payload.preferences, &dishes) {
        Ok(plan) => {
            info!(
                user_id = %user_id,
                goal = ?payload.goal,
                variety = plan.variety_score,
                balance = plan.balance_score,
                "meal plan generated"
            );
            Ok(Json(plan))
        }
        Err(e @ PlanError::NoEligibleDishes) => {
            warn!(user_id = %user_id, goal = ?payload.goal, "no eligible dishes for plan");
            Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
    }
}

pub async fn list_goals(AuthUser(_user_id): AuthUser) -> Json<Vec<NutritionGoal>> {
    Json(all_goals())
}
