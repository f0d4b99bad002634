use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    analysis::{
        dto::AnalyzeRequest,
        services::{self, AnalysisReport, ChefAnalytics},
    },
    auth::services::{AuthUser, ChefUser},
    orders::repo_types::{Order, OrderItem},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analysis", post(analyze_history))
        .route("/chef/analytics", get(chef_analytics))
}

#[instrument(skip(state))]
pub async fn analyze_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, (StatusCode, String)> {
    let orders = Order::history(&state.db, user_id)
        .await
        .map_err(internal)?;
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items = Order::items_for(&state.db, &ids).await.map_err(internal)?;

    let report = services::analyze(
        state.recommender.as_ref(),
        &state.analysis_cache,
        &orders,
        &items,
        payload.goal,
    )
    .await;

    info!(
        user_id = %user_id,
        orders = orders.len(),
        source = report.source,
        confidence = report.confidence,
        "order history analyzed"
    );
    Ok(Json(report))
}

#[instrument(skip(state))]
pub async fn chef_analytics(
    State(state): State<AppState>,
    ChefUser(chef_id): ChefUser,
) -> Result<Json<ChefAnalytics>, (StatusCode, String)> {
    let items = OrderItem::list_by_chef(&state.db, chef_id)
        .await
        .map_err(internal)?;
    Ok(Json(services::chef_analytics(&items)))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
