use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    catalog::repo_types::Dish,
    orders::{
        dto::{CheckoutRequest, OrderWithItems, Pagination},
        repo_types::{Order, PromoCode},
        services::price_order,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(checkout).get(list_orders))
        .route("/promos/:code", get(validate_promo))
}

#[instrument(skip(state, payload))]
pub async fn checkout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>), (StatusCode, String)> {
    if payload.items.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "items must be non-empty".into()));
    }
    if payload.items.iter().any(|l| l.quantity <= 0) {
        return Err((StatusCode::BAD_REQUEST, "quantity must be positive".into()));
    }

    let ids: Vec<Uuid> = payload.items.iter().map(|l| l.dish_id).collect();
    let dishes = Dish::get_many_available(&state.db, &ids)
        .await
        .map_err(internal)?;
    let by_id: HashMap<Uuid, &Dish> = dishes.iter().map(|d| (d.id, d)).collect();

    let mut lines = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        match by_id.get(&line.dish_id) {
            Some(dish) => lines.push((*dish, line.quantity)),
            None => {
                warn!(dish_id = %line.dish_id, "checkout references unknown dish");
                return Err((
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Dish not available".into(),
                ));
            }
        }
    }

    let promo = match payload.promo_code.as_deref() {
        Some(code) => match PromoCode::find_active(&state.db, code).await {
            Ok(Some(p)) => Some(p),
            Ok(None) => {
                warn!(code, "unknown or inactive promo code");
                return Err((StatusCode::UNPROCESSABLE_ENTITY, "Invalid promo code".into()));
            }
            Err(e) => {
                error!(error = %e, "promo lookup failed");
                return Err(internal(e));
            }
        },
        None => None,
    };

    let priced = price_order(&lines, promo.as_ref());

    let (order, items) = Order::create_with_items(
        &state.db,
        user_id,
        &priced,
        payload.promo_code.as_deref(),
        &lines,
    )
    .await
    .map_err(internal)?;

    info!(
        order_id = %order.id,
        user_id = %user_id,
        total = order.total,
        points = order.points_earned,
        "order placed"
    );
    Ok((StatusCode::CREATED, Json(OrderWithItems { order, items })))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<OrderWithItems>>, (StatusCode, String)> {
    let orders = Order::list_by_user(&state.db, user_id, p.limit.clamp(1, 100), p.offset.max(0))
        .await
        .map_err(internal)?;

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items = Order::items_for(&state.db, &ids).await.map_err(internal)?;

    let mut grouped: HashMap<Uuid, Vec<_>> = HashMap::new();
    for item in items.drain(..) {
        grouped.entry(item.order_id).or_default().push(item);
    }

    let out = orders
        .into_iter()
        .map(|order| {
            let items = grouped.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect();
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn validate_promo(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(code): Path<String>,
) -> Result<Json<PromoCode>, (StatusCode, String)> {
    match PromoCode::find_active(&state.db, &code).await {
        Ok(Some(promo)) => Ok(Json(promo)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Promo code not found".into())),
        Err(e) => {
            error!(error = %e, code, "promo lookup failed");
            Err(internal(e))
        }
    }
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
