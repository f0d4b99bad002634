use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::{AuthUser, ChefUser},
    catalog::{
        dto::{CreateDishRequest, DishFilter},
        repo_types::Dish,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/dishes", get(list_dishes))
        .route("/dishes/:id", get(get_dish))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/dishes", post(create_dish))
        .route("/dishes/:id", axum::routing::delete(retire_dish))
}

#[instrument(skip(state))]
pub async fn list_dishes(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(filter): Query<DishFilter>,
) -> Result<Json<Vec<Dish>>, (StatusCode, String)> {
    let limit = filter.limit.clamp(1, 100);
    let offset = filter.offset.max(0);
    let dishes = Dish::list_filtered(&state.db, &filter, limit, offset)
        .await
        .map_err(internal)?;
    Ok(Json(dishes))
}

#[instrument(skip(state))]
pub async fn get_dish(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Dish>, (StatusCode, String)> {
    match Dish::get(&state.db, id).await {
        Ok(Some(dish)) => Ok(Json(dish)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Dish not found".into())),
        Err(e) => {
            error!(error = %e, %id, "get_dish failed");
            Err(internal(e))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_dish(
    State(state): State<AppState>,
    ChefUser(chef_id): ChefUser,
    Json(payload): Json<CreateDishRequest>,
) -> Result<(StatusCode, Json<Dish>), (StatusCode, String)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name must be non-empty".into()));
    }
    if payload.price <= 0.0 {
        return Err((StatusCode::BAD_REQUEST, "price must be positive".into()));
    }

    let dish = Dish::create(
        &state.db,
        chef_id,
        name,
        payload.category,
        payload.price,
        payload.calories.max(0.0),
        payload.protein.max(0.0),
        payload.carbs.max(0.0),
        payload.fat.max(0.0),
        payload.diabetic_friendly,
        payload.vegetarian,
        payload.ingredients.trim(),
    )
    .await
    .map_err(internal)?;

    info!(dish_id = %dish.id, chef_id = %chef_id, category = dish.category.as_str(), "dish published");
    Ok((StatusCode::CREATED, Json(dish)))
}

#[instrument(skip(state))]
pub async fn retire_dish(
    State(state): State<AppState>,
    ChefUser(chef_id): ChefUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let removed = Dish::retire_owned(&state.db, id, chef_id)
        .await
        .map_err(internal)?;
    if !removed {
        warn!(%id, chef_id = %chef_id, "retire_dish: not found or not owner");
        return Err((StatusCode::NOT_FOUND, "Dish not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
