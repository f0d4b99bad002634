use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::catalog::repo_types::DishCategory;

/// Order header row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub promo_code: Option<String>,
    pub points_earned: i64,
    pub created_at: OffsetDateTime,
}

/// Order line, denormalized from the dish at checkout time so history
/// survives later dish edits.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub dish_id: Uuid,
    pub chef_id: Uuid,
    pub name: String,
    pub category: DishCategory,
    pub price: f64,
    pub calories: f64,
    pub ingredients: String,
    pub quantity: i64,
}

/// Percent-off promo code record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromoCode {
    pub code: String,
    pub percent_off: f64,
    pub active: bool,
}
