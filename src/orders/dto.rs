use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::orders::repo_types::{Order, OrderItem};

/// One cart line in a checkout request.
#[derive(Debug, Deserialize)]
pub struct CheckoutLine {
    pub dish_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Cart snapshot submitted at checkout. The cart itself lives client-side.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,
    pub promo_code: Option<String>,
}

/// Order with its lines, as returned by checkout and history.
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}
