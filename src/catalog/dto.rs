use serde::Deserialize;

use crate::catalog::repo_types::DishCategory;

/// Query-string filters for browsing the menu.
#[derive(Debug, Default, Deserialize)]
pub struct DishFilter {
    pub category: Option<DishCategory>,
    pub max_price: Option<f64>,
    pub diabetic_friendly: Option<bool>,
    pub vegetarian: Option<bool>,
    pub q: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Request body for a chef publishing a dish.
#[derive(Debug, Deserialize)]
pub struct CreateDishRequest {
    pub name: String,
    pub category: DishCategory,
    pub price: f64,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub diabetic_friendly: bool,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub ingredients: String,
}
