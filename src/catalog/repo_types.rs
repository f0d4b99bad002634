use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Menu category carried explicitly on every dish record. Classification
/// (fried/vegetable detection, meal-slot suitability, prep time) reads this
/// field instead of sniffing dish names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DishCategory {
    Breakfast,
    Soup,
    Salad,
    Vegetable,
    Meat,
    Seafood,
    Fried,
    Rice,
    Noodle,
    Dessert,
    Beverage,
    Snack,
}

impl DishCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DishCategory::Breakfast => "breakfast",
            DishCategory::Soup => "soup",
            DishCategory::Salad => "salad",
            DishCategory::Vegetable => "vegetable",
            DishCategory::Meat => "meat",
            DishCategory::Seafood => "seafood",
            DishCategory::Fried => "fried",
            DishCategory::Rice => "rice",
            DishCategory::Noodle => "noodle",
            DishCategory::Dessert => "dessert",
            DishCategory::Beverage => "beverage",
            DishCategory::Snack => "snack",
        }
    }

    /// Rough preparation time per dish: soups simmer, salads are quick,
    /// everything else gets a flat half hour.
    pub fn prep_minutes(self) -> u32 {
        match self {
            DishCategory::Soup => 60,
            DishCategory::Salad => 15,
            _ => 30,
        }
    }
}

/// Catalog entry supplied by a chef. Nutrition columns default to zero in
/// the schema, so partially filled records are tolerated everywhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dish {
    pub id: Uuid,
    pub chef_id: Uuid,
    pub name: String,
    pub category: DishCategory,
    pub price: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub diabetic_friendly: bool,
    pub vegetarian: bool,
    pub ingredients: String, // comma-separated free text
    pub available: bool,
    pub created_at: OffsetDateTime,
}

impl Dish {
    /// Ingredient entries, lowercased and trimmed. Empty text yields an
    /// empty list.
    pub fn ingredient_list(&self) -> Vec<String> {
        self.ingredients
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prep_minutes_constants() {
        assert_eq!(DishCategory::Soup.prep_minutes(), 60);
        assert_eq!(DishCategory::Salad.prep_minutes(), 15);
        assert_eq!(DishCategory::Meat.prep_minutes(), 30);
    }

    #[test]
    fn ingredient_list_trims_and_skips_empty() {
        let dish = Dish {
            id: Uuid::new_v4(),
            chef_id: Uuid::new_v4(),
            name: "Green Curry".into(),
            category: DishCategory::Meat,
            price: 12.0,
            calories: 540.0,
            protein: 28.0,
            carbs: 40.0,
            fat: 22.0,
            diabetic_friendly: false,
            vegetarian: false,
            ingredients: "Chicken, Coconut Milk, , basil ".into(),
            available: true,
            created_at: OffsetDateTime::now_utc(),
        };
        assert_eq!(
            dish.ingredient_list(),
            vec!["chicken", "coconut milk", "basil"]
        );
    }
}
