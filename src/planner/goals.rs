use serde::{Deserialize, Serialize};

use crate::catalog::repo_types::DishCategory;

/// Named daily calorie/macro target profile. Static configuration, not
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    WeightLoss,
    MuscleGain,
    Healthy,
    DiabeticFriendly,
    Keto,
}

impl GoalKind {
    /// Wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            GoalKind::WeightLoss => "weight_loss",
            GoalKind::MuscleGain => "muscle_gain",
            GoalKind::Healthy => "healthy",
            GoalKind::DiabeticFriendly => "diabetic_friendly",
            GoalKind::Keto => "keto",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NutritionGoal {
    pub kind: GoalKind,
    pub label: &'static str,
    pub daily_calories: f64,
    pub daily_protein: f64,
    pub daily_carbs: f64,
    pub daily_fat: f64,
    pub priorities: &'static [&'static str],
}

pub fn goal_profile(kind: GoalKind) -> NutritionGoal {
    match kind {
        GoalKind::WeightLoss => NutritionGoal {
            kind,
            label: "Weight loss",
            daily_calories: 1500.0,
            daily_protein: 110.0,
            daily_carbs: 130.0,
            daily_fat: 50.0,
            priorities: &["low_calorie", "high_protein"],
        },
        GoalKind::MuscleGain => NutritionGoal {
            kind,
            label: "Muscle gain",
            daily_calories: 2600.0,
            daily_protein: 180.0,
            daily_carbs: 280.0,
            daily_fat: 80.0,
            priorities: &["high_protein"],
        },
        GoalKind::Healthy => NutritionGoal {
            kind,
            label: "Balanced & healthy",
            daily_calories: 2000.0,
            daily_protein: 100.0,
            daily_carbs: 250.0,
            daily_fat: 70.0,
            priorities: &["balanced"],
        },
        GoalKind::DiabeticFriendly => NutritionGoal {
            kind,
            label: "Diabetic friendly",
            daily_calories: 1800.0,
            daily_protein: 110.0,
            daily_carbs: 150.0,
            daily_fat: 60.0,
            priorities: &["diabetic_friendly", "low_sugar"],
        },
        GoalKind::Keto => NutritionGoal {
            kind,
            label: "Keto",
            daily_calories: 1800.0,
            daily_protein: 120.0,
            daily_carbs: 40.0,
            daily_fat: 140.0,
            priorities: &["low_carb", "high_fat"],
        },
    }
}

pub fn all_goals() -> Vec<NutritionGoal> {
    [
        GoalKind::WeightLoss,
        GoalKind::MuscleGain,
        GoalKind::Healthy,
        GoalKind::DiabeticFriendly,
        GoalKind::Keto,
    ]
    .into_iter()
    .map(goal_profile)
    .collect()
}

/// One of the four daily meal slots, each owning a fixed fraction of the
/// daily budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    pub fn budget_fraction(self) -> f64 {
        match self {
            MealSlot::Breakfast => 0.25,
            MealSlot::Lunch => 0.35,
            MealSlot::Dinner => 0.30,
            MealSlot::Snack => 0.10,
        }
    }

    /// Which explicit dish categories fit this slot.
    pub fn accepts(self, category: DishCategory) -> bool {
        use DishCategory::*;
        match self {
            MealSlot::Breakfast => matches!(category, Breakfast),
            MealSlot::Lunch => matches!(
                category,
                Soup | Salad | Vegetable | Meat | Seafood | Fried | Rice | Noodle
            ),
            MealSlot::Dinner => {
                matches!(category, Soup | Vegetable | Meat | Seafood | Fried | Rice | Noodle)
            }
            MealSlot::Snack => matches!(category, Dessert | Beverage | Snack | Salad),
        }
    }
}
