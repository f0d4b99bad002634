//! Rule-based 3-day meal plan generator. A pure function over a catalog
//! snapshot: filter by allergies/preferences, bucket by slot, pick the
//! nearest-target candidate per day and slot with a per-day rotation
//! offset, then derive scores, shopping list and estimates.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::repo_types::{Dish, DishCategory};
use crate::planner::goals::{GoalKind, MealSlot, NutritionGoal};

pub const PLAN_DAYS: usize = 3;

const LOW_CALORIE_MAX: f64 = 350.0;
const HIGH_PROTEIN_MIN: f64 = 20.0;
const LOW_CARB_MAX: f64 = 30.0;

/// Grams are weighted up so protein distance is comparable to calories.
const PROTEIN_DISTANCE_WEIGHT: f64 = 4.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("no eligible dishes after applying allergies and preferences")]
    NoEligibleDishes,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedMeal {
    pub slot: MealSlot,
    pub dish_id: Uuid,
    pub name: String,
    pub category: DishCategory,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    pub label: String,
    /// One entry per filled slot; a slot with no candidate is simply absent.
    pub meals: Vec<PlannedMeal>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub fit_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShoppingItem {
    pub name: String,
    pub aisle: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealPlan {
    pub goal: GoalKind,
    pub days: Vec<DayPlan>,
    pub variety_score: f64,
    pub balance_score: f64,
    pub shopping_list: Vec<ShoppingItem>,
    pub prep_minutes: u32,
    pub estimated_cost: f64,
    pub tips: Vec<String>,
}

/// Generate a fresh 3-day plan. Never mutates its inputs; regeneration
/// produces a new plan.
pub fn generate(
    goal: &NutritionGoal,
    allergies: &[String],
    preferences: &[String],
    dishes: &[Dish],
) -> Result<MealPlan, PlanError> {
    let eligible = filter_dishes(dishes, allergies, preferences);
    if eligible.is_empty() {
        return Err(PlanError::NoEligibleDishes);
    }

    let mut days = Vec::with_capacity(PLAN_DAYS);
    let mut selected: Vec<&Dish> = Vec::new();
    for day in 0..PLAN_DAYS {
        let (day_plan, picks) = build_day(goal, &eligible, day);
        days.push(day_plan);
        selected.extend(picks);
    }

    let variety_score = variety_score(&days);
    let balance_score = balance_score(goal, &days);
    let shopping_list = shopping_list(&selected);
    let (prep_minutes, estimated_cost) = estimates(&days);
    let tips = tips_for(goal);

    Ok(MealPlan {
        goal: goal.kind,
        days,
        variety_score,
        balance_score,
        shopping_list,
        prep_minutes,
        estimated_cost,
        tips,
    })
}

/// Allergy keywords exclude any dish whose name or ingredient text contains
/// them; preferences exclude dishes that fail the corresponding explicit
/// flag or threshold. Unknown preference strings are ignored.
pub(crate) fn filter_dishes<'a>(
    dishes: &'a [Dish],
    allergies: &[String],
    preferences: &[String],
) -> Vec<&'a Dish> {
    let allergies: Vec<String> = allergies
        .iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();
    let preferences: Vec<String> = preferences.iter().map(|p| p.trim().to_lowercase()).collect();

    dishes
        .iter()
        .filter(|d| d.available)
        .filter(|d| {
            let haystack = format!("{} {}", d.name.to_lowercase(), d.ingredients.to_lowercase());
            !allergies.iter().any(|a| haystack.contains(a.as_str()))
        })
        .filter(|d| preferences.iter().all(|p| matches_preference(d, p)))
        .collect()
}

fn matches_preference(dish: &Dish, preference: &str) -> bool {
    match preference {
        "vegetarian" | "vegan" => dish.vegetarian,
        "diabetic" | "diabetic_friendly" => dish.diabetic_friendly,
        "low_carb" | "keto" => dish.carbs <= LOW_CARB_MAX,
        "high_protein" => dish.protein >= HIGH_PROTEIN_MIN,
        "low_calorie" => dish.calories <= LOW_CALORIE_MAX,
        _ => true,
    }
}

fn build_day<'a>(
    goal: &NutritionGoal,
    eligible: &[&'a Dish],
    day: usize,
) -> (DayPlan, Vec<&'a Dish>) {
    let mut meals = Vec::new();
    let mut picks = Vec::new();
    for slot in MealSlot::ALL {
        if let Some(dish) = pick_for_slot(goal, eligible, slot, day) {
            picks.push(dish);
            meals.push(PlannedMeal {
                slot,
                dish_id: dish.id,
                name: dish.name.clone(),
                category: dish.category,
                calories: dish.calories,
                protein: dish.protein,
                carbs: dish.carbs,
                fat: dish.fat,
                price: dish.price,
            });
        }
    }

    let total_calories = meals.iter().map(|m| m.calories).sum();
    let total_protein = meals.iter().map(|m| m.protein).sum();
    let total_carbs = meals.iter().map(|m| m.carbs).sum();
    let total_fat = meals.iter().map(|m| m.fat).sum();

    let fit_score = [
        closeness(total_calories, goal.daily_calories),
        closeness(total_protein, goal.daily_protein),
        closeness(total_carbs, goal.daily_carbs),
        closeness(total_fat, goal.daily_fat),
    ]
    .iter()
    .sum::<f64>()
        / 4.0;

    let day_plan = DayPlan {
        label: format!("Day {}", day + 1),
        meals,
        total_calories,
        total_protein,
        total_carbs,
        total_fat,
        fit_score,
    };
    (day_plan, picks)
}

/// Rank slot candidates by distance to the slot's calorie/protein targets
/// and take the `day`-th best. Best-effort variety, not guaranteed
/// uniqueness.
fn pick_for_slot<'a>(
    goal: &NutritionGoal,
    eligible: &[&'a Dish],
    slot: MealSlot,
    day: usize,
) -> Option<&'a Dish> {
    let mut candidates: Vec<&Dish> = eligible
        .iter()
        .copied()
        .filter(|d| slot.accepts(d.category))
        .collect();

    // For the diabetic goal, restrict to flagged dishes when any exist.
    if goal.kind == GoalKind::DiabeticFriendly {
        let friendly: Vec<&Dish> = candidates
            .iter()
            .copied()
            .filter(|d| d.diabetic_friendly)
            .collect();
        if !friendly.is_empty() {
            candidates = friendly;
        }
    }

    if candidates.is_empty() {
        return None;
    }

    let cal_target = goal.daily_calories * slot.budget_fraction();
    let protein_target = goal.daily_protein * slot.budget_fraction();

    candidates.sort_by(|a, b| {
        let da = slot_distance(a, cal_target, protein_target);
        let db = slot_distance(b, cal_target, protein_target);
        da.partial_cmp(&db)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    Some(candidates[day % candidates.len()])
}

fn slot_distance(dish: &Dish, cal_target: f64, protein_target: f64) -> f64 {
    (dish.calories - cal_target).abs()
        + PROTEIN_DISTANCE_WEIGHT * (dish.protein - protein_target).abs()
}

/// 100 at the target, falling linearly to 0 at twice the deviation.
fn closeness(actual: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return if actual <= 0.0 { 100.0 } else { 0.0 };
    }
    (100.0 - 100.0 * (actual - target).abs() / target).max(0.0)
}

/// Ratio of distinct dish names to filled slots, as a percentage.
fn variety_score(days: &[DayPlan]) -> f64 {
    let filled: usize = days.iter().map(|d| d.meals.len()).sum();
    if filled == 0 {
        return 0.0;
    }
    let unique: HashSet<&str> = days
        .iter()
        .flat_map(|d| d.meals.iter().map(|m| m.name.as_str()))
        .collect();
    100.0 * unique.len() as f64 / filled as f64
}

/// Closeness of the 3-day average calories and protein to the daily target.
fn balance_score(goal: &NutritionGoal, days: &[DayPlan]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    let n = days.len() as f64;
    let avg_calories = days.iter().map(|d| d.total_calories).sum::<f64>() / n;
    let avg_protein = days.iter().map(|d| d.total_protein).sum::<f64>() / n;
    (closeness(avg_calories, goal.daily_calories) + closeness(avg_protein, goal.daily_protein))
        / 2.0
}

/// Deduplicated ingredients across the distinct dishes of the plan, with a
/// naive keyword aisle. BTreeMap keeps the list deterministic.
fn shopping_list(selected: &[&Dish]) -> Vec<ShoppingItem> {
    let mut seen_dishes: HashSet<Uuid> = HashSet::new();
    let mut aisles: BTreeMap<String, &'static str> = BTreeMap::new();
    for dish in selected {
        if !seen_dishes.insert(dish.id) {
            continue;
        }
        for ingredient in dish.ingredient_list() {
            let aisle = aisle_for(&ingredient);
            aisles.entry(ingredient).or_insert(aisle);
        }
    }
    aisles
        .into_iter()
        .map(|(name, aisle)| ShoppingItem { name, aisle })
        .collect()
}

fn aisle_for(ingredient: &str) -> &'static str {
    const PROTEIN: &[&str] = &[
        "chicken", "beef", "pork", "lamb", "fish", "salmon", "tuna", "shrimp", "prawn", "turkey",
        "tofu", "egg",
    ];
    const DAIRY: &[&str] = &["milk", "cheese", "butter", "cream", "yogurt", "paneer"];
    const PRODUCE: &[&str] = &[
        "tomato", "onion", "lettuce", "spinach", "carrot", "pepper", "cucumber", "garlic",
        "mushroom", "broccoli", "potato", "basil", "cilantro", "lime", "lemon", "apple", "banana",
        "avocado", "cabbage", "bean",
    ];

    if PROTEIN.iter().any(|k| ingredient.contains(k)) {
        "protein"
    } else if DAIRY.iter().any(|k| ingredient.contains(k)) {
        "dairy"
    } else if PRODUCE.iter().any(|k| ingredient.contains(k)) {
        "produce"
    } else {
        "pantry"
    }
}

fn estimates(days: &[DayPlan]) -> (u32, f64) {
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut prep_minutes = 0u32;
    let mut cost = 0.0;
    for day in days {
        for meal in &day.meals {
            cost += meal.price;
            if seen.insert(meal.dish_id) {
                prep_minutes += meal.category.prep_minutes();
            }
        }
    }
    (prep_minutes, cost)
}

fn tips_for(goal: &NutritionGoal) -> Vec<String> {
    let mut tips: Vec<String> = match goal.kind {
        GoalKind::WeightLoss => vec![
            "Keep portions steady and let the calorie deficit do the work.".into(),
            "Front-load protein early in the day to stay full longer.".into(),
        ],
        GoalKind::MuscleGain => vec![
            "Spread protein across all four slots rather than one big meal.".into(),
            "Add an extra snack on training days if you finish under target.".into(),
        ],
        GoalKind::Healthy => vec![
            "Aim for at least two vegetable-forward meals per day.".into(),
            "Swap repeated dishes for a different category to widen variety.".into(),
        ],
        GoalKind::DiabeticFriendly => vec![
            "Prefer the flagged diabetic-friendly dishes and avoid dessert slots.".into(),
            "Pair carbohydrate-heavy meals with protein to flatten glucose spikes.".into(),
        ],
        GoalKind::Keto => vec![
            "Stay under the daily carb ceiling; check rice and noodle dishes first.".into(),
            "Use the fat target as a floor, not a limit, on this profile.".into(),
        ],
    };
    tips.push("Drink water with every meal; thirst often reads as hunger.".into());
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::goals::goal_profile;
    use time::OffsetDateTime;

    fn dish(
        name: &str,
        category: DishCategory,
        calories: f64,
        protein: f64,
        ingredients: &str,
    ) -> Dish {
        Dish {
            id: Uuid::new_v4(),
            chef_id: Uuid::new_v4(),
            name: name.into(),
            category,
            price: 10.0,
            calories,
            protein,
            carbs: 40.0,
            fat: 15.0,
            diabetic_friendly: false,
            vegetarian: false,
            ingredients: ingredients.into(),
            available: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Three near-target candidates per slot for the "healthy" profile
    /// (daily 2000 kcal / 100 g protein).
    fn rich_catalog() -> Vec<Dish> {
        vec![
            dish("Congee Bowl", DishCategory::Breakfast, 480.0, 25.0, "rice, egg"),
            dish("Omelette Plate", DishCategory::Breakfast, 500.0, 25.0, "egg, cheese"),
            dish("Pancake Stack", DishCategory::Breakfast, 520.0, 25.0, "flour, milk"),
            dish("Chicken Rice", DishCategory::Rice, 680.0, 35.0, "chicken, rice"),
            dish("Beef Fried Rice", DishCategory::Rice, 700.0, 35.0, "beef, rice"),
            dish("Prawn Paella", DishCategory::Rice, 720.0, 35.0, "prawn, rice"),
            dish("Grilled Chicken", DishCategory::Meat, 580.0, 30.0, "chicken, herbs"),
            dish("Roast Beef", DishCategory::Meat, 600.0, 30.0, "beef, rosemary"),
            dish("Lamb Chops", DishCategory::Meat, 620.0, 30.0, "lamb, garlic"),
            dish("Trail Mix", DishCategory::Snack, 180.0, 10.0, "almond, raisin"),
            dish("Yogurt Cup", DishCategory::Snack, 200.0, 10.0, "yogurt, honey"),
            dish("Granola Bar", DishCategory::Snack, 220.0, 10.0, "oats, honey"),
        ]
    }

    #[test]
    fn empty_catalog_signals_no_eligible_dishes() {
        let goal = goal_profile(GoalKind::Healthy);
        let err = generate(&goal, &[], &[], &[]).unwrap_err();
        assert_eq!(err, PlanError::NoEligibleDishes);
    }

    #[test]
    fn allergies_can_empty_the_catalog() {
        let goal = goal_profile(GoalKind::Healthy);
        let dishes = vec![
            dish("Satay", DishCategory::Meat, 500.0, 30.0, "chicken, peanut sauce"),
            dish("Peanut Noodles", DishCategory::Noodle, 600.0, 20.0, "noodles, peanut"),
        ];
        let err = generate(&goal, &["peanut".into()], &[], &dishes).unwrap_err();
        assert_eq!(err, PlanError::NoEligibleDishes);
    }

    #[test]
    fn allergy_filtering_is_monotonic() {
        let dishes = rich_catalog();
        let none = filter_dishes(&dishes, &[], &[]).len();
        let one = filter_dishes(&dishes, &["chicken".into()], &[]).len();
        let two = filter_dishes(&dishes, &["chicken".into(), "egg".into()], &[]).len();
        assert!(none >= one);
        assert!(one >= two);
        assert!(two < none);
    }

    #[test]
    fn allergy_matches_name_and_ingredient_text() {
        let dishes = vec![
            dish("Peanut Brittle", DishCategory::Dessert, 300.0, 5.0, "sugar"),
            dish("Pad Thai", DishCategory::Noodle, 550.0, 20.0, "noodles, peanut, lime"),
            dish("Plain Rice", DishCategory::Rice, 400.0, 8.0, "rice"),
        ];
        let eligible = filter_dishes(&dishes, &["peanut".into()], &[]);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].name, "Plain Rice");
    }

    #[test]
    fn vegetarian_preference_uses_the_explicit_flag() {
        let mut veggie = dish("Garden Bowl", DishCategory::Vegetable, 350.0, 12.0, "greens");
        veggie.vegetarian = true;
        let meat = dish("Steak", DishCategory::Meat, 700.0, 45.0, "beef");
        let dishes = vec![veggie, meat];
        let eligible = filter_dishes(&dishes, &[], &["vegetarian".into()]);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].name, "Garden Bowl");
    }

    #[test]
    fn daily_calories_stay_within_tolerance_of_target() {
        let goal = goal_profile(GoalKind::Healthy);
        let dishes = rich_catalog();
        let plan = generate(&goal, &[], &[], &dishes).expect("plan");
        assert_eq!(plan.days.len(), PLAN_DAYS);
        for day in &plan.days {
            let deviation = (day.total_calories - goal.daily_calories).abs() / goal.daily_calories;
            assert!(
                deviation <= 0.15,
                "{} deviates {:.0}% from target ({} kcal)",
                day.label,
                deviation * 100.0,
                day.total_calories
            );
        }
    }

    #[test]
    fn rotation_yields_full_variety_with_enough_candidates() {
        let goal = goal_profile(GoalKind::Healthy);
        let plan = generate(&goal, &[], &[], &rich_catalog()).expect("plan");
        let filled: usize = plan.days.iter().map(|d| d.meals.len()).sum();
        assert_eq!(filled, 12);
        assert!((plan.variety_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn variety_drops_when_candidates_repeat() {
        let goal = goal_profile(GoalKind::Healthy);
        let dishes = vec![
            dish("Omelette Plate", DishCategory::Breakfast, 500.0, 25.0, "egg"),
            dish("Beef Fried Rice", DishCategory::Rice, 700.0, 35.0, "beef, rice"),
            dish("Yogurt Cup", DishCategory::Snack, 200.0, 10.0, "yogurt"),
        ];
        let plan = generate(&goal, &[], &[], &dishes).expect("plan");
        let rich = generate(&goal, &[], &[], &rich_catalog()).expect("plan");
        assert!(plan.variety_score < rich.variety_score);
    }

    #[test]
    fn fit_scores_stay_in_range() {
        let goal = goal_profile(GoalKind::WeightLoss);
        let plan = generate(&goal, &[], &[], &rich_catalog()).expect("plan");
        for day in &plan.days {
            assert!((0.0..=100.0).contains(&day.fit_score));
        }
        assert!((0.0..=100.0).contains(&plan.balance_score));
    }

    #[test]
    fn shopping_list_dedups_and_categorizes() {
        let goal = goal_profile(GoalKind::Healthy);
        let plan = generate(&goal, &[], &[], &rich_catalog()).expect("plan");
        let names: Vec<&str> = plan.shopping_list.iter().map(|i| i.name.as_str()).collect();
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped, "shopping list has duplicates");
        let rice = plan
            .shopping_list
            .iter()
            .find(|i| i.name == "rice")
            .expect("rice in list");
        assert_eq!(rice.aisle, "pantry");
        let chicken = plan
            .shopping_list
            .iter()
            .find(|i| i.name == "chicken")
            .expect("chicken in list");
        assert_eq!(chicken.aisle, "protein");
    }

    #[test]
    fn estimates_sum_prices_and_unique_prep_time() {
        let goal = goal_profile(GoalKind::Healthy);
        let plan = generate(&goal, &[], &[], &rich_catalog()).expect("plan");
        // 12 slots at a flat 10.0 price.
        assert!((plan.estimated_cost - 120.0).abs() < 1e-9);
        // 12 distinct dishes, none soup or salad.
        assert_eq!(plan.prep_minutes, 12 * 30);
    }

    #[test]
    fn diabetic_goal_prefers_flagged_dishes() {
        let goal = goal_profile(GoalKind::DiabeticFriendly);
        let mut flagged = dish("Steamed Fish", DishCategory::Seafood, 450.0, 28.0, "fish");
        flagged.diabetic_friendly = true;
        let unflagged = dish("Fried Chicken", DishCategory::Fried, 650.0, 30.0, "chicken");
        let dishes = vec![flagged, unflagged];
        let plan = generate(&goal, &[], &[], &dishes).expect("plan");
        for day in &plan.days {
            for meal in &day.meals {
                assert_ne!(meal.name, "Fried Chicken");
            }
        }
    }
}
