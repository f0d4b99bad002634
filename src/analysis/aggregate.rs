//! Pure aggregation over a user's order history. Recomputed on every
//! analysis call; callers memo per prompt, not here.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::catalog::repo_types::DishCategory;
use crate::orders::repo_types::{Order, OrderItem};

const FRIED_PENALTY: f64 = 40.0;
const VEGETABLE_BONUS: f64 = 20.0;
const RISK_PENALTY: f64 = 0.3;

#[derive(Debug, Clone, Serialize)]
pub struct DishCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderAggregate {
    pub order_count: usize,
    /// Total item quantity across all orders.
    pub item_count: i64,
    pub total_spend: f64,
    pub average_spend: f64,
    /// Mean calories per item.
    pub average_calories: f64,
    pub category_counts: BTreeMap<String, i64>,
    pub ingredient_counts: BTreeMap<String, i64>,
    pub chef_counts: BTreeMap<String, i64>,
    pub top_dishes: Vec<DishCount>,
    pub fried_fraction: f64,
    pub vegetable_fraction: f64,
    /// Share of fried + dessert items, as a percentage.
    pub diabetic_risk_pct: f64,
    pub health_score: f64,
}

impl OrderAggregate {
    pub fn top_category(&self) -> Option<(&str, i64)> {
        self.category_counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(name, &count)| (name.as_str(), count))
    }
}

/// Aggregate consumption statistics from order headers and lines. All
/// counts are weighted by quantity. Missing nutrition fields were already
/// defaulted to zero at the row level.
pub fn aggregate_orders(orders: &[Order], items: &[OrderItem]) -> OrderAggregate {
    let mut agg = OrderAggregate {
        order_count: orders.len(),
        ..OrderAggregate::default()
    };

    agg.total_spend = orders.iter().map(|o| o.total).sum();
    agg.average_spend = if orders.is_empty() {
        0.0
    } else {
        agg.total_spend / orders.len() as f64
    };

    let mut calorie_sum = 0.0;
    let mut fried = 0i64;
    let mut vegetable = 0i64;
    let mut dessert = 0i64;
    let mut dish_counts: BTreeMap<String, i64> = BTreeMap::new();

    for item in items {
        let qty = item.quantity.max(0);
        agg.item_count += qty;
        calorie_sum += item.calories * qty as f64;

        *agg.category_counts
            .entry(item.category.as_str().to_string())
            .or_default() += qty;
        *agg.chef_counts.entry(item.chef_id.to_string()).or_default() += qty;
        *dish_counts.entry(item.name.clone()).or_default() += qty;

        let ingredients: HashSet<String> = item
            .ingredients
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        for ingredient in ingredients {
            *agg.ingredient_counts.entry(ingredient).or_default() += qty;
        }

        match item.category {
            DishCategory::Fried => fried += qty,
            DishCategory::Vegetable => vegetable += qty,
            DishCategory::Dessert => dessert += qty,
            _ => {}
        }
    }

    if agg.item_count > 0 {
        let total = agg.item_count as f64;
        agg.average_calories = calorie_sum / total;
        agg.fried_fraction = fried as f64 / total;
        agg.vegetable_fraction = vegetable as f64 / total;
        agg.diabetic_risk_pct = 100.0 * (fried + dessert) as f64 / total;
    }

    agg.health_score = health_score(
        agg.fried_fraction,
        agg.vegetable_fraction,
        agg.diabetic_risk_pct,
    );

    let mut top: Vec<DishCount> = dish_counts
        .into_iter()
        .map(|(name, count)| DishCount { name, count })
        .collect();
    top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    top.truncate(5);
    agg.top_dishes = top;

    agg
}

/// Start at 100, penalize the fried share, reward the vegetable share,
/// penalize scaled diabetic risk, clamp to [0, 100]. Monotonically
/// non-increasing in the fried fraction.
fn health_score(fried_fraction: f64, vegetable_fraction: f64, risk_pct: f64) -> f64 {
    (100.0 - FRIED_PENALTY * fried_fraction + VEGETABLE_BONUS * vegetable_fraction
        - RISK_PENALTY * risk_pct)
        .clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn order(total: f64) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            subtotal: total,
            discount: 0.0,
            total,
            promo_code: None,
            points_earned: 0,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn item(order_id: Uuid, name: &str, category: DishCategory, calories: f64) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            order_id,
            dish_id: Uuid::new_v4(),
            chef_id: Uuid::new_v4(),
            name: name.into(),
            category,
            price: 10.0,
            calories,
            ingredients: String::new(),
            quantity: 1,
        }
    }

    #[test]
    fn empty_history_aggregates_to_zeros() {
        let agg = aggregate_orders(&[], &[]);
        assert_eq!(agg.order_count, 0);
        assert_eq!(agg.item_count, 0);
        assert_eq!(agg.average_calories, 0.0);
        assert_eq!(agg.diabetic_risk_pct, 0.0);
        // Neutral history scores a full 100.
        assert_eq!(agg.health_score, 100.0);
    }

    #[test]
    fn fried_and_vegetable_example_matches_the_aggregation_rule() {
        // 3 orders, each one fried item (450 kcal) and one vegetable item
        // (120 kcal): counts 3/3, average calories (450+120)/2 = 285.
        let orders: Vec<Order> = (0..3).map(|_| order(20.0)).collect();
        let mut items = Vec::new();
        for o in &orders {
            items.push(item(o.id, "Fried Chicken", DishCategory::Fried, 450.0));
            items.push(item(o.id, "Stir-fry Greens", DishCategory::Vegetable, 120.0));
        }
        let agg = aggregate_orders(&orders, &items);
        assert_eq!(agg.category_counts.get("fried"), Some(&3));
        assert_eq!(agg.category_counts.get("vegetable"), Some(&3));
        assert!((agg.average_calories - 285.0).abs() < 1e-9);
        assert_eq!(agg.order_count, 3);
        assert_eq!(agg.total_spend, 60.0);
    }

    #[test]
    fn health_score_is_monotone_in_fried_fraction() {
        let o = order(10.0);
        let all_fried: Vec<OrderItem> = (0..4)
            .map(|i| item(o.id, &format!("Fried {i}"), DishCategory::Fried, 450.0))
            .collect();
        let half_veg: Vec<OrderItem> = (0..4)
            .map(|i| {
                if i < 2 {
                    item(o.id, &format!("Fried {i}"), DishCategory::Fried, 450.0)
                } else {
                    item(o.id, &format!("Veg {i}"), DishCategory::Vegetable, 120.0)
                }
            })
            .collect();

        let orders = vec![o.clone()];
        let fried_score = aggregate_orders(&orders, &all_fried).health_score;
        let mixed_score = aggregate_orders(&orders, &half_veg).health_score;
        assert!(fried_score < mixed_score);

        // No fried items at all scores even better.
        let all_veg: Vec<OrderItem> = (0..4)
            .map(|i| item(o.id, &format!("Veg {i}"), DishCategory::Vegetable, 120.0))
            .collect();
        let veg_score = aggregate_orders(&orders, &all_veg).health_score;
        assert!(mixed_score < veg_score);
    }

    #[test]
    fn quantities_weight_every_histogram() {
        let o = order(30.0);
        let mut line = item(o.id, "Dumplings", DishCategory::Fried, 300.0);
        line.quantity = 3;
        line.ingredients = "pork, flour".into();
        let agg = aggregate_orders(&[o], &[line]);
        assert_eq!(agg.item_count, 3);
        assert_eq!(agg.category_counts.get("fried"), Some(&3));
        assert_eq!(agg.ingredient_counts.get("pork"), Some(&3));
        assert_eq!(agg.top_dishes[0].count, 3);
        assert!((agg.average_calories - 300.0).abs() < 1e-9);
    }

    #[test]
    fn top_dishes_rank_by_count_then_name() {
        let o = order(50.0);
        let items = vec![
            item(o.id, "Pho", DishCategory::Noodle, 500.0),
            item(o.id, "Pho", DishCategory::Noodle, 500.0),
            item(o.id, "Banh Mi", DishCategory::Snack, 400.0),
            item(o.id, "Laksa", DishCategory::Noodle, 550.0),
        ];
        let agg = aggregate_orders(&[o], &items);
        assert_eq!(agg.top_dishes[0].name, "Pho");
        assert_eq!(agg.top_dishes[1].name, "Banh Mi");
        assert_eq!(agg.top_dishes[2].name, "Laksa");
    }
}
