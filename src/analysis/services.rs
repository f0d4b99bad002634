use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::analysis::aggregate::{aggregate_orders, DishCount, OrderAggregate};
use crate::orders::repo_types::{Order, OrderItem};
use crate::planner::goals::GoalKind;
use crate::recommender::{
    AnalysisPayload, BlindSpot, LocalRules, Priority, Recommendation, Recommender, Severity,
};

/// Exact-prompt memo for the lifetime of the process. No eviction; the key
/// space is small (one entry per distinct history/goal snapshot).
#[derive(Clone, Default)]
pub struct AnalysisCache {
    inner: Arc<Mutex<HashMap<String, AnalysisPayload>>>,
}

impl AnalysisCache {
    pub fn get(&self, prompt: &str) -> Option<AnalysisPayload> {
        self.inner
            .lock()
            .ok()
            .and_then(|map| map.get(prompt).cloned())
    }

    pub fn put(&self, prompt: String, payload: AnalysisPayload) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(prompt, payload);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: i64,
    pub percent: f64,
}

/// Numbers the front end charts directly.
#[derive(Debug, Clone, Serialize)]
pub struct VisualMetrics {
    pub health_score: f64,
    pub diabetic_risk_pct: f64,
    pub average_calories: f64,
    pub total_spend: f64,
    pub average_spend: f64,
    pub category_breakdown: Vec<CategoryShare>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// "low" when the history is too thin to say anything useful.
    pub confidence: &'static str,
    /// Which strategy produced the base payload: remote, local or cache.
    pub source: &'static str,
    #[serde(flatten)]
    pub payload: AnalysisPayload,
    pub visual_metrics: VisualMetrics,
    pub aggregated: OrderAggregate,
}

/// Analyze a user's order history. Infallible by design: remote strategy
/// errors degrade to the local rules, and an empty history yields a
/// low-confidence report.
pub async fn analyze(
    recommender: &dyn Recommender,
    cache: &AnalysisCache,
    orders: &[Order],
    items: &[OrderItem],
    goal: GoalKind,
) -> AnalysisReport {
    let facts = aggregate_orders(orders, items);

    if orders.is_empty() {
        return insufficient_data_report(facts);
    }

    let prompt = build_prompt(&facts, goal);

    let (mut payload, source) = match cache.get(&prompt) {
        Some(hit) => {
            debug!("analysis prompt served from cache");
            (hit, "cache")
        }
        None => {
            let (payload, source) = match recommender.advise(&prompt, &facts).await {
                Ok(payload) => (payload, recommender.name()),
                Err(e) => {
                    warn!(error = %e, strategy = recommender.name(), "recommender failed; using local rules");
                    (LocalRules::payload(&facts), "local")
                }
            };
            cache.put(prompt, payload.clone());
            (payload, source)
        }
    };

    payload.blind_spots.extend(local_blind_spots(&facts));
    payload.recommendations.extend(goal_recommendations(goal));

    let visual_metrics = visual_metrics(&facts);
    AnalysisReport {
        confidence: "normal",
        source,
        payload,
        visual_metrics,
        aggregated: facts,
    }
}

fn insufficient_data_report(facts: OrderAggregate) -> AnalysisReport {
    let mut payload = LocalRules::payload(&facts);
    payload.insights.clear();
    payload.insights.push(crate::recommender::Insight {
        title: "Not enough history".into(),
        description: "Place a few orders and the analysis will have something to work with.".into(),
        supporting_data: None,
    });
    let visual_metrics = visual_metrics(&facts);
    AnalysisReport {
        confidence: "low",
        source: "local",
        payload,
        visual_metrics,
        aggregated: facts,
    }
}

/// Natural-language prompt embedding the aggregate, asking for a JSON reply
/// in the strict payload schema.
pub fn build_prompt(facts: &OrderAggregate, goal: GoalKind) -> String {
    let categories: Vec<String> = facts
        .category_counts
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect();
    let top_dishes: Vec<String> = facts
        .top_dishes
        .iter()
        .map(|d| format!("{} ({}x)", d.name, d.count))
        .collect();

    format!(
        "You are a nutrition assistant for a food-delivery app. A user with the goal \
         '{goal}' has {orders} orders totalling {items} items. Category counts: {categories}. \
         Most ordered: {dishes}. Average calories per item: {calories:.0}. Average spend per \
         order: {spend:.2}. Estimated health score: {health:.0}/100; diabetic risk {risk:.0}%. \
         Reply with a single JSON object with keys blind_spots (title, description, severity \
         low|medium|high), recommendations (title, action, priority low|medium|high), \
         alternatives (instead_of, try_this, reason), health_metrics (health_score, \
         diabetic_risk_pct, summary) and insights (title, description, supporting_data).",
        goal = goal.as_str(),
        orders = facts.order_count,
        items = facts.item_count,
        categories = categories.join(", "),
        dishes = top_dishes.join(", "),
        calories = facts.average_calories,
        spend = facts.average_spend,
        health = facts.health_score,
        risk = facts.diabetic_risk_pct,
    )
}

/// Deterministic blind spots computed locally and appended regardless of
/// which strategy produced the base payload.
fn local_blind_spots(facts: &OrderAggregate) -> Vec<BlindSpot> {
    let mut spots = Vec::new();
    if facts.fried_fraction > 0.5 {
        spots.push(BlindSpot {
            title: "Mostly fried".into(),
            description: format!(
                "Over half of your items ({:.0}%) are fried dishes.",
                facts.fried_fraction * 100.0
            ),
            severity: Severity::High,
        });
    }
    if facts.vegetable_fraction < 0.1 {
        spots.push(BlindSpot {
            title: "Low fiber".into(),
            description: "Vegetable dishes are almost absent from your history.".into(),
            severity: Severity::Medium,
        });
    }
    if facts.average_calories > 700.0 {
        spots.push(BlindSpot {
            title: "Calorie-dense picks".into(),
            description: format!(
                "The average item weighs in at {:.0} kcal.",
                facts.average_calories
            ),
            severity: Severity::Medium,
        });
    }
    spots
}

fn goal_recommendations(goal: GoalKind) -> Vec<Recommendation> {
    match goal {
        GoalKind::WeightLoss => vec![Recommendation {
            title: "Mind the portions".into(),
            action: "Filter the menu by low-calorie dishes when ordering lunch.".into(),
            priority: Priority::High,
        }],
        GoalKind::MuscleGain => vec![Recommendation {
            title: "Protein first".into(),
            action: "Favour meat, seafood and high-protein dishes in your cart.".into(),
            priority: Priority::High,
        }],
        GoalKind::Healthy => vec![Recommendation {
            title: "Rotate categories".into(),
            action: "Try a category you have not ordered from this month.".into(),
            priority: Priority::Medium,
        }],
        GoalKind::DiabeticFriendly => vec![Recommendation {
            title: "Use the diabetic filter".into(),
            action: "Stick to flagged diabetic-friendly dishes and skip desserts.".into(),
            priority: Priority::High,
        }],
        GoalKind::Keto => vec![Recommendation {
            title: "Watch the carbs".into(),
            action: "Rice and noodle dishes will blow the carb budget; check labels.".into(),
            priority: Priority::High,
        }],
    }
}

fn visual_metrics(facts: &OrderAggregate) -> VisualMetrics {
    let total = facts.item_count.max(1) as f64;
    let category_breakdown = facts
        .category_counts
        .iter()
        .map(|(category, &count)| CategoryShare {
            category: category.clone(),
            count,
            percent: 100.0 * count as f64 / total,
        })
        .collect();
    VisualMetrics {
        health_score: facts.health_score,
        diabetic_risk_pct: facts.diabetic_risk_pct,
        average_calories: facts.average_calories,
        total_spend: facts.total_spend,
        average_spend: facts.average_spend,
        category_breakdown,
    }
}

/// Rule-based analytics for one chef over the lines sold from their menu.
#[derive(Debug, Clone, Serialize)]
pub struct ChefAnalytics {
    pub revenue: f64,
    pub order_count: usize,
    pub item_count: i64,
    pub top_dishes: Vec<DishCount>,
    pub category_mix: BTreeMap<String, i64>,
}

pub fn chef_analytics(items: &[OrderItem]) -> ChefAnalytics {
    let mut revenue = 0.0;
    let mut item_count = 0i64;
    let mut orders: HashSet<Uuid> = HashSet::new();
    let mut dish_counts: BTreeMap<String, i64> = BTreeMap::new();
    let mut category_mix: BTreeMap<String, i64> = BTreeMap::new();

    for item in items {
        let qty = item.quantity.max(0);
        revenue += item.price * qty as f64;
        item_count += qty;
        orders.insert(item.order_id);
        *dish_counts.entry(item.name.clone()).or_default() += qty;
        *category_mix
            .entry(item.category.as_str().to_string())
            .or_default() += qty;
    }

    let mut top_dishes: Vec<DishCount> = dish_counts
        .into_iter()
        .map(|(name, count)| DishCount { name, count })
        .collect();
    top_dishes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    top_dishes.truncate(5);

    ChefAnalytics {
        revenue,
        order_count: orders.len(),
        item_count,
        top_dishes,
        category_mix,
    }
}
