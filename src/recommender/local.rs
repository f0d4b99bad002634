use async_trait::async_trait;

use crate::analysis::aggregate::OrderAggregate;
use crate::recommender::{
    AnalysisPayload, Alternative, BlindSpot, HealthMetrics, Insight, Priority, Recommendation,
    Recommender, Severity,
};

/// Rule-based strategy, also the fallback for every remote failure. Always
/// succeeds, so analysis never surfaces an error to the caller.
pub struct LocalRules;

impl LocalRules {
    /// Build a payload from the aggregate alone. Generic by design; the
    /// caller supplements it with goal-specific templates.
    pub fn payload(facts: &OrderAggregate) -> AnalysisPayload {
        let mut blind_spots = Vec::new();
        let mut recommendations = Vec::new();
        let mut alternatives = Vec::new();
        let mut insights = Vec::new();

        if let Some((category, count)) = facts.top_category() {
            insights.push(Insight {
                title: "Favourite category".into(),
                description: format!(
                    "{} of your {} items came from the {} category.",
                    count, facts.item_count, category
                ),
                supporting_data: Some(format!("{category}: {count}")),
            });
        }

        if facts.fried_fraction > 0.3 {
            blind_spots.push(BlindSpot {
                title: "Heavy on fried food".into(),
                description: format!(
                    "{:.0}% of your items are fried dishes.",
                    facts.fried_fraction * 100.0
                ),
                severity: if facts.fried_fraction > 0.5 {
                    Severity::High
                } else {
                    Severity::Medium
                },
            });
            alternatives.push(Alternative {
                instead_of: "Fried dishes".into(),
                try_this: "Grilled or steamed options in the same cuisine".into(),
                reason: "Similar flavours with far less oil.".into(),
            });
        }

        if facts.vegetable_fraction < 0.2 {
            recommendations.push(Recommendation {
                title: "Add vegetables".into(),
                action: "Work one vegetable dish into your weekly orders.".into(),
                priority: Priority::Medium,
            });
        }

        if facts.average_calories > 600.0 {
            recommendations.push(Recommendation {
                title: "Lighter picks".into(),
                action: format!(
                    "Your average item is {:.0} kcal; browse the low-calorie filter.",
                    facts.average_calories
                ),
                priority: Priority::Low,
            });
        }

        if recommendations.is_empty() {
            recommendations.push(Recommendation {
                title: "Keep it up".into(),
                action: "Your ordering pattern looks balanced; keep variety high.".into(),
                priority: Priority::Low,
            });
        }

        AnalysisPayload {
            blind_spots,
            recommendations,
            alternatives,
            health_metrics: HealthMetrics {
                health_score: facts.health_score,
                diabetic_risk_pct: facts.diabetic_risk_pct,
                summary: format!(
                    "Estimated health score {:.0}/100 over {} orders.",
                    facts.health_score, facts.order_count
                ),
            },
            insights,
        }
    }
}

#[async_trait]
impl Recommender for LocalRules {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn advise(
        &self,
        _prompt: &str,
        facts: &OrderAggregate,
    ) -> anyhow::Result<AnalysisPayload> {
        Ok(Self::payload(facts))
    }
}
