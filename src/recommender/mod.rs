//! Recommender strategy behind the order analyzer: one remote LLM-backed
//! implementation and one local rule-based implementation, selected by
//! configuration. Any remote failure degrades to the local rules.

pub mod local;
pub mod remote;

pub use local::LocalRules;
pub use remote::RemoteRecommender;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::aggregate::OrderAggregate;
use crate::config::RecommenderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A templated observation about a gap in the ordering pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlindSpot {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recommendation {
    pub title: String,
    pub action: String,
    pub priority: Priority,
}

/// A concrete "instead of X, try Y" swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alternative {
    pub instead_of: String,
    pub try_this: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthMetrics {
    pub health_score: f64,
    pub diabetic_risk_pct: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub supporting_data: Option<String>,
}

/// The full structured reply a strategy must produce. Remote replies are
/// deserialized strictly into this shape; anything that does not fit is a
/// failure, not a guess.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisPayload {
    pub blind_spots: Vec<BlindSpot>,
    pub recommendations: Vec<Recommendation>,
    pub alternatives: Vec<Alternative>,
    pub health_metrics: HealthMetrics,
    pub insights: Vec<Insight>,
}

#[async_trait]
pub trait Recommender: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-shot advice for a prompt built from the aggregate. No retries;
    /// callers fall back to [`LocalRules`] on error.
    async fn advise(&self, prompt: &str, facts: &OrderAggregate)
        -> anyhow::Result<AnalysisPayload>;
}

/// Pick the strategy from configuration: remote when an API key is present,
/// local rules otherwise.
pub fn from_config(cfg: &RecommenderConfig) -> anyhow::Result<Arc<dyn Recommender>> {
    match cfg.api_key.as_deref() {
        Some(key) => Ok(Arc::new(RemoteRecommender::new(cfg, key)?)),
        None => {
            tracing::info!("no recommender API key set; using local rules");
            Ok(Arc::new(LocalRules))
        }
    }
}

/// Extract the first balanced `{...}` block from free text. Brace counting
/// ignores braces inside JSON strings.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_json_object_from_prose() {
        let text = "Sure! Here is your analysis:\n{\"a\": {\"b\": 1}} trailing words";
        assert_eq!(extract_json(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn ignores_braces_inside_strings() {
        let text = r#"{"note": "curly } brace", "n": 2}"#;
        assert_eq!(extract_json(text), Some(text));
    }

    #[test]
    fn no_object_yields_none() {
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json("{unterminated"), None);
    }

    #[test]
    fn payload_rejects_unknown_severity() {
        let raw = r#"{
            "blind_spots": [{"title": "t", "description": "d", "severity": "catastrophic"}],
            "recommendations": [],
            "alternatives": [],
            "health_metrics": {"health_score": 80, "diabetic_risk_pct": 10, "summary": "ok"},
            "insights": []
        }"#;
        assert!(serde_json::from_str::<AnalysisPayload>(raw).is_err());
    }

    #[test]
    fn payload_roundtrip() {
        let raw = r#"{
            "blind_spots": [{"title": "Low fiber", "description": "Few vegetables", "severity": "medium"}],
            "recommendations": [{"title": "Order greens", "action": "Add a vegetable dish weekly", "priority": "high"}],
            "alternatives": [{"instead_of": "Fried chicken", "try_this": "Grilled chicken", "reason": "Less oil"}],
            "health_metrics": {"health_score": 72.5, "diabetic_risk_pct": 20.0, "summary": "Decent"},
            "insights": [{"title": "Repeat orders", "description": "Same dish often", "supporting_data": "5x"}]
        }"#;
        let payload: AnalysisPayload = serde_json::from_str(raw).expect("valid payload");
        assert_eq!(payload.blind_spots[0].severity, Severity::Medium);
        assert_eq!(payload.recommendations[0].priority, Priority::High);
    }
}
