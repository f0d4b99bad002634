use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::analysis::aggregate::OrderAggregate;
use crate::config::RecommenderConfig;
use crate::recommender::{extract_json, AnalysisPayload, Recommender};

/// Chat-completions backed strategy. Endpoints are tried in order; the
/// reply text must contain a JSON object matching [`AnalysisPayload`].
pub struct RemoteRecommender {
    client: reqwest::Client,
    endpoints: Vec<String>,
    api_key: String,
    model: String,
}

impl RemoteRecommender {
    pub fn new(cfg: &RecommenderConfig, api_key: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()?;

        let mut endpoints = vec![cfg.primary_url.clone()];
        if let Some(fallback) = &cfg.fallback_url {
            endpoints.push(fallback.clone());
        }

        Ok(Self {
            client,
            endpoints,
            api_key: api_key.to_string(),
            model: cfg.model.clone(),
        })
    }

    async fn request(&self, url: &str, prompt: &str) -> anyhow::Result<AnalysisPayload> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.4,
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let value: serde_json::Value = response.json().await?;
        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("reply has no message content"))?;

        let raw = extract_json(content)
            .ok_or_else(|| anyhow::anyhow!("reply contains no JSON object"))?;

        // Strict: a reply that does not match the schema is treated the
        // same as a network failure.
        let payload: AnalysisPayload = serde_json::from_str(raw)?;
        debug!(url, "remote recommender reply accepted");
        Ok(payload)
    }
}

#[async_trait]
impl Recommender for RemoteRecommender {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn advise(
        &self,
        prompt: &str,
        _facts: &OrderAggregate,
    ) -> anyhow::Result<AnalysisPayload> {
        let mut last_error = None;
        for url in &self.endpoints {
            match self.request(url, prompt).await {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    warn!(url, error = %e, "remote recommender endpoint failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no recommender endpoints configured")))
    }
}
