use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Settings for the order-analysis recommender. Without an API key the
/// service runs with the local rule-based strategy only.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommenderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub primary_url: String,
    pub fallback_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub recommender: RecommenderConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "homeplate".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "homeplate-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let recommender = RecommenderConfig {
            api_key: std::env::var("RECOMMENDER_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
            model: std::env::var("RECOMMENDER_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            primary_url: std::env::var("RECOMMENDER_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".into()),
            fallback_url: std::env::var("RECOMMENDER_FALLBACK_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            timeout_secs: std::env::var("RECOMMENDER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(20),
        };
        Ok(Self {
            database_url,
            jwt,
            recommender,
        })
    }
}
