use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub role: String, // "client" or "chef"
    pub loyalty_points: i64,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn is_chef(&self) -> bool {
        self.role == "chef"
    }
}
