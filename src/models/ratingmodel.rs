use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub feedback: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
