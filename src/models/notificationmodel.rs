use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ntype: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub data: serde_json::Value,
    pub created_at: Option<DateTime<Utc>>,
}

/// Well-known notification type strings. Kept as consts rather than an enum
/// so the column stays free-form for future event kinds.
pub mod ntype {
    pub const NEW_JOB: &str = "new_job";
    pub const NEW_BID: &str = "new_bid";
    pub const BID_ACCEPTED: &str = "bid_accepted";
    pub const BID_REJECTED: &str = "bid_rejected";
    pub const JOB_STATUS: &str = "job_status";
    pub const JOB_COMPLETED: &str = "job_completed";
    pub const JOB_CANCELLED: &str = "job_cancelled";
}
