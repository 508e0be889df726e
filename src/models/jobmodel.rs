use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::{BigDecimal, Json};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    // Reserved: present in the schema but never produced by any transition.
    Pending,
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Open => "open",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// The lifecycle transition table. The lifecycle service is the only
    /// writer of a job's status and consults this before every update.
    pub fn can_transition_to(&self, to: JobStatus) -> bool {
        match (self, to) {
            (JobStatus::Open, JobStatus::InProgress) => true,
            (JobStatus::Open, JobStatus::Cancelled) => true,
            (JobStatus::InProgress, JobStatus::Completed) => true,
            (JobStatus::InProgress, JobStatus::Cancelled) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "bid_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub seeker_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub category_id: Uuid,
    pub category_name: String,
    pub title: String,
    pub description: String,
    pub attributes: Json<HashMap<String, String>>,
    pub budget: BigDecimal,
    pub agreed_amount: Option<BigDecimal>,
    pub lat: f64,
    pub lng: f64,
    pub status: JobStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: Uuid,
    pub job_id: Uuid,
    pub provider_id: Uuid,
    // Denormalized from the job at insert time; the job store's write path
    // is the only place that sets it.
    pub seeker_id: Uuid,
    pub amount: BigDecimal,
    pub message: Option<String>,
    pub status: BidStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_jobs_can_start_or_cancel() {
        assert!(JobStatus::Open.can_transition_to(JobStatus::InProgress));
        assert!(JobStatus::Open.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Open.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Open.can_transition_to(JobStatus::Pending));
    }

    #[test]
    fn in_progress_jobs_can_complete_or_cancel() {
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::InProgress.can_transition_to(JobStatus::Open));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for to in [
            JobStatus::Pending,
            JobStatus::Open,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            assert!(!JobStatus::Completed.can_transition_to(to));
            assert!(!JobStatus::Cancelled.can_transition_to(to));
        }
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn pending_is_unreachable() {
        for from in [
            JobStatus::Pending,
            JobStatus::Open,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            assert!(!from.can_transition_to(JobStatus::Pending));
        }
        // And nothing leaves it either; it is reserved, not a design target.
        for to in [
            JobStatus::Open,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            assert!(!JobStatus::Pending.can_transition_to(to));
        }
    }
}
