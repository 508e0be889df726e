use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::{ErrorMessage, HttpError},
    models::jobmodel::JobStatus,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Bid {0} not found")]
    BidNotFound(Uuid),

    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("Category {0} not found")]
    CategoryNotFound(Uuid),

    #[error("No payment found for job {0}")]
    PaymentNotFound(Uuid),

    #[error("Notification {0} not found")]
    NotificationNotFound(Uuid),

    #[error("No pending bid on job {job_id} from provider {provider_id}")]
    PendingBidNotFound { job_id: Uuid, provider_id: Uuid },

    #[error("Job {job_id} is {status:?}, action requires {required:?}")]
    InvalidState {
        job_id: Uuid,
        status: JobStatus,
        required: JobStatus,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("Payment already exists for job {0}")]
    DuplicatePayment(Uuid),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// Translates unique-constraint violations from bid inserts into the
    /// domain conflicts they enforce; everything else stays a storage error.
    pub fn from_bid_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return match db_err.constraint() {
                    Some("bids_job_id_provider_id_key") => {
                        ServiceError::Conflict(ErrorMessage::DuplicateBid.to_string())
                    }
                    Some("idx_bids_one_outstanding") => {
                        ServiceError::Conflict(ErrorMessage::OutstandingBid.to_string())
                    }
                    _ => ServiceError::Conflict("Conflicting bid".to_string()),
                };
            }
        }
        ServiceError::Database(err)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::BidNotFound(_)
            | ServiceError::UserNotFound(_)
            | ServiceError::CategoryNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::NotificationNotFound(_)
            | ServiceError::PendingBidNotFound { .. } => StatusCode::NOT_FOUND,

            ServiceError::InvalidState { .. } | ServiceError::Conflict(_) => StatusCode::CONFLICT,

            // Surfaced as 400s on the wire, not 409/412.
            ServiceError::DuplicatePayment(_)
            | ServiceError::PreconditionFailed(_)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        let message = match &error {
            ServiceError::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        if let ServiceError::Database(ref e) = error {
            tracing::error!("storage failure: {}", e);
        }
        HttpError::new(message, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        assert_eq!(
            ServiceError::JobNotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::InvalidState {
                job_id: Uuid::nil(),
                status: JobStatus::Completed,
                required: JobStatus::Open,
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DuplicatePayment(Uuid::nil()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::PreconditionFailed("payment".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Conflict("bid".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let err: HttpError = ServiceError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
