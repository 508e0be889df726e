use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{
        biddb::BidExt,
        categorydb::CategoryExt,
        db::DBClient,
        jobdb::JobExt,
        paymentdb::PaymentExt,
        userdb::UserExt,
    },
    error::ErrorMessage,
    models::{
        jobmodel::{Bid, BidStatus, Job, JobStatus},
        paymentmodel::{Payment, PaymentMethod, PaymentStatus},
        usermodel::UserRole,
    },
    service::{error::ServiceError, notification_service::NotificationService},
};

/// Payment view for a job; `exists` is false until a payment record has been
/// created, so clients can distinguish "no payment yet" from a failed one.
#[derive(Debug, Serialize)]
pub struct PaymentState {
    pub exists: bool,
    pub payment: Option<Payment>,
}

/// Completion is gated on a completed payment record.
fn payment_gate(payment: Option<&Payment>) -> Result<(), ServiceError> {
    match payment {
        None => Err(ServiceError::PreconditionFailed(
            ErrorMessage::PaymentNotFound.to_string(),
        )),
        Some(p) if p.status != PaymentStatus::Completed => Err(ServiceError::PreconditionFailed(
            ErrorMessage::PaymentNotCompleted.to_string(),
        )),
        Some(_) => Ok(()),
    }
}

/// Orchestrates every job status change. All writes to `jobs.status` go
/// through here (or through the atomic accept in the bid store), each one a
/// conditional update that re-checks the current status at the database.
#[derive(Debug, Clone)]
pub struct JobLifecycleService {
    db_client: Arc<DBClient>,
    notifications: NotificationService,
}

impl JobLifecycleService {
    pub fn new(db_client: Arc<DBClient>, notifications: NotificationService) -> Self {
        Self {
            db_client,
            notifications,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_job(
        &self,
        seeker_id: Uuid,
        category_id: Uuid,
        title: String,
        description: String,
        attributes: HashMap<String, String>,
        budget: f64,
        lat: f64,
        lng: f64,
    ) -> Result<Job, ServiceError> {
        let seeker = self
            .db_client
            .get_user(seeker_id)
            .await?
            .ok_or(ServiceError::UserNotFound(seeker_id))?;
        if seeker.role != UserRole::Seeker {
            return Err(ServiceError::Validation(
                "Only seekers can post jobs".to_string(),
            ));
        }

        let category = self
            .db_client
            .get_category(category_id)
            .await?
            .ok_or(ServiceError::CategoryNotFound(category_id))?;
        category
            .check_attributes(&attributes)
            .map_err(ServiceError::Validation)?;

        let job = self
            .db_client
            .create_job(
                seeker_id,
                category_id,
                category.name.clone(),
                title,
                description,
                attributes,
                budget,
                lat,
                lng,
            )
            .await?;

        // Side effects after the write are best-effort; the job exists
        // whether or not anyone heard about it.
        match self.db_client.providers_for_category(category_id).await {
            Ok(providers) => {
                if let Err(err) = self.notifications.notify_new_job(&job, &providers).await {
                    tracing::warn!("new-job notification failed for job {}: {}", job.id, err);
                }
            }
            Err(err) => {
                tracing::warn!("provider fan-out lookup failed for job {}: {}", job.id, err);
            }
        }

        Ok(job)
    }

    pub async fn place_bid(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
        amount: f64,
        message: Option<String>,
    ) -> Result<Bid, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        let provider = self
            .db_client
            .get_user(provider_id)
            .await?
            .ok_or(ServiceError::UserNotFound(provider_id))?;
        if provider.role != UserRole::Provider {
            return Err(ServiceError::Validation(
                "Only providers can place bids".to_string(),
            ));
        }
        if provider_id == job.seeker_id {
            return Err(ServiceError::Validation(
                "You cannot bid on your own job".to_string(),
            ));
        }

        if job.status != JobStatus::Open {
            return Err(ServiceError::InvalidState {
                job_id,
                status: job.status,
                required: JobStatus::Open,
            });
        }

        // Duplicate and outstanding-bid rules are unique indexes; let the
        // insert race and translate the violation. The insert is itself
        // conditional on the job still being open, so a cancel or accept
        // landing after the read above cannot gain a late pending bid.
        let Some(bid) = self
            .db_client
            .create_bid(job_id, provider_id, job.seeker_id, amount, message)
            .await
            .map_err(ServiceError::from_bid_insert)?
        else {
            let status = self
                .db_client
                .get_job_by_id(job_id)
                .await?
                .map(|j| j.status)
                .ok_or(ServiceError::JobNotFound(job_id))?;
            return Err(ServiceError::InvalidState {
                job_id,
                status,
                required: JobStatus::Open,
            });
        };

        if let Err(err) = self.notifications.notify_new_bid(&job, &bid).await {
            tracing::warn!("new-bid notification failed for bid {}: {}", bid.id, err);
        }

        Ok(bid)
    }

    pub async fn accept_bid(&self, bid_id: Uuid) -> Result<(Job, Bid), ServiceError> {
        let bid = self
            .db_client
            .get_bid_by_id(bid_id)
            .await?
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        let result = self
            .db_client
            .accept_bid(&bid)
            .await
            .map_err(|err| match err {
                // The bid was withdrawn under us; the transaction rolled back.
                sqlx::Error::RowNotFound => ServiceError::BidNotFound(bid.id),
                other => ServiceError::Database(other),
            })?;

        let Some((job, accepted)) = result else {
            // The job left Open between the read and the accept, or was
            // never open. Report the status we can still observe.
            let status = self
                .db_client
                .get_job_by_id(bid.job_id)
                .await?
                .map(|j| j.status)
                .ok_or(ServiceError::JobNotFound(bid.job_id))?;
            return Err(ServiceError::InvalidState {
                job_id: bid.job_id,
                status,
                required: JobStatus::Open,
            });
        };

        if let Err(err) = self.notifications.notify_bid_accepted(&job, &accepted).await {
            tracing::warn!(
                "acceptance notification failed for bid {}: {}",
                accepted.id,
                err
            );
        }

        Ok((job, accepted))
    }

    pub async fn reject_bid(&self, bid_id: Uuid) -> Result<Bid, ServiceError> {
        let bid = self
            .db_client
            .get_bid_by_id(bid_id)
            .await?
            .ok_or(ServiceError::BidNotFound(bid_id))?;
        if bid.status != BidStatus::Pending {
            return Err(ServiceError::Conflict(
                "Only pending bids can be rejected".to_string(),
            ));
        }

        let rejected = self
            .db_client
            .reject_bid(bid_id)
            .await?
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        if let Some(job) = self.db_client.get_job_by_id(rejected.job_id).await? {
            if let Err(err) = self.notifications.notify_bid_rejected(&job, &rejected).await {
                tracing::warn!(
                    "rejection notification failed for bid {}: {}",
                    rejected.id,
                    err
                );
            }
        }

        Ok(rejected)
    }

    /// Removes a provider's pending bid. Accepted bids cannot be withdrawn;
    /// the job has already moved on.
    pub async fn withdraw_bid(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Bid, ServiceError> {
        self.db_client
            .withdraw_bid(job_id, provider_id)
            .await?
            .ok_or(ServiceError::PendingBidNotFound {
                job_id,
                provider_id,
            })
    }

    pub async fn create_payment(&self, job_id: Uuid) -> Result<Payment, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.status != JobStatus::InProgress {
            return Err(ServiceError::InvalidState {
                job_id,
                status: job.status,
                required: JobStatus::InProgress,
            });
        }

        let amount = job.agreed_amount.clone().unwrap_or_else(|| job.budget.clone());

        self.db_client
            .create_payment(job_id, amount)
            .await
            .map_err(|err| {
                if let sqlx::Error::Database(ref db_err) = err {
                    if db_err.is_unique_violation() {
                        return ServiceError::DuplicatePayment(job_id);
                    }
                }
                ServiceError::Database(err)
            })
    }

    pub async fn payment_state(&self, job_id: Uuid) -> Result<PaymentState, ServiceError> {
        self.db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        let payment = self.db_client.get_payment_by_job(job_id).await?;
        Ok(PaymentState {
            exists: payment.is_some(),
            payment,
        })
    }

    pub async fn update_payment(
        &self,
        job_id: Uuid,
        method: PaymentMethod,
        status: PaymentStatus,
    ) -> Result<Payment, ServiceError> {
        self.db_client
            .update_payment(job_id, method, status)
            .await?
            .ok_or(ServiceError::PaymentNotFound(job_id))
    }

    pub async fn complete_job(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        let payment = self.db_client.get_payment_by_job(job_id).await?;
        payment_gate(payment.as_ref())?;

        let completed = self
            .db_client
            .update_job_status(job_id, JobStatus::InProgress, JobStatus::Completed)
            .await?
            .ok_or(ServiceError::InvalidState {
                job_id,
                status: job.status,
                required: JobStatus::InProgress,
            })?;

        if let Err(err) = self.notifications.notify_job_completed(&completed).await {
            tracing::warn!(
                "completion notification failed for job {}: {}",
                completed.id,
                err
            );
        }

        Ok(completed)
    }

    pub async fn cancel_job(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        match job.status {
            JobStatus::Open => {
                // Snapshot before the update; the cancel rejects nothing, so
                // pending bidders keep their rows but get told the job is gone.
                let bidders = self.db_client.pending_bidders_for_job(job_id).await?;
                let cancelled = self
                    .db_client
                    .update_job_status(job_id, JobStatus::Open, JobStatus::Cancelled)
                    .await?
                    .ok_or(ServiceError::InvalidState {
                        job_id,
                        status: job.status,
                        required: JobStatus::Open,
                    })?;
                if let Err(err) = self
                    .notifications
                    .notify_job_cancelled(&cancelled, &bidders)
                    .await
                {
                    tracing::warn!(
                        "cancellation notification failed for job {}: {}",
                        cancelled.id,
                        err
                    );
                }
                Ok(cancelled)
            }
            JobStatus::InProgress => {
                let cancelled = self
                    .db_client
                    .update_job_status(job_id, JobStatus::InProgress, JobStatus::Cancelled)
                    .await?
                    .ok_or(ServiceError::InvalidState {
                        job_id,
                        status: job.status,
                        required: JobStatus::InProgress,
                    })?;
                if let Err(err) = self.notifications.notify_job_cancelled(&cancelled, &[]).await
                {
                    tracing::warn!(
                        "cancellation notification failed for job {}: {}",
                        cancelled.id,
                        err
                    );
                }
                Ok(cancelled)
            }
            status => Err(ServiceError::InvalidState {
                job_id,
                status,
                required: JobStatus::Open,
            }),
        }
    }

    /// Administrative status endpoint. Targets route through the same guarded
    /// paths as the dedicated operations; InProgress is only reachable by
    /// accepting a bid, so it is not settable here.
    pub async fn set_status(&self, job_id: Uuid, to: JobStatus) -> Result<Job, ServiceError> {
        match to {
            JobStatus::Completed => self.complete_job(job_id).await,
            JobStatus::Cancelled => self.cancel_job(job_id).await,
            other => Err(ServiceError::Validation(format!(
                "Status '{}' cannot be set directly",
                other.to_str()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use sqlx::types::BigDecimal;
    use sqlx::PgPool;

    use crate::db::notificationdb::NotificationExt;
    use crate::models::notificationmodel::ntype;
    use crate::models::usermodel::User;
    use crate::service::realtime::ConnectionRegistry;

    fn payment_with(status: PaymentStatus) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            amount: BigDecimal::from(100),
            method: PaymentMethod::Pending,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn completion_requires_a_payment_record() {
        let err = payment_gate(None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No payment found for this job");
    }

    #[test]
    fn completion_requires_the_payment_to_be_completed() {
        for status in [PaymentStatus::Pending, PaymentStatus::Failed] {
            let payment = payment_with(status);
            let err = payment_gate(Some(&payment)).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(err.to_string(), "Payment is not completed");
        }
    }

    #[test]
    fn completed_payment_passes_the_gate() {
        let payment = payment_with(PaymentStatus::Completed);
        assert!(payment_gate(Some(&payment)).is_ok());
    }

    async fn seed_user(db: &DBClient, role: UserRole) -> User {
        db.create_user(
            Uuid::new_v4().to_string(),
            "Lesedi".to_string(),
            "Mokoena".to_string(),
            format!("{}@example.com", Uuid::new_v4()),
            None,
            role,
        )
        .await
        .unwrap()
    }

    #[sqlx::test]
    async fn accepting_a_bid_assigns_the_job_and_notifies_the_provider(pool: PgPool) {
        let db_client = Arc::new(DBClient::new(pool));
        let registry = Arc::new(ConnectionRegistry::new());
        let notifications = NotificationService::new(db_client.clone(), registry);
        let lifecycle = JobLifecycleService::new(db_client.clone(), notifications);

        let seeker = seed_user(&db_client, UserRole::Seeker).await;
        let provider = seed_user(&db_client, UserRole::Provider).await;
        let category = db_client
            .create_category(
                "Plumbing".to_string(),
                "Pipes and fittings".to_string(),
                HashMap::new(),
            )
            .await
            .unwrap();

        let job = lifecycle
            .create_job(
                seeker.id,
                category.id,
                "Fix kitchen sink".to_string(),
                "Leaking trap under the sink".to_string(),
                HashMap::new(),
                100.0,
                -24.63,
                25.92,
            )
            .await
            .unwrap();

        let bid = lifecycle
            .place_bid(job.id, provider.id, 110.0, None)
            .await
            .unwrap();

        let (job_after, accepted) = lifecycle.accept_bid(bid.id).await.unwrap();
        assert_eq!(job_after.status, JobStatus::InProgress);
        assert_eq!(job_after.provider_id, Some(provider.id));
        assert_eq!(job_after.agreed_amount, Some(BigDecimal::from(110)));
        assert_eq!(accepted.status, BidStatus::Accepted);

        let provider_inbox = db_client.list_notifications(provider.id, 10).await.unwrap();
        assert!(provider_inbox.iter().any(|n| n.ntype == ntype::BID_ACCEPTED));
    }
}
