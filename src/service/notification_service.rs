use num_traits::ToPrimitive;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, notificationdb::NotificationExt},
    models::{
        jobmodel::{Bid, Job},
        notificationmodel::{ntype, Notification},
    },
    service::{
        error::ServiceError,
        realtime::{ConnectionRegistry, RealtimeEvent},
    },
};

/// Outbox for user notifications: persists the record, then pushes it to any
/// live connections. The row is the durable fact; push is best-effort and a
/// push miss never unwinds the write.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
    registry: Arc<ConnectionRegistry>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            db_client,
            registry,
        }
    }

    pub async fn notify(
        &self,
        user_id: Uuid,
        ntype: &str,
        title: String,
        message: String,
        data: serde_json::Value,
    ) -> Result<Notification, ServiceError> {
        let notification = self
            .db_client
            .create_notification(user_id, ntype, title, message, data)
            .await?;

        let delivered = self
            .registry
            .publish(
                user_id,
                RealtimeEvent::new("notification", serde_json::json!(&notification)),
            )
            .await;
        tracing::debug!(
            "notification {} for user {} pushed to {} connection(s)",
            notification.id,
            user_id,
            delivered
        );

        Ok(notification)
    }

    pub async fn notify_new_job(
        &self,
        job: &Job,
        provider_ids: &[Uuid],
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "new job notification: '{}' in {} to {} provider(s)",
            job.title,
            job.category_name,
            provider_ids.len()
        );
        for provider_id in provider_ids {
            self.notify(
                *provider_id,
                ntype::NEW_JOB,
                "New job available".to_string(),
                format!("New job available: \"{}\" in {}", job.title, job.category_name),
                serde_json::json!({ "job_id": job.id, "category": job.category_name }),
            )
            .await?;
        }
        Ok(())
    }

    pub async fn notify_new_bid(&self, job: &Job, bid: &Bid) -> Result<(), ServiceError> {
        let amount = bid.amount.to_f64().unwrap_or(0.0);
        self.notify(
            job.seeker_id,
            ntype::NEW_BID,
            format!("New bid for {}", job.title),
            format!("New bid of {amount} received for job: {}", job.title),
            serde_json::json!({ "job_id": job.id, "bid_id": bid.id, "bid_amount": amount }),
        )
        .await?;
        Ok(())
    }

    pub async fn notify_bid_accepted(&self, job: &Job, bid: &Bid) -> Result<(), ServiceError> {
        let amount = bid.amount.to_f64().unwrap_or(0.0);

        self.notify(
            bid.provider_id,
            ntype::BID_ACCEPTED,
            "Bid accepted".to_string(),
            format!("Your bid of {amount} on \"{}\" was accepted", job.title),
            serde_json::json!({ "job_id": job.id, "bid_id": bid.id, "bid_amount": amount }),
        )
        .await?;

        self.notify(
            job.seeker_id,
            ntype::JOB_STATUS,
            "Job in progress".to_string(),
            format!("Your job \"{}\" is now in progress", job.title),
            serde_json::json!({ "job_id": job.id }),
        )
        .await?;

        Ok(())
    }

    pub async fn notify_bid_rejected(&self, job: &Job, bid: &Bid) -> Result<(), ServiceError> {
        self.notify(
            bid.provider_id,
            ntype::BID_REJECTED,
            "Bid rejected".to_string(),
            format!("Your bid on \"{}\" was rejected", job.title),
            serde_json::json!({ "job_id": job.id, "bid_id": bid.id }),
        )
        .await?;
        Ok(())
    }

    pub async fn notify_job_completed(&self, job: &Job) -> Result<(), ServiceError> {
        self.notify(
            job.seeker_id,
            ntype::JOB_COMPLETED,
            "Job completed".to_string(),
            format!("Your job \"{}\" is completed", job.title),
            serde_json::json!({ "job_id": job.id }),
        )
        .await?;

        if let Some(provider_id) = job.provider_id {
            self.notify(
                provider_id,
                ntype::JOB_COMPLETED,
                "Job completed".to_string(),
                format!("Job \"{}\" has been marked completed", job.title),
                serde_json::json!({ "job_id": job.id }),
            )
            .await?;
        }

        Ok(())
    }

    pub async fn notify_job_cancelled(
        &self,
        job: &Job,
        bidder_ids: &[Uuid],
    ) -> Result<(), ServiceError> {
        for user_id in bidder_ids {
            self.notify(
                *user_id,
                ntype::JOB_CANCELLED,
                "Job cancelled".to_string(),
                format!("Job \"{}\" was cancelled", job.title),
                serde_json::json!({ "job_id": job.id }),
            )
            .await?;
        }

        if let Some(provider_id) = job.provider_id {
            self.notify(
                provider_id,
                ntype::JOB_CANCELLED,
                "Job cancelled".to_string(),
                format!("Job \"{}\" was cancelled", job.title),
                serde_json::json!({ "job_id": job.id }),
            )
            .await?;
        }

        Ok(())
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.db_client.list_notifications(user_id, limit).await?)
    }

    pub async fn mark_read(&self, notification_id: Uuid) -> Result<Notification, ServiceError> {
        self.db_client
            .mark_notification_read(notification_id)
            .await?
            .ok_or(ServiceError::NotificationNotFound(notification_id))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(self.db_client.mark_all_notifications_read(user_id).await?)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, ServiceError> {
        Ok(self.db_client.unread_notification_count(user_id).await?)
    }
}
