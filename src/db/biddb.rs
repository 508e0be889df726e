use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::BigDecimal;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use super::jobdb::JOB_COLUMNS;
use crate::models::jobmodel::*;

const BID_COLUMNS: &str = r#"
    id, job_id, provider_id, seeker_id, amount, message, status, created_at
"#;

/// Bid joined with the provider's display profile, for seeker-facing lists.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BidWithProvider {
    pub id: Uuid,
    pub job_id: Uuid,
    pub provider_id: Uuid,
    pub seeker_id: Uuid,
    pub amount: BigDecimal,
    pub message: Option<String>,
    pub status: BidStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub provider_first_name: String,
    pub provider_last_name: String,
    pub provider_picture: Option<String>,
    pub provider_bio: Option<String>,
}

#[async_trait]
pub trait BidExt {
    /// Inserts a bid, conditional on the job still being open; `None` means
    /// the job moved on between the caller's read and the insert.
    async fn create_bid(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
        seeker_id: Uuid,
        amount: f64,
        message: Option<String>,
    ) -> Result<Option<Bid>, Error>;

    async fn get_bid_by_id(&self, bid_id: Uuid) -> Result<Option<Bid>, Error>;

    async fn list_bids_for_job(&self, job_id: Uuid) -> Result<Vec<BidWithProvider>, Error>;

    async fn list_bids_by_provider(&self, provider_id: Uuid) -> Result<Vec<Bid>, Error>;

    /// Providers with a still-pending bid on the job (used to fan out
    /// cancellation notices).
    async fn pending_bidders_for_job(&self, job_id: Uuid) -> Result<Vec<Uuid>, Error>;

    /// Atomically accepts a bid: conditionally moves the job from Open to
    /// InProgress, rejects all sibling bids and marks this one accepted, in
    /// one transaction. Returns `None` (and changes nothing) when the job is
    /// no longer open; of two concurrent accepts, exactly one gets `Some`.
    async fn accept_bid(&self, bid: &Bid) -> Result<Option<(Job, Bid)>, Error>;

    async fn reject_bid(&self, bid_id: Uuid) -> Result<Option<Bid>, Error>;

    async fn withdraw_bid(&self, job_id: Uuid, provider_id: Uuid) -> Result<Option<Bid>, Error>;
}

#[async_trait]
impl BidExt for DBClient {
    async fn create_bid(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
        seeker_id: Uuid,
        amount: f64,
        message: Option<String>,
    ) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            INSERT INTO bids (job_id, provider_id, seeker_id, amount, message)
            SELECT $1, $2, $3, $4, $5
            WHERE EXISTS (SELECT 1 FROM jobs WHERE id = $1 AND status = 'open')
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(provider_id)
        .bind(seeker_id)
        .bind(amount)
        .bind(message)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_bid_by_id(&self, bid_id: Uuid) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"SELECT {BID_COLUMNS} FROM bids WHERE id = $1"#
        ))
        .bind(bid_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_bids_for_job(&self, job_id: Uuid) -> Result<Vec<BidWithProvider>, Error> {
        sqlx::query_as::<_, BidWithProvider>(
            r#"
            SELECT b.id, b.job_id, b.provider_id, b.seeker_id, b.amount,
                   b.message, b.status, b.created_at,
                   u.first_name AS provider_first_name,
                   u.last_name AS provider_last_name,
                   u.profile_picture AS provider_picture,
                   u.bio AS provider_bio
            FROM bids b
            JOIN users u ON u.id = b.provider_id
            WHERE b.job_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_bids_by_provider(&self, provider_id: Uuid) -> Result<Vec<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            SELECT {BID_COLUMNS}
            FROM bids
            WHERE provider_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn pending_bidders_for_job(&self, job_id: Uuid) -> Result<Vec<Uuid>, Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"SELECT provider_id FROM bids WHERE job_id = $1 AND status = 'pending'"#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn accept_bid(&self, bid: &Bid) -> Result<Option<(Job, Bid)>, Error> {
        let mut tx = self.pool.begin().await?;

        // The guard: the job must still be Open. Zero rows means another
        // accept (or a cancel) got there first; roll everything back.
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'in_progress',
                provider_id = $2,
                agreed_amount = $3,
                updated_at = NOW()
            WHERE id = $1 AND status = 'open'
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(bid.job_id)
        .bind(bid.provider_id)
        .bind(&bid.amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(job) = job else {
            tx.rollback().await?;
            return Ok(None);
        };

        // Siblings first, so the one-accepted-per-job index never trips.
        sqlx::query(
            r#"
            UPDATE bids SET status = 'rejected'
            WHERE job_id = $1 AND id <> $2 AND status = 'pending'
            "#,
        )
        .bind(bid.job_id)
        .bind(bid.id)
        .execute(&mut *tx)
        .await?;

        // The bid itself can vanish under us (a concurrent withdraw);
        // surface that as RowNotFound and undo the job update.
        let accepted = sqlx::query_as::<_, Bid>(&format!(
            r#"
            UPDATE bids SET status = 'accepted'
            WHERE id = $1
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(bid.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(accepted) = accepted else {
            tx.rollback().await?;
            return Err(Error::RowNotFound);
        };

        tx.commit().await?;

        Ok(Some((job, accepted)))
    }

    async fn reject_bid(&self, bid_id: Uuid) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            UPDATE bids SET status = 'rejected'
            WHERE id = $1
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(bid_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn withdraw_bid(&self, job_id: Uuid, provider_id: Uuid) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            DELETE FROM bids
            WHERE job_id = $1 AND provider_id = $2 AND status = 'pending'
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;
    use std::collections::HashMap;

    use crate::db::{categorydb::CategoryExt, jobdb::JobExt, userdb::UserExt};
    use crate::models::usermodel::{User, UserRole};

    async fn seed_user(db: &DBClient, role: UserRole) -> User {
        db.create_user(
            Uuid::new_v4().to_string(),
            "Thabo".to_string(),
            "Nkosi".to_string(),
            format!("{}@example.com", Uuid::new_v4()),
            None,
            role,
        )
        .await
        .unwrap()
    }

    async fn seed_open_job(db: &DBClient, seeker: &User) -> Job {
        let category = db
            .create_category(
                format!("Plumbing-{}", Uuid::new_v4()),
                "Pipes and fittings".to_string(),
                HashMap::new(),
            )
            .await
            .unwrap();
        db.create_job(
            seeker.id,
            category.id,
            category.name.clone(),
            "Fix kitchen sink".to_string(),
            "Leaking trap under the sink".to_string(),
            HashMap::new(),
            100.0,
            -24.63,
            25.92,
        )
        .await
        .unwrap()
    }

    #[sqlx::test]
    async fn concurrent_accepts_have_exactly_one_winner(pool: PgPool) {
        let db = DBClient::new(pool);
        let seeker = seed_user(&db, UserRole::Seeker).await;
        let first = seed_user(&db, UserRole::Provider).await;
        let second = seed_user(&db, UserRole::Provider).await;
        let job = seed_open_job(&db, &seeker).await;

        let bid_one = db
            .create_bid(job.id, first.id, seeker.id, 110.0, None)
            .await
            .unwrap()
            .unwrap();
        let bid_two = db
            .create_bid(job.id, second.id, seeker.id, 120.0, None)
            .await
            .unwrap()
            .unwrap();

        let (one, two) = tokio::join!(db.accept_bid(&bid_one), db.accept_bid(&bid_two));
        let winners: Vec<_> = [one.unwrap(), two.unwrap()].into_iter().flatten().collect();
        assert_eq!(winners.len(), 1);

        let (job_after, accepted) = &winners[0];
        assert_eq!(job_after.status, JobStatus::InProgress);
        assert_eq!(job_after.provider_id, Some(accepted.provider_id));

        let loser_id = if accepted.id == bid_one.id {
            bid_two.id
        } else {
            bid_one.id
        };
        let loser = db.get_bid_by_id(loser_id).await.unwrap().unwrap();
        assert_eq!(loser.status, BidStatus::Rejected);
    }

    #[sqlx::test]
    async fn accept_on_a_non_open_job_changes_nothing(pool: PgPool) {
        let db = DBClient::new(pool);
        let seeker = seed_user(&db, UserRole::Seeker).await;
        let provider = seed_user(&db, UserRole::Provider).await;
        let job = seed_open_job(&db, &seeker).await;
        let bid = db
            .create_bid(job.id, provider.id, seeker.id, 110.0, None)
            .await
            .unwrap()
            .unwrap();

        db.update_job_status(job.id, JobStatus::Open, JobStatus::Cancelled)
            .await
            .unwrap()
            .unwrap();

        let result = db.accept_bid(&bid).await.unwrap();
        assert!(result.is_none());

        let job_after = db.get_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(job_after.status, JobStatus::Cancelled);
        assert!(job_after.provider_id.is_none());
        assert!(job_after.agreed_amount.is_none());

        let bid_after = db.get_bid_by_id(bid.id).await.unwrap().unwrap();
        assert_eq!(bid_after.status, BidStatus::Pending);
    }

    #[sqlx::test]
    async fn accept_of_a_withdrawn_bid_rolls_back(pool: PgPool) {
        let db = DBClient::new(pool);
        let seeker = seed_user(&db, UserRole::Seeker).await;
        let provider = seed_user(&db, UserRole::Provider).await;
        let job = seed_open_job(&db, &seeker).await;
        let bid = db
            .create_bid(job.id, provider.id, seeker.id, 110.0, None)
            .await
            .unwrap()
            .unwrap();

        db.withdraw_bid(job.id, provider.id)
            .await
            .unwrap()
            .unwrap();

        let err = db.accept_bid(&bid).await.unwrap_err();
        assert!(matches!(err, Error::RowNotFound));

        let job_after = db.get_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(job_after.status, JobStatus::Open);
        assert!(job_after.provider_id.is_none());
        assert!(job_after.agreed_amount.is_none());
    }

    #[sqlx::test]
    async fn bids_cannot_land_on_a_non_open_job(pool: PgPool) {
        let db = DBClient::new(pool);
        let seeker = seed_user(&db, UserRole::Seeker).await;
        let provider = seed_user(&db, UserRole::Provider).await;
        let job = seed_open_job(&db, &seeker).await;

        db.update_job_status(job.id, JobStatus::Open, JobStatus::Cancelled)
            .await
            .unwrap()
            .unwrap();

        let result = db
            .create_bid(job.id, provider.id, seeker.id, 110.0, None)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(db.list_bids_for_job(job.id).await.unwrap().is_empty());
    }
}
