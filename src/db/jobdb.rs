use async_trait::async_trait;
use sqlx::Error;
use std::collections::HashMap;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::*;

pub const JOB_COLUMNS: &str = r#"
    id, seeker_id, provider_id, category_id, category_name, title, description,
    attributes, budget, agreed_amount, lat, lng, status, completed_at,
    created_at, updated_at
"#;

/// Listing filter covering the common views: open jobs, a seeker's jobs,
/// and a provider's job history.
#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub category_id: Option<Uuid>,
    pub seeker_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
}

#[async_trait]
pub trait JobExt {
    #[allow(clippy::too_many_arguments)]
    async fn create_job(
        &self,
        seeker_id: Uuid,
        category_id: Uuid,
        category_name: String,
        title: String,
        description: String,
        attributes: HashMap<String, String>,
        budget: f64,
        lat: f64,
        lng: f64,
    ) -> Result<Job, Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, Error>;

    async fn list_open_jobs_in_categories(
        &self,
        category_ids: &[Uuid],
    ) -> Result<Vec<Job>, Error>;

    /// Conditional status write: only succeeds when the job is still in
    /// `from`, checked atomically at the storage layer. `None` means the
    /// guard failed (the job moved on or does not exist).
    async fn update_job_status(
        &self,
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        seeker_id: Uuid,
        category_id: Uuid,
        category_name: String,
        title: String,
        description: String,
        attributes: HashMap<String, String>,
        budget: f64,
        lat: f64,
        lng: f64,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs
                (seeker_id, category_id, category_name, title, description,
                 attributes, budget, lat, lng, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'open')
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(seeker_id)
        .bind(category_id)
        .bind(category_name)
        .bind(title)
        .bind(description)
        .bind(sqlx::types::Json(attributes))
        .bind(budget)
        .bind(lat)
        .bind(lng)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE ($1::job_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::uuid IS NULL OR seeker_id = $3)
              AND ($4::uuid IS NULL OR provider_id = $4)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.status)
        .bind(filter.category_id)
        .bind(filter.seeker_id)
        .bind(filter.provider_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_open_jobs_in_categories(
        &self,
        category_ids: &[Uuid],
    ) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE status = 'open' AND category_id = ANY($1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(category_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_job_status(
        &self,
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = $3,
                completed_at = CASE WHEN $3 = 'completed'::job_status
                                    THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
    }
}
