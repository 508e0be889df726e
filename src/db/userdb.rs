use async_trait::async_trait;
use sqlx::{Error, Row};
use std::collections::HashMap;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::*;

const USER_COLUMNS: &str = r#"
    id, subject_id, first_name, last_name, email, phone_number,
    role, bio, profile_picture, base_lat, base_lng, created_at, updated_at
"#;

#[derive(Debug, Clone, serde::Serialize)]
pub struct SeekerDashboard {
    pub open_jobs: i64,
    pub completed_jobs: i64,
    pub active_bids: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderStats {
    pub jobs_won: i64,
    pub jobs_completed: i64,
    pub amount_earned: f64,
}

#[async_trait]
pub trait UserExt {
    async fn create_user(
        &self,
        subject_id: String,
        first_name: String,
        last_name: String,
        email: String,
        phone_number: Option<String>,
        role: UserRole,
    ) -> Result<User, Error>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    async fn get_user_by_subject(&self, subject_id: &str) -> Result<Option<User>, Error>;

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        bio: Option<String>,
        phone_number: Option<String>,
        profile_picture: Option<String>,
        base_lat: Option<f64>,
        base_lng: Option<f64>,
    ) -> Result<User, Error>;

    async fn upsert_provider_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        attributes: HashMap<String, String>,
    ) -> Result<ProviderCategory, Error>;

    async fn get_provider_categories(&self, user_id: Uuid) -> Result<Vec<ProviderCategory>, Error>;

    /// Providers who declared a capability in the given category (new-job
    /// notification fan-out).
    async fn providers_for_category(&self, category_id: Uuid) -> Result<Vec<Uuid>, Error>;

    async fn get_seeker_dashboard(&self, seeker_id: Uuid) -> Result<SeekerDashboard, Error>;

    async fn get_provider_stats(&self, provider_id: Uuid) -> Result<ProviderStats, Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn create_user(
        &self,
        subject_id: String,
        first_name: String,
        last_name: String,
        email: String,
        phone_number: Option<String>,
        role: UserRole,
    ) -> Result<User, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (subject_id, first_name, last_name, email, phone_number, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(subject_id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(phone_number)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE id = $1"#
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_subject(&self, subject_id: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE subject_id = $1"#
        ))
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        bio: Option<String>,
        phone_number: Option<String>,
        profile_picture: Option<String>,
        base_lat: Option<f64>,
        base_lng: Option<f64>,
    ) -> Result<User, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET bio = COALESCE($2, bio),
                phone_number = COALESCE($3, phone_number),
                profile_picture = COALESCE($4, profile_picture),
                base_lat = COALESCE($5, base_lat),
                base_lng = COALESCE($6, base_lng),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(bio)
        .bind(phone_number)
        .bind(profile_picture)
        .bind(base_lat)
        .bind(base_lng)
        .fetch_one(&self.pool)
        .await
    }

    async fn upsert_provider_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        attributes: HashMap<String, String>,
    ) -> Result<ProviderCategory, Error> {
        sqlx::query_as::<_, ProviderCategory>(
            r#"
            INSERT INTO provider_categories (user_id, category_id, attributes)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, category_id)
            DO UPDATE SET attributes = EXCLUDED.attributes
            RETURNING id, user_id, category_id, attributes, created_at
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .bind(sqlx::types::Json(attributes))
        .fetch_one(&self.pool)
        .await
    }

    async fn get_provider_categories(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ProviderCategory>, Error> {
        sqlx::query_as::<_, ProviderCategory>(
            r#"
            SELECT id, user_id, category_id, attributes, created_at
            FROM provider_categories
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn providers_for_category(&self, category_id: Uuid) -> Result<Vec<Uuid>, Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"SELECT DISTINCT user_id FROM provider_categories WHERE category_id = $1"#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn get_seeker_dashboard(&self, seeker_id: Uuid) -> Result<SeekerDashboard, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM jobs WHERE seeker_id = $1 AND status = 'open') AS open_jobs,
                (SELECT COUNT(*) FROM jobs WHERE seeker_id = $1 AND status = 'completed') AS completed_jobs,
                (SELECT COUNT(*) FROM bids WHERE seeker_id = $1 AND status = 'pending') AS active_bids
            "#,
        )
        .bind(seeker_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(SeekerDashboard {
            open_jobs: row.try_get("open_jobs")?,
            completed_jobs: row.try_get("completed_jobs")?,
            active_bids: row.try_get("active_bids")?,
        })
    }

    async fn get_provider_stats(&self, provider_id: Uuid) -> Result<ProviderStats, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM bids WHERE provider_id = $1 AND status = 'accepted') AS jobs_won,
                (SELECT COUNT(*) FROM jobs WHERE provider_id = $1 AND status = 'completed') AS jobs_completed,
                (SELECT COALESCE(SUM(b.amount), 0)::DOUBLE PRECISION
                   FROM bids b
                   JOIN jobs j ON j.id = b.job_id
                  WHERE b.provider_id = $1
                    AND b.status = 'accepted'
                    AND j.status = 'completed') AS amount_earned
            "#,
        )
        .bind(provider_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProviderStats {
            jobs_won: row.try_get("jobs_won")?,
            jobs_completed: row.try_get("jobs_completed")?,
            amount_earned: row.try_get("amount_earned")?,
        })
    }
}
