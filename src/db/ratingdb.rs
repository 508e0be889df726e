use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::ratingmodel::Rating;

#[async_trait]
pub trait RatingExt {
    async fn create_rating(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        rating: i32,
        feedback: Option<String>,
    ) -> Result<Rating, Error>;

    async fn list_ratings_for_user(&self, user_id: Uuid) -> Result<Vec<Rating>, Error>;
}

#[async_trait]
impl RatingExt for DBClient {
    async fn create_rating(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        rating: i32,
        feedback: Option<String>,
    ) -> Result<Rating, Error> {
        sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (job_id, user_id, rating, feedback)
            VALUES ($1, $2, $3, $4)
            RETURNING id, job_id, user_id, rating, feedback, created_at
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .bind(rating)
        .bind(feedback)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_ratings_for_user(&self, user_id: Uuid) -> Result<Vec<Rating>, Error> {
        sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, job_id, user_id, rating, feedback, created_at
            FROM ratings
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
