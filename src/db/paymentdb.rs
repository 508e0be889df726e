use async_trait::async_trait;
use sqlx::types::BigDecimal;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::paymentmodel::*;

const PAYMENT_COLUMNS: &str = r#"
    id, job_id, amount, method, status, created_at, updated_at
"#;

#[async_trait]
pub trait PaymentExt {
    async fn create_payment(&self, job_id: Uuid, amount: BigDecimal) -> Result<Payment, Error>;

    async fn get_payment_by_job(&self, job_id: Uuid) -> Result<Option<Payment>, Error>;

    async fn update_payment(
        &self,
        job_id: Uuid,
        method: PaymentMethod,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, Error>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn create_payment(&self, job_id: Uuid, amount: BigDecimal) -> Result<Payment, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (job_id, amount)
            VALUES ($1, $2)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_payment_by_job(&self, job_id: Uuid) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"SELECT {PAYMENT_COLUMNS} FROM payments WHERE job_id = $1"#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_payment(
        &self,
        job_id: Uuid,
        method: PaymentMethod,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET method = $2, status = $3, updated_at = NOW()
            WHERE job_id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(method)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }
}
