use async_trait::async_trait;
use sqlx::Error;
use std::collections::HashMap;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::categorymodel::Category;

#[async_trait]
pub trait CategoryExt {
    async fn create_category(
        &self,
        name: String,
        description: String,
        attribute_schema: HashMap<String, String>,
    ) -> Result<Category, Error>;

    async fn get_category(&self, category_id: Uuid) -> Result<Option<Category>, Error>;

    async fn list_categories(&self) -> Result<Vec<Category>, Error>;
}

#[async_trait]
impl CategoryExt for DBClient {
    async fn create_category(
        &self,
        name: String,
        description: String,
        attribute_schema: HashMap<String, String>,
    ) -> Result<Category, Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, attribute_schema)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, attribute_schema, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(sqlx::types::Json(attribute_schema))
        .fetch_one(&self.pool)
        .await
    }

    async fn get_category(&self, category_id: Uuid) -> Result<Option<Category>, Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, attribute_schema, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, attribute_schema, created_at, updated_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
