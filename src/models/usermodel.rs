use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Seeker,
    Provider,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub subject_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub base_lat: Option<f64>,
    pub base_lng: Option<f64>,
    pub created_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
    pub updated_at: Option<DateTime<Utc>>,
}

/// A provider's declared capability: one category plus the attribute values
/// they cover within it (drawn from the category's attribute schema).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ProviderCategory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub attributes: Json<HashMap<String, String>>,
    pub created_at: Option<DateTime<Utc>>,
}
