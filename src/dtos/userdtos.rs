use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::models::usermodel::UserRole;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Subject id is required"))]
    pub subject_id: String,

    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    pub phone_number: Option<String>,

    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateProfileDto {
    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub base_lat: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub base_lng: Option<f64>,
}

/// Declares (or replaces) a provider's capability in one category.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProviderCategoryDto {
    pub category_id: Uuid,

    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NotificationQueryDto {
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateRatingDto {
    pub job_id: Uuid,

    /// The user being rated.
    pub user_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 2000, message = "Feedback must be at most 2000 characters"))]
    pub feedback: Option<String>,
}
