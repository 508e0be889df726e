use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    jobmodel::JobStatus,
    paymentmodel::{PaymentMethod, PaymentStatus},
};

/// Uniform success envelope for every handler.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LocationDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lng: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateJobDto {
    pub seeker_id: Uuid,
    pub category_id: Uuid,

    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: String,

    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: String,

    #[serde(default)]
    pub attributes: HashMap<String, String>,

    #[validate(range(min = 20.0, message = "Budget must be at least 20"))]
    pub budget: f64,

    #[validate]
    pub location: LocationDto,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PlaceBidDto {
    pub provider_id: Uuid,

    #[validate(range(min = 1.0, message = "Bid amount must be positive"))]
    pub amount: f64,

    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobListQueryDto {
    pub status: Option<JobStatus>,
    pub category_id: Option<Uuid>,
    pub seeker_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusDto {
    pub status: JobStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatePaymentDto {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCategoryDto {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,

    /// Attribute name to comma-separated allowed values.
    #[serde(default)]
    pub attribute_schema: HashMap<String, String>,
}
