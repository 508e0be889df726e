use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::post, Extension, Router};
use validator::Validate;

use crate::{
    db::{jobdb::JobExt, ratingdb::RatingExt, userdb::UserExt},
    dtos::{jobdtos::ApiResponse, userdtos::CreateRatingDto},
    error::{ErrorMessage, HttpError},
    extractors::Json,
    models::jobmodel::JobStatus,
    AppState,
};

pub fn ratings_handler() -> Router {
    Router::new().route("/", post(create_rating))
}

pub async fn create_rating(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateRatingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .db_client
        .get_job_by_id(body.job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::JobNotFound.to_string()))?;
    if job.status != JobStatus::Completed {
        return Err(HttpError::bad_request(
            "Only completed jobs can be rated",
        ));
    }

    app_state
        .db_client
        .get_user(body.user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    let rating = app_state
        .db_client
        .create_rating(body.job_id, body.user_id, body.rating, body.feedback)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return HttpError::conflict("This user has already been rated for this job");
                }
            }
            HttpError::server_error(e.to_string())
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Rating submitted", rating)),
    ))
}
