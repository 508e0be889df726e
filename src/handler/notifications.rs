use std::sync::Arc;

use axum::{extract::Path, response::IntoResponse, routing::patch, Extension, Router};
use uuid::Uuid;

use crate::{dtos::jobdtos::ApiResponse, error::HttpError, extractors::Json, AppState};

pub fn notifications_handler() -> Router {
    Router::new().route("/:id/read", patch(mark_read))
}

pub async fn mark_read(
    Path(notification_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let notification = app_state.notifications.mark_read(notification_id).await?;

    Ok(Json(ApiResponse::success(
        "Notification marked read",
        notification,
    )))
}
