use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        categories::categories_handler,
        jobs::{bids_handler, jobs_handler, providers_handler},
        notifications::notifications_handler,
        ratings::ratings_handler,
        users::users_handler,
    },
    AppState,
};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .nest("/users", users_handler())
        .nest("/categories", categories_handler())
        .nest("/jobs", jobs_handler())
        .nest("/bids", bids_handler())
        .nest("/providers", providers_handler())
        .nest("/notifications", notifications_handler())
        .nest("/ratings", ratings_handler());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
