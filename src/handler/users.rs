use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, patch, post},
    Extension, Router,
};
use futures::stream;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        categorydb::CategoryExt,
        jobdb::{JobExt, JobFilter},
        ratingdb::RatingExt,
        userdb::UserExt,
    },
    dtos::{
        jobdtos::ApiResponse,
        userdtos::{NotificationQueryDto, ProviderCategoryDto, RegisterUserDto, UpdateProfileDto},
    },
    error::{ErrorMessage, HttpError},
    extractors::Json,
    models::usermodel::UserRole,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/", post(register_user))
        .route("/:id", get(get_user).put(update_profile))
        .route("/:id/categories", post(upsert_category).get(list_capabilities))
        .route("/:id/dashboard", get(dashboard))
        .route("/:id/history", get(job_history))
        .route("/:id/ratings", get(list_ratings))
        .route("/:id/notifications", get(list_notifications))
        .route("/:id/notifications/read-all", patch(mark_all_read))
        .route("/:id/events", get(subscribe_events))
}

/// Provisions a user on first sign-in. Idempotent on the identity
/// provider's subject id, so retried callbacks do not duplicate users.
pub async fn register_user(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if let Some(existing) = app_state
        .db_client
        .get_user_by_subject(&body.subject_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
    {
        return Ok((
            StatusCode::OK,
            Json(ApiResponse::success("User already provisioned", existing)),
        ));
    }

    let user = app_state
        .db_client
        .create_user(
            body.subject_id,
            body.first_name,
            body.last_name,
            body.email,
            body.phone_number,
            body.role,
        )
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return HttpError::conflict("A user with this email already exists");
                }
            }
            HttpError::server_error(e.to_string())
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User registered", user)),
    ))
}

pub async fn get_user(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .get_user(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    Ok(Json(ApiResponse::success("User retrieved", user)))
}

pub async fn update_profile(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    app_state
        .db_client
        .get_user(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    let user = app_state
        .db_client
        .update_user_profile(
            user_id,
            body.bio,
            body.phone_number,
            body.profile_picture,
            body.base_lat,
            body.base_lng,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Profile updated", user)))
}

pub async fn upsert_category(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ProviderCategoryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .get_user(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;
    if user.role != UserRole::Provider {
        return Err(HttpError::bad_request(
            "Only providers can declare capabilities",
        ));
    }

    let category = app_state
        .db_client
        .get_category(body.category_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::CategoryNotFound.to_string()))?;
    category
        .check_attributes(&body.attributes)
        .map_err(HttpError::bad_request)?;

    let capability = app_state
        .db_client
        .upsert_provider_category(user_id, body.category_id, body.attributes)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Capability saved", capability)),
    ))
}

pub async fn list_capabilities(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let capabilities = app_state
        .db_client
        .get_provider_categories(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Capabilities retrieved",
        capabilities,
    )))
}

/// Role-aware summary: job counts for seekers, win and earning totals for
/// providers.
pub async fn dashboard(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .get_user(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    let data = match user.role {
        UserRole::Seeker => {
            let dashboard = app_state
                .db_client
                .get_seeker_dashboard(user_id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            serde_json::json!(dashboard)
        }
        UserRole::Provider => {
            let stats = app_state
                .db_client
                .get_provider_stats(user_id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            serde_json::json!(stats)
        }
    };

    Ok(Json(ApiResponse::success("Dashboard retrieved", data)))
}

pub async fn job_history(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .get_user(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    let filter = match user.role {
        UserRole::Seeker => JobFilter {
            seeker_id: Some(user_id),
            ..Default::default()
        },
        UserRole::Provider => JobFilter {
            provider_id: Some(user_id),
            ..Default::default()
        },
    };

    let jobs = app_state
        .db_client
        .list_jobs(filter)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Job history retrieved", jobs)))
}

pub async fn list_ratings(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let ratings = app_state
        .db_client
        .list_ratings_for_user(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Ratings retrieved", ratings)))
}

pub async fn list_notifications(
    Path(user_id): Path<Uuid>,
    Query(query): Query<NotificationQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let limit = query
        .limit
        .unwrap_or(app_state.env.notification_page_size);

    let notifications = app_state
        .notifications
        .list_for_user(user_id, limit)
        .await?;
    let unread = app_state.notifications.unread_count(user_id).await?;

    Ok(Json(ApiResponse::success(
        "Notifications retrieved",
        serde_json::json!({ "notifications": notifications, "unread": unread }),
    )))
}

pub async fn mark_all_read(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let updated = app_state.notifications.mark_all_read(user_id).await?;

    Ok(Json(ApiResponse::success(
        "Notifications marked read",
        serde_json::json!({ "updated": updated }),
    )))
}

/// Long-lived SSE stream of this user's realtime events. The connection is
/// pruned from the registry once the client goes away.
pub async fn subscribe_events(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let rx = app_state.registry.register(user_id).await;

    let stream = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let sse_event = Event::default()
            .event(event.event)
            .data(event.payload.to_string());
        Some((Ok::<Event, Infallible>(sse_event), rx))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
