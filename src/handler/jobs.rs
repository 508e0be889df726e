use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        biddb::BidExt,
        jobdb::{JobExt, JobFilter},
    },
    dtos::jobdtos::{
        ApiResponse, CreateJobDto, JobListQueryDto, PlaceBidDto, UpdatePaymentDto, UpdateStatusDto,
    },
    error::{ErrorMessage, HttpError},
    extractors::Json,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", post(create_job).get(list_jobs))
        .route("/:id", get(get_job))
        .route("/:id/status", put(update_status))
        .route("/:id/complete", post(complete_job))
        .route("/:id/cancel", post(cancel_job))
        .route("/:id/bids", post(place_bid).get(list_bids))
        .route("/:id/bids/:provider_id", delete(withdraw_bid))
        .route("/:id/payment", post(create_payment).get(get_payment).put(update_payment))
        .route("/:id/score/:provider_id", get(score_provider))
}

pub fn bids_handler() -> Router {
    Router::new()
        .route("/:id/accept", post(accept_bid))
        .route("/:id/reject", post(reject_bid))
}

pub fn providers_handler() -> Router {
    Router::new()
        .route("/:id/bids", get(provider_bids))
        .route("/:id/open-jobs", get(provider_open_jobs))
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .lifecycle
        .create_job(
            body.seeker_id,
            body.category_id,
            body.title,
            body.description,
            body.attributes,
            body.budget,
            body.location.lat,
            body.location.lng,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Job created", job)),
    ))
}

pub async fn list_jobs(
    Query(query): Query<JobListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .db_client
        .list_jobs(JobFilter {
            status: query.status,
            category_id: query.category_id,
            seeker_id: query.seeker_id,
            provider_id: query.provider_id,
        })
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Jobs retrieved", jobs)))
}

pub async fn get_job(
    Path(job_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::JobNotFound.to_string()))?;

    Ok(Json(ApiResponse::success("Job retrieved", job)))
}

pub async fn update_status(
    Path(job_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<UpdateStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.lifecycle.set_status(job_id, body.status).await?;

    Ok(Json(ApiResponse::success("Job status updated", job)))
}

pub async fn complete_job(
    Path(job_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.lifecycle.complete_job(job_id).await?;

    Ok(Json(ApiResponse::success("Job completed", job)))
}

pub async fn cancel_job(
    Path(job_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.lifecycle.cancel_job(job_id).await?;

    Ok(Json(ApiResponse::success("Job cancelled", job)))
}

pub async fn place_bid(
    Path(job_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<PlaceBidDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let bid = app_state
        .lifecycle
        .place_bid(job_id, body.provider_id, body.amount, body.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Bid placed", bid)),
    ))
}

pub async fn list_bids(
    Path(job_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    // 404 on unknown jobs rather than an empty list.
    app_state
        .db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::JobNotFound.to_string()))?;

    let bids = app_state
        .db_client
        .list_bids_for_job(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Bids retrieved", bids)))
}

pub async fn withdraw_bid(
    Path((job_id, provider_id)): Path<(Uuid, Uuid)>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let bid = app_state.lifecycle.withdraw_bid(job_id, provider_id).await?;

    Ok(Json(ApiResponse::success("Bid withdrawn", bid)))
}

pub async fn accept_bid(
    Path(bid_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let (job, bid) = app_state.lifecycle.accept_bid(bid_id).await?;

    Ok(Json(ApiResponse::success(
        "Bid accepted",
        serde_json::json!({ "job": job, "bid": bid }),
    )))
}

pub async fn reject_bid(
    Path(bid_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let bid = app_state.lifecycle.reject_bid(bid_id).await?;

    Ok(Json(ApiResponse::success("Bid rejected", bid)))
}

pub async fn create_payment(
    Path(job_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state.lifecycle.create_payment(job_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Payment created", payment)),
    ))
}

pub async fn get_payment(
    Path(job_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let state = app_state.lifecycle.payment_state(job_id).await?;

    Ok(Json(ApiResponse::success("Payment retrieved", state)))
}

pub async fn update_payment(
    Path(job_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<UpdatePaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .lifecycle
        .update_payment(job_id, body.method, body.status)
        .await?;

    Ok(Json(ApiResponse::success("Payment updated", payment)))
}

pub async fn score_provider(
    Path((job_id, provider_id)): Path<(Uuid, Uuid)>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let score = app_state
        .matching
        .score_job_for_provider(job_id, provider_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Match score computed",
        serde_json::json!({ "job_id": job_id, "provider_id": provider_id, "score": score }),
    )))
}

pub async fn provider_bids(
    Path(provider_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let bids = app_state
        .db_client
        .list_bids_by_provider(provider_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Bids retrieved", bids)))
}

pub async fn provider_open_jobs(
    Path(provider_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let matches = app_state.matching.ranked_open_jobs(provider_id).await?;

    Ok(Json(ApiResponse::success("Open jobs ranked", matches)))
}
