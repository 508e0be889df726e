use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::HttpError;

/// JSON body extractor that keeps rejections on the documented error
/// contract: a missing field or malformed body is a 400 with the standard
/// `{"status":"error","message":...}` envelope, not axum's default 422.
pub struct Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(HttpError::bad_request(rejection.body_text())),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    use crate::dtos::jobdtos::CreateJobDto;

    async fn create(Json(_body): Json<CreateJobDto>) -> StatusCode {
        StatusCode::CREATED
    }

    fn app() -> Router {
        Router::new().route("/jobs", post(create))
    }

    async fn post_json(app: Router, body: String) -> (StatusCode, String) {
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/jobs")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_required_fields_are_a_400() {
        let body = serde_json::json!({
            "seeker_id": uuid::Uuid::new_v4(),
            "category_id": uuid::Uuid::new_v4(),
        });
        let (status, body) = post_json(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains(r#""status":"error""#), "got {body}");
    }

    #[tokio::test]
    async fn malformed_json_is_a_400() {
        let (status, body) = post_json(app(), "not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains(r#""status":"error""#), "got {body}");
    }

    #[tokio::test]
    async fn well_formed_bodies_pass_through() {
        let body = serde_json::json!({
            "seeker_id": uuid::Uuid::new_v4(),
            "category_id": uuid::Uuid::new_v4(),
            "title": "Fix kitchen sink",
            "description": "Leaking trap under the sink",
            "budget": 100.0,
            "location": { "lat": -24.63, "lng": 25.92 },
        });
        let (status, _) = post_json(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}
