use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::created;
use crate::{
    entities::review, errors::ServiceError, services::reviews::CreateReviewInput, ApiResponse,
    AppState,
};

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "c4d5e6f7-0a1b-4c2d-8e3f-4a5b6c7d8e9f",
    "request_id": "0b6f2f8e-3f5d-4a8b-9a2e-7c1d5e6f7a8b",
    "partner_id": "7d3c1a52-5c1e-4c7a-9a55-0f1c2b3d4e5f",
    "rating": 4,
    "comment": "Picked up on time",
    "created_at": "2024-03-02T09:00:00Z"
}))]
pub struct ReviewResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub partner_id: Uuid,
    /// 1 to 5
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<review::Model> for ReviewResponse {
    fn from(model: review::Model) -> Self {
        Self {
            id: model.id,
            request_id: model.request_id,
            partner_id: model.partner_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/requests/:id/reviews",
    request_body = CreateReviewInput,
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 201, description = "Review created", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Rating out of range", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Request not delivered or already reviewed", body = crate::errors::ErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<CreateReviewInput>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>), ServiceError> {
    let review = state
        .services
        .reviews
        .create_review(request_id, payload)
        .await?;
    Ok(created(ReviewResponse::from(review)))
}
