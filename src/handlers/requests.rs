use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{created, PaginationParams};
use crate::{
    entities::request::{self, RequestStatus},
    errors::ServiceError,
    services::requests::{CreateRequestInput, FranchiseHandoffInput, RequestFilter},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Only requests currently in this status
    pub status: Option<RequestStatus>,
    /// Only requests assigned to this partner
    pub partner_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "0b6f2f8e-3f5d-4a8b-9a2e-7c1d5e6f7a8b",
    "package_id": "5a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d",
    "partner_id": "7d3c1a52-5c1e-4c7a-9a55-0f1c2b3d4e5f",
    "tracking_number": "QT8K2M4P6R9T",
    "current_status": "pickedup",
    "is_verified": true,
    "requested_at": "2024-03-01T10:30:00Z",
    "confirmed_at": "2024-03-01T10:45:00Z",
    "picked_at": "2024-03-01T12:00:00Z",
    "created_at": "2024-03-01T10:30:00Z",
    "updated_at": "2024-03-01T12:00:00Z"
}))]
pub struct RequestResponse {
    pub id: Uuid,
    pub package_id: Uuid,
    pub partner_id: Option<Uuid>,
    pub tracking_number: String,
    pub current_status: RequestStatus,
    pub is_verified: bool,
    pub franchise_tracking_id: Option<String>,
    pub franchise_receipt_url: Option<String>,
    /// Only returned when the request is created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_time_code: Option<String>,
    pub requested_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub picked_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<request::Model> for RequestResponse {
    fn from(model: request::Model) -> Self {
        Self {
            id: model.id,
            package_id: model.package_id,
            partner_id: model.partner_id,
            tracking_number: model.tracking_number,
            current_status: model.current_status,
            is_verified: model.is_verified,
            franchise_tracking_id: model.franchise_tracking_id,
            franchise_receipt_url: model.franchise_receipt_url,
            one_time_code: None,
            requested_at: model.requested_at,
            confirmed_at: model.confirmed_at,
            picked_at: model.picked_at,
            delivered_at: model.delivered_at,
            cancelled_at: model.cancelled_at,
            rejected_at: model.rejected_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "status": "confirmed" }))]
pub struct UpdateStatusRequest {
    pub status: RequestStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignPartnerRequest {
    pub partner_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "code": "042917" }))]
pub struct VerifyCodeRequest {
    #[validate(length(equal = 6))]
    pub code: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/requests",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Requests listed", body = ApiResponse<PaginatedResponse<RequestResponse>>)
    ),
    tag = "requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<PaginatedResponse<RequestResponse>> {
    let (page, limit) = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .resolve(&state.config)?;
    let filter = RequestFilter {
        status: query.status,
        partner_id: query.partner_id,
    };

    let (records, total) = state
        .services
        .requests
        .list_requests(page, limit, filter)
        .await?;
    let items = records.into_iter().map(RequestResponse::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = CreateRequestInput,
    responses(
        (status = 201, description = "Request created", body = ApiResponse<RequestResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Package not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateRequestInput>,
) -> Result<(StatusCode, Json<ApiResponse<RequestResponse>>), ServiceError> {
    let model = state.services.requests.create_request(payload).await?;
    let one_time_code = model.one_time_code.clone();

    let mut response = RequestResponse::from(model);
    response.one_time_code = one_time_code;
    Ok(created(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/:id",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request fetched", body = ApiResponse<RequestResponse>),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<RequestResponse> {
    let model = state.services.requests.get_request(id).await?;
    Ok(Json(ApiResponse::success(model.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/track/:tracking_number",
    params(
        ("tracking_number" = String, Path, description = "Tracking number, case-insensitive")
    ),
    responses(
        (status = 200, description = "Request fetched", body = ApiResponse<RequestResponse>),
        (status = 404, description = "No request with this tracking number", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn track_request(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
) -> ApiResult<RequestResponse> {
    let model = state
        .services
        .requests
        .find_by_tracking_number(&tracking_number)
        .await?;
    Ok(Json(ApiResponse::success(model.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/requests/:id/status",
    request_body = UpdateStatusRequest,
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<RequestResponse>),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn update_request_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<RequestResponse> {
    let model = state
        .services
        .request_status
        .transition(id, payload.status)
        .await?;
    Ok(Json(ApiResponse::success(model.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/requests/:id/assign",
    request_body = AssignPartnerRequest,
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Partner assigned", body = ApiResponse<RequestResponse>),
        (status = 400, description = "User is not a partner", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request or user not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Request already finished", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn assign_partner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignPartnerRequest>,
) -> ApiResult<RequestResponse> {
    let model = state
        .services
        .requests
        .assign_partner(id, payload.partner_id)
        .await?;
    Ok(Json(ApiResponse::success(model.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/requests/:id/verify",
    request_body = VerifyCodeRequest,
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request verified", body = ApiResponse<RequestResponse>),
        (status = 400, description = "Code does not match", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn verify_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VerifyCodeRequest>,
) -> ApiResult<RequestResponse> {
    payload.validate()?;
    let model = state
        .services
        .requests
        .verify_one_time_code(id, &payload.code)
        .await?;
    Ok(Json(ApiResponse::success(model.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/requests/:id/franchise",
    request_body = FranchiseHandoffInput,
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Handoff recorded", body = ApiResponse<RequestResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Request was cancelled or rejected", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn record_franchise_handoff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FranchiseHandoffInput>,
) -> ApiResult<RequestResponse> {
    let model = state
        .services
        .requests
        .record_franchise_handoff(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(model.into())))
}
