use axum::{
    extract::{Path, Query, State},
    response::{Json, Redirect},
};
use uuid::Uuid;

use super::{
    common::PaginationParams, requests::RequestResponse, reviews::ReviewResponse,
};
use crate::{
    errors::ServiceError,
    services::{
        partners::{PartnerProfile, RatingView},
        requests::RequestFilter,
    },
    storage::DocumentKind,
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

#[utoipa::path(
    get,
    path = "/api/v1/partners/:id",
    params(
        ("id" = Uuid, Path, description = "Partner user ID")
    ),
    responses(
        (status = 200, description = "Partner profile", body = ApiResponse<PartnerProfile>),
        (status = 404, description = "Partner not found", body = crate::errors::ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn get_partner_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PartnerProfile> {
    let profile = state.services.partners.profile(id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v1/partners/:id/rating",
    params(
        ("id" = Uuid, Path, description = "Partner user ID")
    ),
    responses(
        (status = 200, description = "Average rating with star states", body = ApiResponse<RatingView>),
        (status = 404, description = "Partner not found", body = crate::errors::ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn get_partner_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<RatingView> {
    let rating = state.services.partners.rating(id).await?;
    Ok(Json(ApiResponse::success(rating)))
}

#[utoipa::path(
    get,
    path = "/api/v1/partners/:id/reviews",
    params(
        ("id" = Uuid, Path, description = "Partner user ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Reviews received by the partner", body = ApiResponse<PaginatedResponse<ReviewResponse>>),
        (status = 404, description = "Partner not found", body = crate::errors::ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn list_partner_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<ReviewResponse>> {
    state.services.users.get_partner(id).await?;
    let (page, limit) = pagination.resolve(&state.config)?;

    let (records, total) = state
        .services
        .reviews
        .list_for_partner(id, page, limit)
        .await?;
    let items = records.into_iter().map(ReviewResponse::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/partners/:id/requests",
    params(
        ("id" = Uuid, Path, description = "Partner user ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Requests assigned to the partner", body = ApiResponse<PaginatedResponse<RequestResponse>>),
        (status = 404, description = "Partner not found", body = crate::errors::ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn list_partner_requests(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<RequestResponse>> {
    state.services.users.get_partner(id).await?;
    let (page, limit) = pagination.resolve(&state.config)?;
    let filter = RequestFilter {
        partner_id: Some(id),
        ..Default::default()
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
    get,
    path = "/api/v1/partners/:id/documents/:kind",
    params(
        ("id" = Uuid, Path, description = "Partner user ID"),
        ("kind" = DocumentKind, Path, description = "aadhar or driving-licence")
    ),
    responses(
        (status = 307, description = "Redirect to the document download URL"),
        (status = 404, description = "Partner or document not found", body = crate::errors::ErrorResponse),
        (status = 502, description = "Document storage unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn download_partner_document(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, DocumentKind)>,
) -> Result<Redirect, ServiceError> {
    let url = state
        .services
        .partners
        .document_download(id, kind)
        .await?;
    Ok(Redirect::temporary(&url))
}
