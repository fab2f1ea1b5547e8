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
    entities::package, errors::ServiceError, services::packages::CreatePackageInput, ApiResponse,
    ApiResult, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct PackageResponse {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    #[schema(example = "Documents for Pune office")]
    pub title: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub weight_grams: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<package::Model> for PackageResponse {
    fn from(model: package::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            pickup_address: model.pickup_address,
            dropoff_address: model.dropoff_address,
            weight_grams: model.weight_grams,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/packages",
    request_body = CreatePackageInput,
    responses(
        (status = 201, description = "Package created", body = ApiResponse<PackageResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn create_package(
    State(state): State<AppState>,
    Json(payload): Json<CreatePackageInput>,
) -> Result<(StatusCode, Json<ApiResponse<PackageResponse>>), ServiceError> {
    let package = state.services.packages.create_package(payload).await?;
    Ok(created(PackageResponse::from(package)))
}

#[utoipa::path(
    get,
    path = "/api/v1/packages/:id",
    params(
        ("id" = Uuid, Path, description = "Package ID")
    ),
    responses(
        (status = 200, description = "Package fetched", body = ApiResponse<PackageResponse>),
        (status = 404, description = "Package not found", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PackageResponse> {
    let package = state.services.packages.get_package(id).await?;
    Ok(Json(ApiResponse::success(package.into())))
}
