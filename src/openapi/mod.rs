use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quick Transit Console API",
        version = "0.1.0",
        description = r#"
# Quick Transit partner console

Back office API for a parcel delivery network.

## Features

- **Delivery requests**: create, track and move requests through `requested -> confirmed -> pickedup -> delivered`, or end them as `cancelled` / `rejected`
- **Partners**: profile view with average rating, star states and identity document availability
- **Reviews**: one 1-5 rating per delivered request

## Error Handling

Failures return a consistent body with the matching HTTP status:

```json
{
  "error": "Conflict",
  "message": "Invalid transition: cannot move request from 'delivered' to 'cancelled'",
  "request_id": "3a9c0f0e-4c0b-4d38-9b7e-1f2e3d4c5b6a",
  "timestamp": "2024-03-01T10:30:00Z"
}
```

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20, max 100).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "users", description = "Console users"),
        (name = "packages", description = "Parcels to be delivered"),
        (name = "requests", description = "Delivery requests and their lifecycle"),
        (name = "reviews", description = "Customer reviews of partners"),
        (name = "partners", description = "Partner profile, rating and documents")
    ),
    paths(
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,

        crate::handlers::packages::create_package,
        crate::handlers::packages::get_package,

        crate::handlers::requests::list_requests,
        crate::handlers::requests::create_request,
        crate::handlers::requests::get_request,
        crate::handlers::requests::track_request,
        crate::handlers::requests::update_request_status,
        crate::handlers::requests::assign_partner,
        crate::handlers::requests::verify_request,
        crate::handlers::requests::record_franchise_handoff,

        crate::handlers::reviews::create_review,

        crate::handlers::partners::get_partner_profile,
        crate::handlers::partners::get_partner_rating,
        crate::handlers::partners::list_partner_reviews,
        crate::handlers::partners::list_partner_requests,
        crate::handlers::partners::download_partner_document,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::handlers::common::PaginationParams,

            crate::entities::user::UserRole,
            crate::entities::request::RequestStatus,
            crate::storage::DocumentKind,
            crate::rendering::StarState,

            crate::handlers::users::UserResponse,
            crate::handlers::packages::PackageResponse,
            crate::handlers::requests::RequestResponse,
            crate::handlers::requests::UpdateStatusRequest,
            crate::handlers::requests::AssignPartnerRequest,
            crate::handlers::requests::VerifyCodeRequest,
            crate::handlers::reviews::ReviewResponse,

            crate::services::users::CreateUserInput,
            crate::services::packages::CreatePackageInput,
            crate::services::requests::CreateRequestInput,
            crate::services::requests::FranchiseHandoffInput,
            crate::services::reviews::CreateReviewInput,
            crate::services::reviews::RatingSummary,
            crate::services::partners::PartnerProfile,
            crate::services::partners::PartnerSummary,
            crate::services::partners::RatingView,
            crate::services::partners::DocumentControl,
            crate::services::partners::SidebarEntry,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_console_routes() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Quick Transit Console API"));
        assert!(json.contains("/api/v1/requests/:id/status"));
        assert!(json.contains("/api/v1/partners/:id/documents/:kind"));
        assert!(json.contains("ErrorResponse"));
    }
}
