//! Quick Transit Console
//!
//! Backend for the partner management console of a parcel delivery network:
//! delivery request lifecycle, partner profiles with rating and document
//! availability, and customer reviews.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod rendering;
pub mod services;
pub mod storage;
pub mod tracing;

use axum::{
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower_http::timeout::TimeoutLayer;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        assert!(response.success);
        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn request_id_is_omitted_outside_a_request() {
        let response = ApiResponse::success(1);
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["data"], 1);
        assert!(body["meta"].get("request_id").is_none());
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes mounted under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    let users = Router::new()
        .route("/users", post(handlers::users::create_user))
        .route("/users/:id", get(handlers::users::get_user));

    let packages = Router::new()
        .route("/packages", post(handlers::packages::create_package))
        .route("/packages/:id", get(handlers::packages::get_package));

    let requests = Router::new()
        .route(
            "/requests",
            get(handlers::requests::list_requests).post(handlers::requests::create_request),
        )
        .route("/requests/:id", get(handlers::requests::get_request))
        .route(
            "/requests/track/:tracking_number",
            get(handlers::requests::track_request),
        )
        .route(
            "/requests/:id/status",
            put(handlers::requests::update_request_status),
        )
        .route(
            "/requests/:id/assign",
            post(handlers::requests::assign_partner),
        )
        .route(
            "/requests/:id/verify",
            post(handlers::requests::verify_request),
        )
        .route(
            "/requests/:id/franchise",
            put(handlers::requests::record_franchise_handoff),
        )
        .route(
            "/requests/:id/reviews",
            post(handlers::reviews::create_review),
        );

    let partners = Router::new()
        .route("/partners/:id", get(handlers::partners::get_partner_profile))
        .route(
            "/partners/:id/rating",
            get(handlers::partners::get_partner_rating),
        )
        .route(
            "/partners/:id/reviews",
            get(handlers::partners::list_partner_reviews),
        )
        .route(
            "/partners/:id/requests",
            get(handlers::partners::list_partner_requests),
        )
        .route(
            "/partners/:id/documents/:kind",
            get(handlers::partners::download_partner_document),
        );

    Router::new()
        .route("/status", get(api_status))
        .merge(users)
        .merge(packages)
        .merge(requests)
        .merge(partners)
}

async fn api_status(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// Full application router: v1 API, health, Swagger UI, tracing, request ids
/// and the request timeout. CORS and compression are added by the binary.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let db = state.db.clone();

    Router::new()
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
        .nest("/health", health::health_routes(db))
        .merge(openapi::swagger_ui())
        .layer(TimeoutLayer::new(timeout))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
}
