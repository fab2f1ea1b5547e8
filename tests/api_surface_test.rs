//! Users, packages, status, health and the shared response envelopes.

mod common;

use axum::http::{Method, StatusCode};
use common::{json_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn status_endpoint_reports_service() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/v1/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["environment"], "test");
    assert!(body["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn health_endpoints_answer() {
    let app = TestApp::new().await;
    for uri in ["/health", "/health/live", "/health/ready"] {
        let response = app.request(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    let ready = json_body(app.request(Method::GET, "/health/ready", None).await).await;
    assert_eq!(ready["status"], "up");
    assert_eq!(ready["details"]["database"]["status"], "up");
}

#[tokio::test]
async fn request_id_is_echoed_in_errors() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/users/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let header = response.headers()["x-request-id"]
        .to_str()
        .unwrap()
        .to_string();

    let body = json_body(response).await;
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["request_id"], header);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn users_are_created_and_fetched() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/users",
            Some(json!({
                "name": "Ravi Kumar",
                "email": "Ravi@Example.com",
                "role": "partner"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await["data"].clone();
    assert_eq!(created["email"], "ravi@example.com");
    assert_eq!(created["role"], "partner");

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/users/{}", created["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["name"], "Ravi Kumar");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = TestApp::new().await;
    let payload = json!({
        "name": "Ravi",
        "email": "ravi@example.com",
        "role": "partner"
    });

    let first = app
        .request(Method::POST, "/api/v1/users", Some(payload.clone()))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request(Method::POST, "/api/v1/users", Some(payload))
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_user_payload_is_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/users",
            Some(json!({
                "name": "",
                "email": "not-an-email",
                "role": "customer"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Bad Request");
}

#[tokio::test]
async fn packages_are_created_and_fetched() {
    let app = TestApp::new().await;
    let owner = app
        .seed_user("Meera", quicktransit_console::entities::user::UserRole::Customer)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/packages",
            Some(json!({
                "owner_id": owner.id,
                "title": "Laptop",
                "pickup_address": "12 MG Road, Pune",
                "dropoff_address": "4 Park Street, Kolkata",
                "weight_grams": 2100
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await["data"].clone();
    assert_eq!(created["owner_id"], owner.id.to_string());

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/packages/{}", created["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["title"], "Laptop");
}

#[tokio::test]
async fn package_with_unknown_owner_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/packages",
            Some(json!({
                "owner_id": uuid::Uuid::new_v4(),
                "title": "Laptop",
                "pickup_address": "Pune",
                "dropoff_address": "Kolkata"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn request_for_unknown_package_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/requests",
            Some(json!({ "package_id": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert!(doc["paths"]
        .as_object()
        .unwrap()
        .contains_key("/api/v1/partners/:id"));
}
