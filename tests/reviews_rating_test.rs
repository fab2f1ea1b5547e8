//! Reviews and the partner rating aggregate.

mod common;

use axum::http::{Method, StatusCode};
use common::{json_body, TestApp};
use quicktransit_console::services::reviews::{CreateReviewInput, RatingSummary};
use serde_json::json;

async fn review(app: &TestApp, request_id: uuid::Uuid, rating: i32) {
    app.state
        .services
        .reviews
        .create_review(
            request_id,
            CreateReviewInput {
                rating,
                comment: None,
            },
        )
        .await
        .expect("review created");
}

#[tokio::test]
async fn partner_without_reviews_has_zero_average() {
    let app = TestApp::new().await;
    let partner = app.seed_partner("Ravi").await;

    let summary = app
        .state
        .services
        .reviews
        .average_rating_for_partner(partner.id)
        .await
        .unwrap();
    assert_eq!(summary, RatingSummary::empty());

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/partners/{}/rating", partner.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["average_display"], "0.0");
    assert_eq!(body["data"]["total_reviews"], 0);
    let stars = body["data"]["stars"].as_array().unwrap();
    assert_eq!(stars.len(), 5);
    assert!(stars.iter().all(|s| s["state"] == "empty"));
}

#[tokio::test]
async fn average_covers_only_that_partners_reviews() {
    let app = TestApp::new().await;
    let ravi = app.seed_partner("Ravi").await;
    let arjun = app.seed_partner("Arjun").await;

    for rating in [5, 4, 4] {
        let delivered = app.seed_delivered_request(ravi.id).await;
        review(&app, delivered.id, rating).await;
    }
    let other = app.seed_delivered_request(arjun.id).await;
    review(&app, other.id, 1).await;

    let summary = app
        .state
        .services
        .reviews
        .average_rating_for_partner(ravi.id)
        .await
        .unwrap();
    assert_eq!(summary.total_reviews, 3);
    assert!((summary.average_rating - 13.0 / 3.0).abs() < 1e-9);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/partners/{}/rating", ravi.id),
            None,
        )
        .await;
    let body = json_body(response).await;
    assert_eq!(body["data"]["average_display"], "4.3");
    assert_eq!(body["data"]["stars"][3]["state"], "full");
    assert_eq!(body["data"]["stars"][4]["state"], "partial");
}

#[tokio::test]
async fn review_requires_delivered_request() {
    let app = TestApp::new().await;
    let partner = app.seed_partner("Ravi").await;
    let pending = app.seed_request(Some(partner.id)).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/requests/{}/reviews", pending.id),
            Some(json!({ "rating": 5 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn review_requires_an_assigned_partner() {
    let app = TestApp::new().await;
    let unassigned = app.seed_request(None).await;
    app.state
        .services
        .request_status
        .transition(
            unassigned.id,
            quicktransit_console::entities::request::RequestStatus::Delivered,
        )
        .await
        .unwrap();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/requests/{}/reviews", unassigned.id),
            Some(json!({ "rating": 4 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn one_review_per_request() {
    let app = TestApp::new().await;
    let partner = app.seed_partner("Ravi").await;
    let delivered = app.seed_delivered_request(partner.id).await;
    let uri = format!("/api/v1/requests/{}/reviews", delivered.id);

    let response = app
        .request(
            Method::POST,
            &uri,
            Some(json!({ "rating": 4, "comment": "Careful with the box" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["partner_id"], partner.id.to_string());
    assert_eq!(body["data"]["comment"], "Careful with the box");

    let response = app
        .request(Method::POST, &uri, Some(json!({ "rating": 2 })))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn rating_outside_one_to_five_is_rejected() {
    let app = TestApp::new().await;
    let partner = app.seed_partner("Ravi").await;
    let delivered = app.seed_delivered_request(partner.id).await;
    let uri = format!("/api/v1/requests/{}/reviews", delivered.id);

    for rating in [0, 6] {
        let response = app
            .request(Method::POST, &uri, Some(json!({ "rating": rating })))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn partner_reviews_are_listed() {
    let app = TestApp::new().await;
    let partner = app.seed_partner("Ravi").await;
    for rating in [3, 5] {
        let delivered = app.seed_delivered_request(partner.id).await;
        review(&app, delivered.id, rating).await;
    }

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/partners/{}/reviews?limit=1", partner.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["limit"], 1);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}
