//! Storage-level guarantees of the `requests` table.

mod common;

use chrono::Utc;
use common::TestApp;
use quicktransit_console::entities::{
    package,
    request::{self, RequestStatus, TRACKING_NUMBER_MAX_LEN},
    review, user,
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseBackend, EntityTrait, ModelTrait, Set, Statement,
};
use uuid::Uuid;

fn draft(package_id: Uuid, tracking_number: &str) -> request::ActiveModel {
    request::ActiveModel {
        id: Set(Uuid::new_v4()),
        package_id: Set(package_id),
        tracking_number: Set(tracking_number.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn insert_applies_defaults() {
    let app = TestApp::new().await;
    let package = app.seed_package(None).await;

    let inserted = draft(package.id, "QTDEFAULTS01")
        .insert(&*app.state.db)
        .await
        .unwrap();

    assert_eq!(inserted.current_status, RequestStatus::Requested);
    assert!(!inserted.is_verified);
    assert!(inserted.requested_at.is_some());
    assert!(inserted.partner_id.is_none());
    assert!(inserted.delivered_at.is_none());
    assert!(inserted.created_at <= Utc::now());
}

#[tokio::test]
async fn request_requires_an_existing_package() {
    let app = TestApp::new().await;

    let result = draft(Uuid::new_v4(), "QTORPHAN0001")
        .insert(&*app.state.db)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn request_without_package_is_rejected() {
    let app = TestApp::new().await;

    let result = request::ActiveModel {
        id: Set(Uuid::new_v4()),
        tracking_number: Set("QTNOPACKAGE1".to_string()),
        ..Default::default()
    }
    .insert(&*app.state.db)
    .await;
    assert!(result.is_err());

    let stored = request::Entity::find().all(&*app.state.db).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn overlong_tracking_number_is_rejected() {
    let app = TestApp::new().await;
    let package = app.seed_package(None).await;
    let long = "Q".repeat(TRACKING_NUMBER_MAX_LEN + 1);

    let result = draft(package.id, &long).insert(&*app.state.db).await;
    assert!(result.is_err());

    let exact = "Q".repeat(TRACKING_NUMBER_MAX_LEN);
    assert!(draft(package.id, &exact).insert(&*app.state.db).await.is_ok());
}

#[tokio::test]
async fn status_column_only_accepts_known_values() {
    let app = TestApp::new().await;
    let package = app.seed_package(None).await;
    draft(package.id, "QTCHECK00001")
        .insert(&*app.state.db)
        .await
        .unwrap();

    let result = app
        .state
        .db
        .execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "UPDATE requests SET current_status = 'lost'".to_string(),
        ))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn deleting_a_package_removes_its_requests_and_reviews() {
    let app = TestApp::new().await;
    let partner = app.seed_partner("Ravi").await;
    let delivered = app.seed_delivered_request(partner.id).await;
    app.state
        .services
        .reviews
        .create_review(
            delivered.id,
            quicktransit_console::services::reviews::CreateReviewInput {
                rating: 5,
                comment: None,
            },
        )
        .await
        .unwrap();

    let package = package::Entity::find_by_id(delivered.package_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    package.delete(&*app.state.db).await.unwrap();

    let remaining = request::Entity::find_by_id(delivered.id)
        .one(&*app.state.db)
        .await
        .unwrap();
    assert!(remaining.is_none());

    let reviews = review::Entity::find().all(&*app.state.db).await.unwrap();
    assert!(reviews.is_empty());
}

#[tokio::test]
async fn partners_with_delivery_history_cannot_be_deleted() {
    let app = TestApp::new().await;
    let partner = app.seed_partner("Ravi").await;
    let delivered = app.seed_delivered_request(partner.id).await;
    app.state
        .services
        .reviews
        .create_review(
            delivered.id,
            quicktransit_console::services::reviews::CreateReviewInput {
                rating: 4,
                comment: None,
            },
        )
        .await
        .unwrap();

    let result = user::Entity::delete_by_id(partner.id)
        .exec(&*app.state.db)
        .await;
    assert!(result.is_err());

    let stored = request::Entity::find_by_id(delivered.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.partner_id, Some(partner.id));
    assert_eq!(review::Entity::find().all(&*app.state.db).await.unwrap().len(), 1);
}
