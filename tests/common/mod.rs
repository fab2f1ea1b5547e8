#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use quicktransit_console::{
    build_router,
    config::AppConfig,
    db,
    entities::{
        package,
        request::{self, RequestStatus},
        user::{self, UserRole},
    },
    events::{self, EventSender},
    handlers::AppServices,
    services::{
        packages::CreatePackageInput, requests::CreateRequestInput, users::CreateUserInput,
    },
    storage::{DocumentStore, InMemoryDocumentStore},
    AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Application state backed by a throwaway SQLite file with migrations applied.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub documents: Arc<InMemoryDocumentStore>,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let documents = Arc::new(InMemoryDocumentStore::new("https://files.test/public"));
        Self::build(documents.clone(), documents).await
    }

    /// Same as [`TestApp::new`] but with a custom document store for the services
    pub async fn with_document_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::build(Arc::new(InMemoryDocumentStore::default()), store).await
    }

    async fn build(
        documents: Arc<InMemoryDocumentStore>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let db_dir = tempfile::tempdir().expect("temp dir for test database");
        let db_path = db_dir.path().join("console_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()), store);
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        Self {
            router: build_router(state.clone()),
            state,
            documents,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Send a request against the router
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_user(&self, name: &str, role: UserRole) -> user::Model {
        self.state
            .services
            .users
            .create_user(CreateUserInput {
                name: name.to_string(),
                email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()),
                picture: None,
                role,
            })
            .await
            .expect("seed user")
    }

    pub async fn seed_partner(&self, name: &str) -> user::Model {
        self.seed_user(name, UserRole::Partner).await
    }

    pub async fn seed_package(&self, owner_id: Option<Uuid>) -> package::Model {
        self.state
            .services
            .packages
            .create_package(CreatePackageInput {
                owner_id,
                title: "Box of books".to_string(),
                pickup_address: "12 MG Road, Pune".to_string(),
                dropoff_address: "4 Park Street, Kolkata".to_string(),
                weight_grams: Some(1200),
            })
            .await
            .expect("seed package")
    }

    pub async fn seed_request(&self, partner_id: Option<Uuid>) -> request::Model {
        let package = self.seed_package(None).await;
        self.state
            .services
            .requests
            .create_request(CreateRequestInput {
                package_id: package.id,
                partner_id,
            })
            .await
            .expect("seed request")
    }

    /// Seeds a request assigned to `partner_id` and drives it to delivered
    pub async fn seed_delivered_request(&self, partner_id: Uuid) -> request::Model {
        let created = self.seed_request(Some(partner_id)).await;
        self.state
            .services
            .request_status
            .transition(created.id, RequestStatus::Delivered)
            .await
            .expect("deliver request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is json")
}
