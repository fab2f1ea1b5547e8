pub mod common;
pub mod packages;
pub mod partners;
pub mod requests;
pub mod reviews;
pub mod users;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    packages::PackageService, partners::PartnerService, request_status::RequestStatusService,
    requests::RequestService, reviews::ReviewService, users::UserService,
};
use crate::storage::DocumentStore;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub packages: Arc<PackageService>,
    pub requests: Arc<RequestService>,
    pub request_status: Arc<RequestStatusService>,
    pub reviews: Arc<ReviewService>,
    pub partners: Arc<PartnerService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        document_store: Arc<dyn DocumentStore>,
    ) -> Self {
        let users = Arc::new(UserService::new(db_pool.clone(), event_sender.clone()));
        let reviews = Arc::new(ReviewService::new(db_pool.clone(), event_sender.clone()));
        let partners = Arc::new(PartnerService::new(
            users.clone(),
            reviews.clone(),
            document_store,
        ));

        Self {
            packages: Arc::new(PackageService::new(db_pool.clone(), event_sender.clone())),
            requests: Arc::new(RequestService::new(db_pool.clone(), event_sender.clone())),
            request_status: Arc::new(RequestStatusService::new(db_pool, event_sender)),
            users,
            reviews,
            partners,
        }
    }
}
