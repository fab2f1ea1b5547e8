use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    entities::request::{self, RequestStatus},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Moves delivery requests through their lifecycle and stamps milestones
#[derive(Clone)]
pub struct RequestStatusService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl RequestStatusService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Transitions a request to `new_status`.
    ///
    /// Forward jumps stamp every skipped milestone with the same instant.
    /// An illegal transition leaves the row untouched.
    #[instrument(skip(self), fields(request_id = %request_id, new_status = %new_status))]
    pub async fn transition(
        &self,
        request_id: Uuid,
        new_status: RequestStatus,
    ) -> Result<request::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let current = request::Entity::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("Failed to fetch request {}: {}", request_id, e);
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", request_id)))?;

        let old_status = current.current_status;
        if !old_status.can_transition_to(new_status) {
            error!(
                "Invalid status transition from {} to {}",
                old_status, new_status
            );
            return Err(ServiceError::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        let now = Utc::now();
        let stamped = if new_status.stage().is_some() {
            old_status.path_to(new_status)
        } else {
            vec![new_status]
        };

        let mut changes = request::ActiveModel {
            current_status: Set(new_status),
            updated_at: Set(now),
            ..Default::default()
        };
        for status in &stamped {
            changes.set_milestone(*status, now);
        }

        // Conditional on the status read above so concurrent writers cannot both win.
        let result = request::Entity::update_many()
            .set(changes)
            .filter(request::Column::Id.eq(request_id))
            .filter(request::Column::CurrentStatus.eq(old_status))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!("Failed to update request {} status: {}", request_id, e);
                ServiceError::DatabaseError(e)
            })?;
        if result.rows_affected == 0 {
            error!(
                "Request {} left '{}' before the transition to '{}' was applied",
                request_id, old_status, new_status
            );
            return Err(ServiceError::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        let updated = request::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", request_id)))?;

        txn.commit().await.map_err(|e| {
            error!(
                "Failed to commit transaction for request {}: {}",
                request_id, e
            );
            ServiceError::DatabaseError(e)
        })?;

        info!(
            "Request {} status updated from '{}' to '{}'",
            request_id, old_status, new_status
        );
        counter!(
            "quicktransit.requests.status_changed",
            1,
            "status" => new_status.to_string()
        );
        self.event_sender
            .send_or_log(Event::RequestStatusChanged {
                request_id,
                old_status,
                new_status,
                at: now,
            })
            .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn current_status(&self, request_id: Uuid) -> Result<RequestStatus, ServiceError> {
        request::Entity::find_by_id(request_id)
            .one(&*self.db)
            .await?
            .map(|r| r.current_status)
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", request_id)))
    }

    /// Transitions each request independently; failures are logged and skipped
    #[instrument(skip(self, request_ids), fields(count = request_ids.len()))]
    pub async fn batch_transition(
        &self,
        request_ids: Vec<Uuid>,
        new_status: RequestStatus,
    ) -> Result<Vec<request::Model>, ServiceError> {
        let mut updated = Vec::with_capacity(request_ids.len());

        for request_id in request_ids {
            match self.transition(request_id, new_status).await {
                Ok(request) => updated.push(request),
                Err(e) => error!("Failed to transition request {}: {}", request_id, e),
            }
        }

        info!(
            "Batch transitioned {} requests to '{}'",
            updated.len(),
            new_status
        );
        Ok(updated)
    }
}
