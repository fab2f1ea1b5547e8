use std::sync::Arc;

use chrono::Utc;
use rand::{distributions::Uniform, Rng};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        package,
        request::{self, RequestStatus},
        user,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

pub const TRACKING_PREFIX: &str = "QT";
const TRACKING_SUFFIX_LEN: usize = 10;
const TRACKING_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const TRACKING_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRequestInput {
    pub package_id: Uuid,
    pub partner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct FranchiseHandoffInput {
    #[validate(length(min = 1, max = 100))]
    pub franchise_tracking_id: String,
    #[validate(url)]
    pub franchise_receipt_url: Option<String>,
}

/// Filters for listing requests
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub partner_id: Option<Uuid>,
}

/// `QT` followed by ten upper-case alphanumerics
pub fn generate_tracking_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..TRACKING_SUFFIX_LEN)
        .map(|_| TRACKING_ALPHABET[rng.gen_range(0..TRACKING_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", TRACKING_PREFIX, suffix)
}

/// Six-digit code the customer reads out on pickup
pub fn generate_one_time_code() -> String {
    let code = rand::thread_rng().sample(Uniform::new(0u32, 1_000_000));
    format!("{:06}", code)
}

/// Delivery request records: creation, lookup and the non-status mutations
#[derive(Clone)]
pub struct RequestService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl RequestService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(package_id = %input.package_id))]
    pub async fn create_request(
        &self,
        input: CreateRequestInput,
    ) -> Result<request::Model, ServiceError> {
        let db = &*self.db;

        if package::Entity::find_by_id(input.package_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "Package {} not found",
                input.package_id
            )));
        }
        if let Some(partner_id) = input.partner_id {
            self.require_partner(partner_id).await?;
        }

        let tracking_number = self.unused_tracking_number().await?;
        let created = request::ActiveModel {
            id: Set(Uuid::new_v4()),
            package_id: Set(input.package_id),
            partner_id: Set(input.partner_id),
            tracking_number: Set(tracking_number.clone()),
            one_time_code: Set(Some(generate_one_time_code())),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!("Failed to insert request: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(request_id = %created.id, %tracking_number, "request created");
        self.event_sender
            .send_or_log(Event::RequestCreated {
                request_id: created.id,
                package_id: created.package_id,
                tracking_number,
            })
            .await;
        Ok(created)
    }

    async fn unused_tracking_number(&self) -> Result<String, ServiceError> {
        for _ in 0..TRACKING_ATTEMPTS {
            let candidate = generate_tracking_number();
            let taken = request::Entity::find()
                .filter(request::Column::TrackingNumber.eq(candidate.clone()))
                .count(&*self.db)
                .await?
                > 0;
            if !taken {
                return Ok(candidate);
            }
            warn!(%candidate, "tracking number collision");
        }
        Err(ServiceError::InternalError(
            "could not allocate a unique tracking number".to_string(),
        ))
    }

    async fn require_partner(&self, partner_id: Uuid) -> Result<user::Model, ServiceError> {
        let user = user::Entity::find_by_id(partner_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", partner_id)))?;
        if !user.is_partner() {
            return Err(ServiceError::InvalidInput(format!(
                "User {} is not a partner",
                partner_id
            )));
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_request(&self, id: Uuid) -> Result<request::Model, ServiceError> {
        request::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<request::Model, ServiceError> {
        let normalized = tracking_number.trim().to_uppercase();
        request::Entity::find()
            .filter(request::Column::TrackingNumber.eq(normalized))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Request with tracking number {} not found",
                    tracking_number
                ))
            })
    }

    /// Lists requests newest first; `page` is 1-based
    #[instrument(skip(self))]
    pub async fn list_requests(
        &self,
        page: u64,
        limit: u64,
        filter: RequestFilter,
    ) -> Result<(Vec<request::Model>, u64), ServiceError> {
        let db = &*self.db;
        let mut query = request::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(request::Column::CurrentStatus.eq(status));
        }
        if let Some(partner_id) = filter.partner_id {
            query = query.filter(request::Column::PartnerId.eq(partner_id));
        }

        let paginator = query
            .order_by_desc(request::Column::CreatedAt)
            .paginate(db, limit.max(1));

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let requests = paginator
            .fetch_page(page.max(1) - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((requests, total))
    }

    /// Assigns a partner to a request that has not finished its lifecycle
    #[instrument(skip(self))]
    pub async fn assign_partner(
        &self,
        id: Uuid,
        partner_id: Uuid,
    ) -> Result<request::Model, ServiceError> {
        self.require_partner(partner_id).await?;

        let txn = self.db.begin().await?;
        let current = request::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", id)))?;

        if current.current_status.is_terminal() {
            return Err(ServiceError::Conflict(format!(
                "Request {} is already {}",
                id, current.current_status
            )));
        }

        let result = request::Entity::update_many()
            .set(request::ActiveModel {
                partner_id: Set(Some(partner_id)),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(request::Column::Id.eq(id))
            .filter(request::Column::CurrentStatus.eq(current.current_status))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "Request {} changed status while assigning a partner",
                id
            )));
        }
        let updated = request::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", id)))?;
        txn.commit().await?;

        info!(request_id = %id, %partner_id, "partner assigned");
        self.event_sender
            .send_or_log(Event::PartnerAssigned {
                request_id: id,
                partner_id,
            })
            .await;
        Ok(updated)
    }

    /// Marks the request verified when `code` matches its one-time code
    #[instrument(skip(self, code))]
    pub async fn verify_one_time_code(
        &self,
        id: Uuid,
        code: &str,
    ) -> Result<request::Model, ServiceError> {
        let current = self.get_request(id).await?;
        if current.is_verified {
            return Ok(current);
        }

        let expected = current.one_time_code.as_deref().ok_or_else(|| {
            ServiceError::Conflict(format!("Request {} has no one-time code", id))
        })?;
        if expected != code.trim() {
            warn!(request_id = %id, "one-time code mismatch");
            return Err(ServiceError::ValidationError(
                "One-time code does not match".to_string(),
            ));
        }

        let mut active: request::ActiveModel = current.into();
        active.is_verified = Set(true);
        let updated = active.update(&*self.db).await?;

        info!(request_id = %id, "request verified");
        self.event_sender
            .send_or_log(Event::RequestVerified(id))
            .await;
        Ok(updated)
    }

    /// Records that the parcel was handed to a franchise courier
    #[instrument(skip(self, input))]
    pub async fn record_franchise_handoff(
        &self,
        id: Uuid,
        mut input: FranchiseHandoffInput,
    ) -> Result<request::Model, ServiceError> {
        input.franchise_tracking_id = input.franchise_tracking_id.trim().to_string();
        input.validate()?;

        let current = self.get_request(id).await?;
        if matches!(
            current.current_status,
            RequestStatus::Cancelled | RequestStatus::Rejected
        ) {
            return Err(ServiceError::Conflict(format!(
                "Request {} is {}",
                id, current.current_status
            )));
        }

        let tracking_id = input.franchise_tracking_id.clone();
        let mut active: request::ActiveModel = current.into();
        active.franchise_tracking_id = Set(Some(tracking_id.clone()));
        active.franchise_receipt_url = Set(input.franchise_receipt_url);
        let updated = active.update(&*self.db).await?;

        info!(request_id = %id, franchise_tracking_id = %tracking_id, "franchise handoff recorded");
        self.event_sender
            .send_or_log(Event::FranchiseHandoffRecorded {
                request_id: id,
                franchise_tracking_id: tracking_id,
            })
            .await;
        Ok(updated)
    }
}
