use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{package, user},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePackageInput {
    pub owner_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub pickup_address: String,
    #[validate(length(min = 1))]
    pub dropoff_address: String,
    #[validate(range(min = 1))]
    pub weight_grams: Option<i32>,
}

#[derive(Clone)]
pub struct PackageService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl PackageService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create_package(
        &self,
        input: CreatePackageInput,
    ) -> Result<package::Model, ServiceError> {
        input.validate()?;

        if let Some(owner_id) = input.owner_id {
            if user::Entity::find_by_id(owner_id)
                .one(&*self.db)
                .await?
                .is_none()
            {
                return Err(ServiceError::InvalidInput(format!(
                    "Owner {} does not exist",
                    owner_id
                )));
            }
        }

        let created = package::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(input.owner_id),
            title: Set(input.title),
            pickup_address: Set(input.pickup_address),
            dropoff_address: Set(input.dropoff_address),
            weight_grams: Set(input.weight_grams),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(package_id = %created.id, "package created");
        self.event_sender
            .send_or_log(Event::PackageCreated(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_package(&self, id: Uuid) -> Result<package::Model, ServiceError> {
        package::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Package {} not found", id)))
    }
}
