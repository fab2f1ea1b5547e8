use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use serde::Deserialize;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::user::{self, UserRole},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(url)]
    pub picture: Option<String>,
    pub role: UserRole,
}

/// Directory of console users (partners, managers, customers)
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: CreateUserInput) -> Result<user::Model, ServiceError> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A user with email {} already exists",
                email
            )));
        }

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            email: Set(email.clone()),
            picture: Set(input.picture),
            role: Set(input.role),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await.map_err(|e| map_insert_error(e, &email))?;

        info!(user_id = %created.id, role = %created.role, "user created");
        self.event_sender
            .send_or_log(Event::UserCreated(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    /// Fetches a user that must hold the partner role
    #[instrument(skip(self))]
    pub async fn get_partner(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        let user = user::Entity::find_by_id(id).one(&*self.db).await?;
        match user {
            Some(user) if user.is_partner() => Ok(user),
            _ => Err(ServiceError::NotFound(format!("Partner {} not found", id))),
        }
    }
}

fn map_insert_error(err: DbErr, email: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict(format!("A user with email {} already exists", email))
        }
        _ => {
            error!("Failed to insert user: {}", err);
            ServiceError::DatabaseError(err)
        }
    }
}
