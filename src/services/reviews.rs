use std::sync::Arc;

use sea_orm::{
    sea_query::{Alias, Expr, Func, SimpleExpr},
    ActiveModelTrait,
    ActiveValue::Set,
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        request::{self, RequestStatus},
        review,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReviewInput {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Average rating and number of reviews for one partner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: u64,
}

impl RatingSummary {
    pub fn empty() -> Self {
        Self {
            average_rating: 0.0,
            total_reviews: 0,
        }
    }
}

#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ReviewService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Reviews a delivered request on behalf of its customer
    #[instrument(skip(self, input))]
    pub async fn create_review(
        &self,
        request_id: Uuid,
        input: CreateReviewInput,
    ) -> Result<review::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db;

        let request = request::Entity::find_by_id(request_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", request_id)))?;

        if request.current_status != RequestStatus::Delivered {
            return Err(ServiceError::Conflict(format!(
                "Only delivered requests can be reviewed; request {} is {}",
                request_id, request.current_status
            )));
        }
        let partner_id = request.partner_id.ok_or_else(|| {
            ServiceError::Conflict(format!("Request {} has no partner to review", request_id))
        })?;

        let already_reviewed = review::Entity::find()
            .filter(review::Column::RequestId.eq(request_id))
            .count(db)
            .await?
            > 0;
        if already_reviewed {
            return Err(already_reviewed_error(request_id));
        }

        let created = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            request_id: Set(request_id),
            partner_id: Set(partner_id),
            rating: Set(input.rating),
            comment: Set(input.comment.filter(|c| !c.trim().is_empty())),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| map_insert_error(e, request_id))?;

        info!(review_id = %created.id, %partner_id, rating = created.rating, "review created");
        self.event_sender
            .send_or_log(Event::ReviewCreated {
                review_id: created.id,
                request_id,
                partner_id,
                rating: created.rating,
            })
            .await;
        Ok(created)
    }

    /// Reviews received by a partner, newest first; `page` is 1-based
    #[instrument(skip(self))]
    pub async fn list_for_partner(
        &self,
        partner_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<review::Model>, u64), ServiceError> {
        let paginator = review::Entity::find()
            .filter(review::Column::PartnerId.eq(partner_id))
            .order_by_desc(review::Column::CreatedAt)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await?;
        let reviews = paginator.fetch_page(page.max(1) - 1).await?;
        Ok((reviews, total))
    }

    /// `AVG`/`COUNT` over the partner's reviews; zero for both when none exist
    #[instrument(skip(self))]
    pub async fn average_rating_for_partner(
        &self,
        partner_id: Uuid,
    ) -> Result<RatingSummary, ServiceError> {
        let row = review::Entity::find()
            .select_only()
            .column_as(
                SimpleExpr::from(Func::avg(
                    Expr::col((review::Entity, review::Column::Rating))
                        .cast_as(Alias::new("float8")),
                )),
                "average_rating",
            )
            .column_as(
                Expr::col((review::Entity, review::Column::Id)).count(),
                "total_reviews",
            )
            .filter(review::Column::PartnerId.eq(partner_id))
            .into_tuple::<(Option<f64>, Option<i64>)>()
            .one(&*self.db)
            .await?;

        Ok(match row {
            Some((average, total)) => RatingSummary {
                average_rating: average.unwrap_or(0.0),
                total_reviews: total.unwrap_or(0).max(0) as u64,
            },
            None => RatingSummary::empty(),
        })
    }
}

fn already_reviewed_error(request_id: Uuid) -> ServiceError {
    ServiceError::Conflict(format!("Request {} has already been reviewed", request_id))
}

fn map_insert_error(err: DbErr, request_id: Uuid) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => already_reviewed_error(request_id),
        _ => ServiceError::DatabaseError(err),
    }
}
