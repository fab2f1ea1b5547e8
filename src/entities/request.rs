use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Maximum length of a tracking number column
pub const TRACKING_NUMBER_MAX_LEN: usize = 50;

/// Lifecycle status of a delivery request.
///
/// The forward path is `requested -> confirmed -> pickedup -> delivered`.
/// `cancelled` and `rejected` end the lifecycle early from any state that
/// is not already terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RequestStatus {
    #[sea_orm(string_value = "requested")]
    Requested,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "pickedup")]
    PickedUp,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::Requested
    }
}

impl RequestStatus {
    /// Statuses on the forward path, in order.
    pub const FORWARD_PATH: [RequestStatus; 4] = [
        RequestStatus::Requested,
        RequestStatus::Confirmed,
        RequestStatus::PickedUp,
        RequestStatus::Delivered,
    ];

    /// Position on the forward path, `None` for the early-exit states.
    pub fn stage(self) -> Option<usize> {
        Self::FORWARD_PATH.iter().position(|s| *s == self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Delivered | RequestStatus::Cancelled | RequestStatus::Rejected
        )
    }

    /// Whether a request currently in `self` may move to `next`.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (Some(from), Some(to)) => to > from,
            // cancelled / rejected from any non-terminal state
            (_, None) => true,
            (None, Some(_)) => false,
        }
    }

    /// Forward-path statuses strictly after `self` up to and including
    /// `target`. Empty when `target` is not ahead of `self` on the path.
    pub fn path_to(self, target: RequestStatus) -> Vec<RequestStatus> {
        match (self.stage(), target.stage()) {
            (Some(from), Some(to)) if to > from => Self::FORWARD_PATH[from + 1..=to].to_vec(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub package_id: Uuid,
    pub partner_id: Option<Uuid>,
    pub tracking_number: String,
    pub franchise_tracking_id: Option<String>,
    pub franchise_receipt_url: Option<String>,
    pub one_time_code: Option<String>,
    pub is_verified: bool,
    pub current_status: RequestStatus,
    pub requested_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub picked_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Milestone timestamp recorded for `status`.
    pub fn milestone(&self, status: RequestStatus) -> Option<DateTime<Utc>> {
        match status {
            RequestStatus::Requested => self.requested_at,
            RequestStatus::Confirmed => self.confirmed_at,
            RequestStatus::PickedUp => self.picked_at,
            RequestStatus::Delivered => self.delivered_at,
            RequestStatus::Cancelled => self.cancelled_at,
            RequestStatus::Rejected => self.rejected_at,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::package::Entity",
        from = "Column::PackageId",
        to = "super::package::Column::Id",
        on_delete = "Cascade"
    )]
    Package,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PartnerId",
        to = "super::user::Column::Id"
    )]
    Partner,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Package.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModel {
    /// Stamps the milestone column that belongs to `status`.
    pub fn set_milestone(&mut self, status: RequestStatus, at: DateTime<Utc>) {
        let value = Set(Some(at));
        match status {
            RequestStatus::Requested => self.requested_at = value,
            RequestStatus::Confirmed => self.confirmed_at = value,
            RequestStatus::PickedUp => self.picked_at = value,
            RequestStatus::Delivered => self.delivered_at = value,
            RequestStatus::Cancelled => self.cancelled_at = value,
            RequestStatus::Rejected => self.rejected_at = value,
        }
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            if active_model.created_at.is_not_set() {
                active_model.created_at = Set(now);
            }
            if active_model.current_status.is_not_set() {
                active_model.current_status = Set(RequestStatus::Requested);
            }
            if active_model.is_verified.is_not_set() {
                active_model.is_verified = Set(false);
            }
            if matches!(active_model.requested_at, ActiveValue::NotSet) {
                active_model.requested_at = Set(Some(now));
            }
        }
        if let ActiveValue::Set(tracking) | ActiveValue::Unchanged(tracking) =
            &active_model.tracking_number
        {
            if tracking.len() > TRACKING_NUMBER_MAX_LEN {
                return Err(DbErr::Custom(format!(
                    "tracking_number exceeds {} characters",
                    TRACKING_NUMBER_MAX_LEN
                )));
            }
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sea_orm::Iterable;

    #[rstest]
    #[case(RequestStatus::Requested, RequestStatus::Confirmed, true)]
    #[case(RequestStatus::Requested, RequestStatus::PickedUp, true)]
    #[case(RequestStatus::Requested, RequestStatus::Delivered, true)]
    #[case(RequestStatus::Confirmed, RequestStatus::PickedUp, true)]
    #[case(RequestStatus::PickedUp, RequestStatus::Delivered, true)]
    #[case(RequestStatus::Requested, RequestStatus::Cancelled, true)]
    #[case(RequestStatus::Confirmed, RequestStatus::Rejected, true)]
    #[case(RequestStatus::PickedUp, RequestStatus::Cancelled, true)]
    #[case(RequestStatus::Confirmed, RequestStatus::Requested, false)]
    #[case(RequestStatus::Delivered, RequestStatus::PickedUp, false)]
    #[case(RequestStatus::Requested, RequestStatus::Requested, false)]
    #[case(RequestStatus::Delivered, RequestStatus::Cancelled, false)]
    #[case(RequestStatus::Cancelled, RequestStatus::Confirmed, false)]
    #[case(RequestStatus::Rejected, RequestStatus::Cancelled, false)]
    #[case(RequestStatus::Cancelled, RequestStatus::Rejected, false)]
    fn transition_rules(
        #[case] from: RequestStatus,
        #[case] to: RequestStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed, "{from} -> {to}");
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for terminal in [
            RequestStatus::Delivered,
            RequestStatus::Cancelled,
            RequestStatus::Rejected,
        ] {
            assert!(terminal.is_terminal());
            for next in RequestStatus::iter() {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn path_to_lists_skipped_milestones() {
        assert_eq!(
            RequestStatus::Requested.path_to(RequestStatus::PickedUp),
            vec![RequestStatus::Confirmed, RequestStatus::PickedUp]
        );
        assert!(RequestStatus::Confirmed
            .path_to(RequestStatus::Cancelled)
            .is_empty());
        assert!(RequestStatus::Delivered
            .path_to(RequestStatus::Confirmed)
            .is_empty());
    }

    #[test]
    fn status_strings_match_the_column_values() {
        assert_eq!(RequestStatus::PickedUp.to_string(), "pickedup");
        assert_eq!(
            "PickedUp".parse::<RequestStatus>().unwrap(),
            RequestStatus::PickedUp
        );
        assert_eq!(RequestStatus::PickedUp.to_value(), "pickedup".to_string());
        assert!("shipped".parse::<RequestStatus>().is_err());
        assert_eq!(RequestStatus::default(), RequestStatus::Requested);
    }
}
