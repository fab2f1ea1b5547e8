use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::user,
    errors::ServiceError,
    rendering::{format_average, render_stars, rounded_average, StarState},
    services::{
        reviews::{RatingSummary, ReviewService},
        users::UserService,
    },
    storage::{DocumentKind, DocumentStore},
};

pub const MISSING_DOCUMENT_TOOLTIP: &str = "Didn't upload it yet";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PartnerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

impl From<user::Model> for PartnerSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            picture: model.picture,
        }
    }
}

/// Rating as shown next to the partner's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingView {
    /// Average rounded to one decimal
    pub average: f64,
    /// Same value formatted for display, e.g. "4.3"
    pub average_display: String,
    pub total_reviews: u64,
    pub stars: Vec<StarState>,
}

impl From<RatingSummary> for RatingView {
    fn from(summary: RatingSummary) -> Self {
        let average = rounded_average(summary.average_rating);
        Self {
            average,
            average_display: format_average(summary.average_rating),
            total_reviews: summary.total_reviews,
            stars: render_stars(average).to_vec(),
        }
    }
}

/// Download control for one identity document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DocumentControl {
    pub kind: DocumentKind,
    pub label: String,
    pub available: bool,
    pub tooltip: String,
    /// API path that redirects to the file; absent when not available
    pub download_path: Option<String>,
}

impl DocumentControl {
    pub fn new(partner_id: Uuid, kind: DocumentKind, available: bool) -> Self {
        let (tooltip, download_path) = if available {
            (
                format!("Download {}", kind.label()),
                Some(format!("/api/v1/partners/{}/documents/{}", partner_id, kind)),
            )
        } else {
            (MISSING_DOCUMENT_TOOLTIP.to_string(), None)
        };
        Self {
            kind,
            label: kind.label().to_string(),
            available,
            tooltip,
            download_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SidebarEntry {
    pub label: String,
    pub href: String,
}

/// Navigation shown beside every partner page
pub fn partner_sidebar(partner_id: Uuid) -> Vec<SidebarEntry> {
    vec![
        SidebarEntry {
            label: "Profile".to_string(),
            href: format!("/partners/v/{}", partner_id),
        },
        SidebarEntry {
            label: "Packages".to_string(),
            href: format!("/partners/v/{}/packages", partner_id),
        },
    ]
}

/// Everything the partner profile page renders
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PartnerProfile {
    pub partner: PartnerSummary,
    pub rating: RatingView,
    pub documents: Vec<DocumentControl>,
    pub sidebar: Vec<SidebarEntry>,
}

/// Checks one document. Storage failures are logged and reported as absent.
pub async fn document_control(
    store: &dyn DocumentStore,
    partner_id: Uuid,
    kind: DocumentKind,
) -> DocumentControl {
    let available = match store.exists(&kind.object_path(partner_id)).await {
        Ok(found) => found,
        Err(e) => {
            warn!(%partner_id, document = %kind, error = %e, "document check failed");
            counter!("quicktransit.storage.check_failed", 1, "document" => kind.to_string());
            false
        }
    };
    DocumentControl::new(partner_id, kind, available)
}

#[derive(Clone)]
pub struct PartnerService {
    users: Arc<UserService>,
    reviews: Arc<ReviewService>,
    documents: Arc<dyn DocumentStore>,
}

impl PartnerService {
    pub fn new(
        users: Arc<UserService>,
        reviews: Arc<ReviewService>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            users,
            reviews,
            documents,
        }
    }

    /// Composes the profile page. The user lookup, the rating aggregate and
    /// both document checks run concurrently.
    #[instrument(skip(self))]
    pub async fn profile(&self, partner_id: Uuid) -> Result<PartnerProfile, ServiceError> {
        let store = &*self.documents;
        let (partner, rating, aadhar, licence) = tokio::join!(
            self.users.get_partner(partner_id),
            self.reviews.average_rating_for_partner(partner_id),
            document_control(store, partner_id, DocumentKind::Aadhar),
            document_control(store, partner_id, DocumentKind::DrivingLicence),
        );

        Ok(PartnerProfile {
            partner: partner?.into(),
            rating: rating?.into(),
            documents: vec![aadhar, licence],
            sidebar: partner_sidebar(partner_id),
        })
    }

    #[instrument(skip(self))]
    pub async fn rating(&self, partner_id: Uuid) -> Result<RatingView, ServiceError> {
        self.users.get_partner(partner_id).await?;
        Ok(self
            .reviews
            .average_rating_for_partner(partner_id)
            .await?
            .into())
    }

    /// Download URL for a document, NotFound when it was never uploaded
    #[instrument(skip(self))]
    pub async fn document_download(
        &self,
        partner_id: Uuid,
        kind: DocumentKind,
    ) -> Result<String, ServiceError> {
        self.users.get_partner(partner_id).await?;

        let path = kind.object_path(partner_id);
        if !self.documents.exists(&path).await? {
            return Err(ServiceError::NotFound(format!(
                "{} has not been uploaded",
                kind.label()
            )));
        }
        Ok(self.documents.download_url(&path)?)
    }
}
