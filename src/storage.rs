//! Partner document storage.
//!
//! Two identity documents are kept per partner in an object storage bucket.
//! The console only needs to know whether each one exists and where it can
//! be downloaded from; uploads happen elsewhere.

use async_trait::async_trait;
use dashmap::DashSet;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Errors raised by document store adapters
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid storage url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("storage url cannot carry object paths: {0}")]
    UnsupportedBaseUrl(String),

    #[error("unexpected status {0} from object storage")]
    Unexpected(u16),
}

/// The identity documents a partner uploads
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DocumentKind {
    Aadhar,
    DrivingLicence,
}

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Aadhar => "Aadhar Card",
            DocumentKind::DrivingLicence => "Driving Licence",
        }
    }

    /// Object path inside the bucket, e.g. `documents/<id>-aadhar.png`
    pub fn object_path(self, partner_id: Uuid) -> String {
        format!("documents/{}-{}.png", partner_id, self)
    }
}

/// Read-only view of the document bucket
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether an object exists at `path`
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Public download URL for the object at `path`
    fn download_url(&self, path: &str) -> Result<String, StorageError>;
}

/// Client for a Supabase-style storage REST API.
///
/// Existence is probed with `HEAD {base}/object/{bucket}/{path}`; downloads
/// are served from `{base}/object/public/{bucket}/{path}`.
#[derive(Clone, Debug)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: Url,
    bucket: String,
    service_key: Option<String>,
}

impl HttpObjectStore {
    pub fn new(
        base_url: &str,
        bucket: impl Into<String>,
        service_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::UnsupportedBaseUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            bucket: bucket.into(),
            service_key,
        })
    }

    /// Builds a store from configuration; `None` when no storage url is set
    pub fn from_config(cfg: &StorageConfig) -> Result<Option<Self>, StorageError> {
        cfg.url
            .as_deref()
            .map(|url| {
                Self::new(
                    url,
                    cfg.bucket.clone(),
                    cfg.service_key.clone(),
                    Duration::from_secs(cfg.timeout_secs),
                )
            })
            .transpose()
    }

    fn object_url(&self, public: bool, path: &str) -> Result<Url, StorageError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::UnsupportedBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("object");
            if public {
                segments.push("public");
            }
            segments.push(&self.bucket);
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }
}

#[async_trait]
impl DocumentStore for HttpObjectStore {
    #[instrument(skip(self))]
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let url = self.object_url(false, path)?;
        let mut request = self.client.head(url);
        if let Some(key) = &self.service_key {
            request = request.bearer_auth(key);
        }

        let status = request.send().await?.status();
        debug!(%status, "storage existence probe");
        match status {
            s if s.is_success() => Ok(true),
            // the storage API answers 400 for a missing object as well as 404
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(false),
            other => Err(StorageError::Unexpected(other.as_u16())),
        }
    }

    fn download_url(&self, path: &str) -> Result<String, StorageError> {
        Ok(self.object_url(true, path)?.to_string())
    }
}

/// Document store held in memory; empty unless objects are inserted
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    objects: DashSet<String>,
    public_base: String,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new("memory://documents")
    }
}

impl InMemoryDocumentStore {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            objects: DashSet::new(),
            public_base: public_base.into(),
        }
    }

    pub fn insert(&self, path: impl Into<String>) {
        self.objects.insert(normalize(&path.into()));
    }

    pub fn remove(&self, path: &str) -> bool {
        self.objects.remove(&normalize(path)).is_some()
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.objects.contains(&normalize(path)))
    }

    fn download_url(&self, path: &str) -> Result<String, StorageError> {
        Ok(format!(
            "{}/{}",
            self.public_base.trim_end_matches('/'),
            normalize(path)
        ))
    }
}
