use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{config::AppConfig, errors::ServiceError, ApiResponse, PaginatedResponse};

/// Standard created response
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Pagination parameters for list operations
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size, clamped to the configured maximum
    pub limit: Option<u64>,
}

impl PaginationParams {
    /// Resolves `(page, limit)` against the configured defaults.
    /// Pages whose row offset does not fit in an `i64` are rejected.
    pub fn resolve(&self, config: &AppConfig) -> Result<(u64, u64), ServiceError> {
        let page = self.page.unwrap_or(1).max(1);
        let limit = config.page_size(self.limit);
        match (page - 1).checked_mul(limit) {
            Some(offset) if offset <= i64::MAX as u64 => Ok((page, limit)),
            _ => Err(ServiceError::ValidationError(format!(
                "page {} is out of range",
                page
            ))),
        }
    }
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if total == 0 || limit == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 41, 1, 20);
        assert_eq!(page.total_pages, 3);

        let empty = PaginatedResponse::<u8>::new(vec![], 0, 1, 20);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn pagination_defaults_to_first_page() {
        let config = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            8080,
            "test".to_string(),
        );
        let (page, limit) = PaginationParams::default().resolve(&config).unwrap();
        assert_eq!(page, 1);
        assert_eq!(limit, config.api_default_page_size);

        let (page, limit) = PaginationParams {
            page: Some(0),
            limit: Some(10_000),
        }
        .resolve(&config)
        .unwrap();
        assert_eq!(page, 1);
        assert_eq!(limit, config.api_max_page_size);
    }

    #[test]
    fn overflowing_page_is_rejected() {
        let config = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            8080,
            "test".to_string(),
        );
        let result = PaginationParams {
            page: Some(u64::MAX),
            limit: Some(20),
        }
        .resolve(&config);
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }
}
