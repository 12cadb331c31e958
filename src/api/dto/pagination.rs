//! Pagination query parameters.

use serde::Deserialize;
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::error::AppError;

/// Pagination query parameters for list endpoints.
///
/// Uses `serde_with` to parse numbers from query strings as integers.
/// Pagination applies only when both `page` and `limit` are present.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Largest accepted `limit`.
    pub const MAX_LIMIT: u32 = 100;

    /// Validates pagination parameters and converts to database offset/limit.
    ///
    /// # Validation
    ///
    /// - Page must be > 0
    /// - Limit must be between 1 and 100
    ///
    /// # Returns
    ///
    /// `None` when the list is not paginated, otherwise `(offset, limit)`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for out-of-range values.
    pub fn offset_limit(&self) -> Result<Option<(i64, i64)>, AppError> {
        let (Some(page), Some(limit)) = (self.page, self.limit) else {
            return Ok(None);
        };

        if page == 0 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                json!({ "page": page }),
            ));
        }

        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(AppError::bad_request(
                format!("Limit must be between 1 and {}", Self::MAX_LIMIT),
                json!({ "limit": limit }),
            ));
        }

        let offset = (page as i64 - 1) * limit as i64;
        Ok(Some((offset, limit as i64)))
    }
}
