//! Organization scope extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use slate_core::types::DbId;

use crate::error::AppError;

/// Request header carrying the caller's organization id.
pub const ORGANIZATION_HEADER: &str = "x-organization-id";

/// Organization resolved from the `x-organization-id` header, if any.
///
/// A missing header is not a rejection: reads work without it and writes
/// report `ORGANIZATION_REQUIRED`. A header that is not an integer id is a
/// bad request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrgScope(pub Option<DbId>);

impl OrgScope {
    /// The organization id, or [`AppError::OrganizationRequired`].
    pub fn require(self) -> Result<DbId, AppError> {
        self.0.ok_or(AppError::OrganizationRequired)
    }
}

impl<S> FromRequestParts<S> for OrgScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ORGANIZATION_HEADER) else {
            return Ok(OrgScope(None));
        };
        let id = value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<DbId>().ok())
            .ok_or_else(|| {
                AppError::BadRequest(format!("{ORGANIZATION_HEADER} must be an integer id"))
            })?;
        Ok(OrgScope(Some(id)))
    }
}
