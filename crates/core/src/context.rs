//! Explicit organization / project scope for editing sessions.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Scope a call sheet session operates in.
///
/// The organization is resolved by the caller (request header, user lookup)
/// and passed in; an unresolved organization makes saves a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgContext {
    pub organization_id: Option<DbId>,
    pub project_id: DbId,
}

impl OrgContext {
    /// A project scope with no organization resolved yet.
    pub fn for_project(project_id: DbId) -> Self {
        Self {
            organization_id: None,
            project_id,
        }
    }

    pub fn with_organization(mut self, organization_id: DbId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }
}
