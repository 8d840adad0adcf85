//! Identity of a child row inside an editable call sheet.
//!
//! Rows the store has assigned an id to are [`RowKey::Persisted`]; rows added
//! locally and not yet saved are [`RowKey::Draft`]. Only persisted keys may be
//! referenced in store writes (updates and deletes).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::DbId;

/// Identity of a scene, cast or crew row.
///
/// Serialized externally tagged: `{"persisted": 42}` or
/// `{"draft": "6f1c..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKey {
    Persisted(DbId),
    Draft(Uuid),
}

impl RowKey {
    /// Generate a fresh local key for an unsaved row.
    pub fn new_draft() -> Self {
        Self::Draft(Uuid::new_v4())
    }

    /// The store id, if this row has been persisted.
    pub fn persisted_id(&self) -> Option<DbId> {
        match self {
            Self::Persisted(id) => Some(*id),
            Self::Draft(_) => None,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }
}

impl From<DbId> for RowKey {
    fn from(id: DbId) -> Self {
        Self::Persisted(id)
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persisted(id) => write!(f, "{id}"),
            Self::Draft(uuid) => write!(f, "draft:{uuid}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_keys_are_unique() {
        assert_ne!(RowKey::new_draft(), RowKey::new_draft());
    }

    #[test]
    fn only_persisted_keys_expose_an_id() {
        assert_eq!(RowKey::Persisted(7).persisted_id(), Some(7));
        assert_eq!(RowKey::new_draft().persisted_id(), None);
        assert!(RowKey::new_draft().is_draft());
    }

    #[test]
    fn serializes_externally_tagged() {
        let json = serde_json::to_value(RowKey::Persisted(42)).unwrap();
        assert_eq!(json, serde_json::json!({"persisted": 42}));

        let parsed: RowKey =
            serde_json::from_value(serde_json::json!({"draft": Uuid::nil()})).unwrap();
        assert_eq!(parsed, RowKey::Draft(Uuid::nil()));
    }

    #[test]
    fn display_distinguishes_drafts() {
        assert_eq!(RowKey::Persisted(3).to_string(), "3");
        assert!(RowKey::Draft(Uuid::nil()).to_string().starts_with("draft:"));
    }
}
