use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Cannot transition call sheet from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Index {index} out of range for {collection} (len {len})")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
