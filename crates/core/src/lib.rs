//! Call sheet domain logic.
//!
//! The aggregate model and its local edits, the status state machine, the
//! keyed child diff, the store boundary and the editing session that ties
//! load / edit / save / publish together.

pub mod aggregate;
pub mod call_sheet;
pub mod context;
pub mod diff;
pub mod editor;
pub mod error;
pub mod memory_store;
pub mod row_key;
pub mod store;
pub mod summary;
pub mod types;
