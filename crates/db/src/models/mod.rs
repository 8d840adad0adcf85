//! Row structs for the call sheet tables.
//!
//! Each struct is a `FromRow` mirror of one table; conversions into the
//! domain types in `slate_core` parse the TEXT status and department columns.

pub mod call_sheet;
