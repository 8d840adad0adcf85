//! Request handlers, one module per resource.

pub mod call_sheets;
