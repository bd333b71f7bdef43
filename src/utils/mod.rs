//! Internal helpers for query-string building and lenient argument shapes.

pub(crate) mod query;
pub(crate) mod serde;
