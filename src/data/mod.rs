//! Input loading and validation

pub mod loader;
pub mod preprocessing;

pub use preprocessing::{validate_records, RawEdge};
