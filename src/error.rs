//! Error types for the percolation core

use thiserror::Error;

/// Result alias used by the core (graph building, clique search, merging)
pub type Result<T> = std::result::Result<T, CpmError>;

/// Errors raised before any community computation starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CpmError {
    /// An interaction record could not be turned into an edge
    #[error("malformed edge record at row {row}: {reason}")]
    MalformedEdge {
        /// 1-based data row (0 for records added programmatically without a row)
        row: usize,
        /// What was wrong with the record
        reason: String,
    },

    /// A run parameter is out of range
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        message: String,
    },
}

impl CpmError {
    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        CpmError::MalformedEdge {
            row,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        CpmError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
