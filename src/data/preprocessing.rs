//! Validation of raw interaction rows

use crate::error::{CpmError, Result};
use crate::graph::EdgeRecord;

/// An interaction row as read from a table, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEdge {
    /// 1-based data row
    pub row: usize,
    pub source: Option<String>,
    pub target: Option<String>,
    /// Weight after numeric conversion; `None` if missing or not a number
    pub weight: Option<f64>,
    /// Weight cell as text, kept for error messages
    pub weight_text: Option<String>,
}

/// Turn raw rows into edge records, failing on the first malformed row
pub fn validate_records(raw: &[RawEdge]) -> Result<Vec<EdgeRecord>> {
    raw.iter().map(validate_record).collect()
}

fn validate_record(raw: &RawEdge) -> Result<EdgeRecord> {
    let source = non_empty(raw.source.as_deref())
        .ok_or_else(|| CpmError::malformed(raw.row, "missing source"))?;
    let target = non_empty(raw.target.as_deref())
        .ok_or_else(|| CpmError::malformed(raw.row, "missing target"))?;

    let weight = match raw.weight {
        Some(w) if w.is_finite() => w,
        _ => {
            let reason = match raw.weight_text.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => format!("weight is not a number: '{}'", text),
                _ => "missing weight".to_string(),
            };
            return Err(CpmError::malformed(raw.row, reason));
        }
    };

    if weight < 0.0 {
        return Err(CpmError::malformed(raw.row, format!("negative weight: {}", weight)));
    }

    Ok(EdgeRecord::new(source, target, weight))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
