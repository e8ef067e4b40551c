//! Configuration management for the community analyzer

use crate::error::{CpmError, Result};
use serde::{Deserialize, Serialize};

/// How repeated interactions between the same pair of nodes are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Add the weights of every record for the pair
    #[default]
    Sum,
    /// Keep the strongest single record for the pair
    Max,
}

impl DuplicatePolicy {
    /// Combine an existing pair weight with a newly seen one
    pub fn combine(self, existing: f64, incoming: f64) -> f64 {
        match self {
            DuplicatePolicy::Sum => existing + incoming,
            DuplicatePolicy::Max => existing.max(incoming),
        }
    }
}

/// Parameters of a single percolation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Interaction records with weight below this value are dropped
    pub threshold: f64,

    /// Clique size used for percolation
    pub k: usize,

    /// Combination rule for repeated pairs
    pub duplicate_policy: DuplicatePolicy,

    /// Communities with fewer members are discarded before ids are assigned
    pub min_community_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: 4.0,
            k: 3,
            duplicate_policy: DuplicatePolicy::Sum,
            min_community_size: 1,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        threshold: f64,
        k: usize,
        duplicate_policy: DuplicatePolicy,
        min_community_size: usize,
    ) -> Self {
        Self {
            threshold,
            k,
            duplicate_policy,
            min_community_size,
        }
    }

    /// Same configuration with a different clique size
    pub fn with_k(&self, k: usize) -> Self {
        Self { k, ..self.clone() }
    }

    /// Reject parameters that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        validate_k(self.k)?;
        if self.min_community_size == 0 {
            return Err(CpmError::invalid(
                "min_community_size",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() {
        return Err(CpmError::invalid(
            "threshold",
            format!("must be a finite number, got {}", threshold),
        ));
    }
    if threshold < 0.0 {
        return Err(CpmError::invalid(
            "threshold",
            format!("must be non-negative, got {}", threshold),
        ));
    }
    Ok(())
}

pub(crate) fn validate_k(k: usize) -> Result<()> {
    if k < 2 {
        return Err(CpmError::invalid(
            "k",
            format!("clique size must be at least 2, got {}", k),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_small_k() {
        for k in [0, 1] {
            let err = Config::default().with_k(k).validate().unwrap_err();
            assert!(matches!(err, CpmError::InvalidParameter { name: "k", .. }));
        }
    }

    #[test]
    fn rejects_bad_thresholds() {
        for threshold in [-0.5, f64::NAN, f64::INFINITY] {
            let config = Config::new(threshold, 3, DuplicatePolicy::Sum, 1);
            let err = config.validate().unwrap_err();
            assert!(matches!(
                err,
                CpmError::InvalidParameter { name: "threshold", .. }
            ));
        }
    }

    #[test]
    fn zero_threshold_is_allowed() {
        assert!(Config::new(0.0, 2, DuplicatePolicy::Max, 1).validate().is_ok());
    }

    #[test]
    fn rejects_zero_min_community_size() {
        let config = Config::new(1.0, 3, DuplicatePolicy::Sum, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_policies_combine() {
        assert_eq!(DuplicatePolicy::Sum.combine(2.0, 3.0), 5.0);
        assert_eq!(DuplicatePolicy::Max.combine(2.0, 3.0), 3.0);
        assert_eq!(DuplicatePolicy::Max.combine(4.0, 3.0), 4.0);
    }
}
