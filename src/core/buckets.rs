use crate::models::{MatchBucket, MatchBuckets, ScoredCandidate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BucketConfigError {
    #[error("At least one match bucket must be configured")]
    Empty,

    #[error("Duplicate match bucket name: {0}")]
    DuplicateName(String),

    #[error("Match bucket '{name}' has threshold {min_percent} outside [0, 100]")]
    ThresholdOutOfRange { name: String, min_percent: f64 },
}

/// A named tier and the lowest percent closeness (inclusive) it accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTier {
    pub name: String,
    pub min_percent: f64,
}

impl BucketTier {
    pub fn new(name: impl Into<String>, min_percent: f64) -> Self {
        Self {
            name: name.into(),
            min_percent,
        }
    }
}

/// Validated bucket thresholds, highest first
#[derive(Debug, Clone, PartialEq)]
pub struct BucketThresholds {
    tiers: Vec<BucketTier>,
}

impl BucketThresholds {
    pub fn new(mut tiers: Vec<BucketTier>) -> Result<Self, BucketConfigError> {
        if tiers.is_empty() {
            return Err(BucketConfigError::Empty);
        }

        let mut seen = HashSet::new();
        for tier in &tiers {
            if !seen.insert(tier.name.as_str()) {
                return Err(BucketConfigError::DuplicateName(tier.name.clone()));
            }
            if !(0.0..=100.0).contains(&tier.min_percent) {
                return Err(BucketConfigError::ThresholdOutOfRange {
                    name: tier.name.clone(),
                    min_percent: tier.min_percent,
                });
            }
        }

        // Stable, so equal thresholds keep their configured order
        tiers.sort_by(|a, b| b.min_percent.total_cmp(&a.min_percent));

        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[BucketTier] {
        &self.tiers
    }

    /// Index of the tier a percent closeness falls into
    ///
    /// The last (lowest) tier catches everything below the others.
    fn tier_index(&self, percent_close: f64) -> usize {
        self.tiers
            .iter()
            .position(|tier| percent_close >= tier.min_percent)
            .unwrap_or(self.tiers.len() - 1)
    }

    /// Partition a ranked, normalized list into tiers
    ///
    /// Every candidate lands in exactly one tier, empty tiers are kept, and
    /// the incoming order is preserved inside each tier.
    pub fn classify(&self, ranked: Vec<ScoredCandidate>) -> MatchBuckets {
        let mut buckets: Vec<MatchBucket> = self
            .tiers
            .iter()
            .map(|tier| MatchBucket {
                name: tier.name.clone(),
                min_percent: tier.min_percent,
                properties: Vec::new(),
            })
            .collect();

        for candidate in ranked {
            let index = self.tier_index(candidate.percent_close);
            buckets[index].properties.push(candidate);
        }

        MatchBuckets(buckets)
    }
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
        }
    }
}

/// excellent >= 80, good >= 50, fair otherwise
pub fn default_tiers() -> Vec<BucketTier> {
    vec![
        BucketTier::new("excellent", 80.0),
        BucketTier::new("good", 50.0),
        BucketTier::new("fair", 0.0),
    ]
}
