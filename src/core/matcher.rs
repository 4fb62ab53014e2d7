use crate::core::buckets::BucketThresholds;
use crate::core::closeness::apply_closeness;
use crate::core::ranking::rank_candidates;
use crate::core::scoring::PreferenceScorer;
use crate::models::{MatchBuckets, PreferenceProfile, PriceBand, PropertyCandidate};
use serde::Serialize;

/// Complete result of one matching request
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub price_band: PriceBand,
    pub max_points: u32,
    pub total_properties: usize,
    pub buckets: MatchBuckets,
}

/// Outcome of the matching pipeline
///
/// `NoProperties` is a normal result, not an error: the price band simply
/// contained nothing to rank.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    NoProperties,
    Matched(MatchReport),
}

impl MatchOutcome {
    pub fn report(&self) -> Option<&MatchReport> {
        match self {
            MatchOutcome::Matched(report) => Some(report),
            MatchOutcome::NoProperties => None,
        }
    }

    pub fn into_report(self) -> Option<MatchReport> {
        match self {
            MatchOutcome::Matched(report) => Some(report),
            MatchOutcome::NoProperties => None,
        }
    }
}

/// Matching orchestrator
///
/// # Pipeline Stages
/// 1. Score every candidate and rank them
/// 2. Compute the best achievable score for the profile
/// 3. Normalize points into percent closeness
/// 4. Partition into match buckets
///
/// Holds no per-request state; one instance is shared by all workers.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    scorer: PreferenceScorer,
    thresholds: BucketThresholds,
}

impl Matcher {
    pub fn new(scorer: PreferenceScorer, thresholds: BucketThresholds) -> Self {
        Self { scorer, thresholds }
    }

    pub fn scorer(&self) -> &PreferenceScorer {
        &self.scorer
    }

    pub fn thresholds(&self) -> &BucketThresholds {
        &self.thresholds
    }

    /// Rank and bucket candidates already filtered to `price_band`
    pub fn find_matches(
        &self,
        profile: &PreferenceProfile,
        price_band: PriceBand,
        candidates: Vec<PropertyCandidate>,
    ) -> MatchOutcome {
        if candidates.is_empty() {
            return MatchOutcome::NoProperties;
        }

        let total_properties = candidates.len();
        let mut ranked = rank_candidates(candidates, profile, &self.scorer);

        let max_points = self.scorer.max_score(profile);
        apply_closeness(&mut ranked, max_points);

        tracing::debug!(
            "Ranked {} properties in {} (max points: {}, best: {})",
            total_properties,
            profile.city(),
            max_points,
            ranked.first().map_or(0, |c| c.points)
        );

        let buckets = self.thresholds.classify(ranked);

        MatchOutcome::Matched(MatchReport {
            price_band,
            max_points,
            total_properties,
            buckets,
        })
    }
}
