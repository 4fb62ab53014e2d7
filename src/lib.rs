//! TraceRent - Property matching service for the TraceRent rental platform
//!
//! This library ranks rental properties against a tenant's preferences.
//! A request resolves a budget tier into a price band, fetches the city's
//! candidates in that band, scores and ranks them, converts scores into a
//! percent closeness and groups the result into named buckets.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    BucketThresholds, MatchError, MatchOutcome, MatchReport, Matcher, PreferenceScorer, PriceBandResolver,
    ScoringPolicy,
};
pub use models::{
    Amenity, MatchBuckets, PreferenceProfile, PriceBand, PropertyCandidate, ProximityDimension, ScoredCandidate,
    TenantMatchingRequest, TenantMatchingResponse,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let resolver = PriceBandResolver::default();
        let band = resolver
            .resolve(
                "Waterloo",
                Some(PriceBand {
                    min_rent: 1000.0,
                    max_rent: 2000.0,
                }),
                1,
            )
            .unwrap();
        assert_eq!(band.min_rent, 1000.0);
        assert!(band.max_rent < 2000.0);
    }
}
