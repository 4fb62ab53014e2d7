// Core algorithm exports
pub mod buckets;
pub mod closeness;
pub mod distance;
pub mod error;
pub mod matcher;
pub mod policy;
pub mod price_band;
pub mod proximity;
pub mod ranking;
pub mod scoring;

pub use buckets::{BucketConfigError, BucketThresholds, BucketTier};
pub use closeness::{apply_closeness, percent_close};
pub use distance::haversine_distance;
pub use error::MatchError;
pub use matcher::{MatchOutcome, MatchReport, Matcher};
pub use policy::{PolicyError, ScoringPolicy};
pub use price_band::{PriceBandResolver, PriceTierTable};
pub use proximity::{PoiProximity, ProximityOracle};
pub use ranking::rank_candidates;
pub use scoring::{max_score, score_candidate, PreferenceScorer};
