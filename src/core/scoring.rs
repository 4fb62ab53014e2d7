use crate::core::policy::ScoringPolicy;
use crate::core::proximity::{PoiProximity, ProximityOracle};
use crate::models::{Amenity, PreferenceProfile, PropertyCandidate, ProximityDimension};
use std::fmt;
use std::sync::Arc;

/// One scoring term a profile asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Demand {
    Amenity { amenity: Amenity, points: u32 },
    Proximity { dimension: ProximityDimension, weight: u32, max: u32 },
}

impl Demand {
    /// Best contribution any property could make for this term
    fn ceiling(&self) -> u32 {
        match *self {
            Demand::Amenity { points, .. } => points,
            Demand::Proximity { weight, max, .. } => weight.saturating_mul(max),
        }
    }
}

/// Enumerate the terms of a profile: wanted amenities, then weighted
/// dimensions. Weight-0 dimensions never appear.
fn demands<'a>(profile: &'a PreferenceProfile, policy: &'a ScoringPolicy) -> impl Iterator<Item = Demand> + 'a {
    let amenities = profile.amenities().wanted().map(move |amenity| Demand::Amenity {
        amenity,
        points: policy.amenity_points(amenity),
    });

    let proximity = profile.proximity().weighted().map(move |(dimension, weight)| Demand::Proximity {
        dimension,
        weight,
        max: policy.max_proximity(dimension),
    });

    amenities.chain(proximity)
}

/// Raw match score of one candidate against one profile
///
/// Wanting an amenity the property lacks adds nothing; it never subtracts.
pub fn score_candidate(
    candidate: &PropertyCandidate,
    profile: &PreferenceProfile,
    policy: &ScoringPolicy,
    oracle: &dyn ProximityOracle,
) -> u32 {
    demands(profile, policy).fold(0u32, |total, demand| {
        let earned = match demand {
            Demand::Amenity { amenity, points } => {
                if candidate.has_amenity(amenity) {
                    points
                } else {
                    0
                }
            }
            Demand::Proximity { dimension, weight, max } => {
                let closeness = oracle.closeness(candidate, dimension, max).min(max);
                weight.saturating_mul(closeness)
            }
        };
        total.saturating_add(earned)
    })
}

/// Score a property with every wanted amenity and maximum closeness would get
pub fn max_score(profile: &PreferenceProfile, policy: &ScoringPolicy) -> u32 {
    demands(profile, policy).fold(0u32, |total, demand| total.saturating_add(demand.ceiling()))
}

/// Scores candidates against profiles with a fixed policy and proximity source
#[derive(Clone)]
pub struct PreferenceScorer {
    policy: ScoringPolicy,
    oracle: Arc<dyn ProximityOracle>,
}

impl PreferenceScorer {
    pub fn new(policy: ScoringPolicy, oracle: Arc<dyn ProximityOracle>) -> Self {
        Self { policy, oracle }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn score(&self, candidate: &PropertyCandidate, profile: &PreferenceProfile) -> u32 {
        score_candidate(candidate, profile, &self.policy, self.oracle.as_ref())
    }

    /// Normalization ceiling for `profile`; 0 when nothing is asked for
    pub fn max_score(&self, profile: &PreferenceProfile) -> u32 {
        max_score(profile, &self.policy)
    }
}

impl Default for PreferenceScorer {
    fn default() -> Self {
        Self::new(ScoringPolicy::default(), Arc::new(PoiProximity::default()))
    }
}

impl fmt::Debug for PreferenceScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceScorer")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmenityWishes, PropertyAmenities, ProximityWeights};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed closeness and counts how often it was asked
    struct FixedProximity {
        value: u32,
        calls: AtomicUsize,
    }

    impl FixedProximity {
        fn new(value: u32) -> Self {
            Self {
                value,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ProximityOracle for FixedProximity {
        fn closeness(&self, _candidate: &PropertyCandidate, _dimension: ProximityDimension, _max: u32) -> u32 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.value
        }
    }

    fn property(amenities: PropertyAmenities) -> PropertyCandidate {
        PropertyCandidate {
            unit_id: 7,
            rent: 1650.0,
            amenities: Some(amenities),
            ..Default::default()
        }
    }

    fn profile(amenities: AmenityWishes, proximity: ProximityWeights) -> PreferenceProfile {
        PreferenceProfile::new(1, 2, "Waterloo")
            .unwrap()
            .with_amenities(amenities)
            .with_proximity(proximity)
    }

    #[test]
    fn test_amenity_points() {
        let wishes = AmenityWishes::default()
            .with(Amenity::Gym)
            .with(Amenity::Pool)
            .with(Amenity::Parking);
        let candidate = property(PropertyAmenities {
            gym: Some(true),
            pool: Some(false),
            parking: Some(1),
            ..Default::default()
        });
        let profile = profile(wishes, ProximityWeights::default());
        let policy = ScoringPolicy::default();

        let score = score_candidate(&candidate, &profile, &policy, &FixedProximity::new(0));
        assert_eq!(score, 2);
        assert_eq!(max_score(&profile, &policy), 3);
    }

    #[test]
    fn test_unwanted_amenities_do_not_count() {
        let candidate = property(PropertyAmenities {
            gym: Some(true),
            deck: Some(true),
            ..Default::default()
        });
        let profile = profile(AmenityWishes::default(), ProximityWeights::default());
        let policy = ScoringPolicy::default();

        assert_eq!(score_candidate(&candidate, &profile, &policy, &FixedProximity::new(0)), 0);
        assert_eq!(max_score(&profile, &policy), 0);
    }

    #[test]
    fn test_proximity_weighting() {
        let weights = ProximityWeights {
            school: 5,
            hospital: 0,
            transit: 2,
        };
        let profile = profile(AmenityWishes::default(), weights);
        let policy = ScoringPolicy::default();
        let oracle = FixedProximity::new(4);

        let score = score_candidate(&property(PropertyAmenities::default()), &profile, &policy, &oracle);
        assert_eq!(score, 5 * 4 + 2 * 4);
        assert_eq!(max_score(&profile, &policy), 5 * 10 + 2 * 10);
    }

    #[test]
    fn test_zero_weight_dimensions_not_evaluated() {
        let weights = ProximityWeights {
            school: 0,
            hospital: 3,
            transit: 0,
        };
        let profile = profile(AmenityWishes::default(), weights);
        let oracle = FixedProximity::new(1);

        score_candidate(&property(PropertyAmenities::default()), &profile, &ScoringPolicy::default(), &oracle);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_oracle_overshoot_is_clamped() {
        let weights = ProximityWeights {
            school: 2,
            ..Default::default()
        };
        let profile = profile(AmenityWishes::default(), weights);
        let policy = ScoringPolicy::default();
        let oracle = FixedProximity::new(500);

        let score = score_candidate(&property(PropertyAmenities::default()), &profile, &policy, &oracle);
        assert_eq!(score, max_score(&profile, &policy));
    }

    #[test]
    fn test_custom_points_shared_by_max_score() {
        let policy = ScoringPolicy::default().with_amenity_points(Amenity::Pool, 4);
        let wishes = AmenityWishes::default().with(Amenity::Pool);
        let candidate = property(PropertyAmenities {
            pool: Some(true),
            ..Default::default()
        });
        let profile = profile(wishes, ProximityWeights::default());

        let scorer = PreferenceScorer::new(policy, Arc::new(FixedProximity::new(0)));
        assert_eq!(scorer.score(&candidate, &profile), 4);
        assert_eq!(scorer.max_score(&profile), 4);
    }
}
