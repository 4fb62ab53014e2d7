use crate::core::scoring::PreferenceScorer;
use crate::models::{PreferenceProfile, PropertyCandidate, ScoredCandidate};
use std::cmp::Ordering;

/// Score every candidate and sort best first
///
/// Ties on points go to the cheaper rent, then to the lower unit id, so the
/// order never depends on the order rows came back from the database.
/// `percent_close` is left at 0 for the normalizer to fill in.
pub fn rank_candidates(
    candidates: Vec<PropertyCandidate>,
    profile: &PreferenceProfile,
    scorer: &PreferenceScorer,
) -> Vec<ScoredCandidate> {
    let mut ranked: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|property| {
            let points = scorer.score(&property, profile);
            ScoredCandidate {
                property,
                points,
                percent_close: 0.0,
            }
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked
}

fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| a.property.rent.total_cmp(&b.property.rent))
        .then_with(|| a.property.unit_id.cmp(&b.property.unit_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amenity, AmenityWishes, PropertyAmenities};

    fn candidate(unit_id: i32, rent: f64, gym: bool) -> PropertyCandidate {
        PropertyCandidate {
            unit_id,
            rent,
            amenities: Some(PropertyAmenities {
                gym: Some(gym),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn gym_profile() -> PreferenceProfile {
        PreferenceProfile::new(1, 1, "Waterloo")
            .unwrap()
            .with_amenities(AmenityWishes::default().with(Amenity::Gym))
    }

    #[test]
    fn test_sorted_by_points_descending() {
        let ranked = rank_candidates(
            vec![candidate(1, 1000.0, false), candidate(2, 1900.0, true)],
            &gym_profile(),
            &PreferenceScorer::default(),
        );

        assert_eq!(ranked[0].property.unit_id, 2);
        assert_eq!(ranked[0].points, 1);
        assert_eq!(ranked[1].points, 0);
    }

    #[test]
    fn test_ties_broken_by_rent_then_unit_id() {
        let ranked = rank_candidates(
            vec![
                candidate(3, 1200.0, true),
                candidate(9, 1000.0, true),
                candidate(4, 1000.0, true),
            ],
            &gym_profile(),
            &PreferenceScorer::default(),
        );

        let order: Vec<i32> = ranked.iter().map(|c| c.property.unit_id).collect();
        assert_eq!(order, vec![4, 9, 3]);
    }

    #[test]
    fn test_empty_input() {
        let ranked = rank_candidates(vec![], &gym_profile(), &PreferenceScorer::default());
        assert!(ranked.is_empty());
    }
}
