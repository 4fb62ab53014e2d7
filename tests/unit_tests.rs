// Unit tests for TraceRent

use trace_rent::core::{
    buckets::BucketThresholds,
    closeness::{apply_closeness, percent_close},
    distance::haversine_distance,
    policy::ScoringPolicy,
    price_band::{PriceBandResolver, PriceTierTable},
    proximity::{PoiProximity, ProximityOracle},
    ranking::rank_candidates,
    scoring::{max_score, score_candidate, PreferenceScorer},
    MatchError,
};
use trace_rent::models::{
    Amenity, AmenityWishes, PointOfInterest, PreferenceProfile, PriceBand, PropertyAmenities, PropertyCandidate,
    PropertyLocation, ProximityDimension, ProximityWeights,
};

fn create_property(unit_id: i32, rent: f64, amenities: PropertyAmenities) -> PropertyCandidate {
    PropertyCandidate {
        unit_id,
        prop_name: Some(format!("Unit {}", unit_id)),
        rent,
        amenities: Some(amenities),
        ..Default::default()
    }
}

fn located_property(unit_id: i32, latitude: &str, longitude: &str) -> PropertyCandidate {
    PropertyCandidate {
        unit_id,
        rent: 1500.0,
        location: Some(PropertyLocation {
            city: Some("Waterloo".to_string()),
            latitude: Some(latitude.to_string()),
            longitude: Some(longitude.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn create_profile(amenities: AmenityWishes) -> PreferenceProfile {
    PreferenceProfile::new(1, 2, "Waterloo")
        .unwrap()
        .with_amenities(amenities)
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(43.4643, -80.5204, 43.4643, -80.5204);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_waterloo_to_kitchener() {
    // Uptown Waterloo to downtown Kitchener is a few km
    let distance = haversine_distance(43.4643, -80.5204, 43.4516, -80.4925);
    assert!(distance > 1.5 && distance < 6.0, "got {}", distance);
}

#[test]
fn test_profile_rejects_invalid_input() {
    assert!(matches!(
        PreferenceProfile::new(0, 1, "Waterloo"),
        Err(MatchError::InvalidProfile(_))
    ));
    assert!(matches!(
        PreferenceProfile::new(1, 0, "Waterloo"),
        Err(MatchError::InvalidProfile(_))
    ));
    assert!(matches!(
        PreferenceProfile::new(1, 1, "   "),
        Err(MatchError::InvalidProfile(_))
    ));
}

#[test]
fn test_score_counts_wanted_amenities_only() {
    let policy = ScoringPolicy::default();
    let oracle = PoiProximity::default();
    let profile = create_profile(AmenityWishes::default().with(Amenity::Gym).with(Amenity::Pool));

    let both = create_property(
        1,
        1200.0,
        PropertyAmenities {
            gym: Some(true),
            pool: Some(true),
            deck: Some(true),
            ..Default::default()
        },
    );
    let gym_only = create_property(
        2,
        1200.0,
        PropertyAmenities {
            gym: Some(true),
            ..Default::default()
        },
    );

    assert_eq!(score_candidate(&both, &profile, &policy, &oracle), 2);
    assert_eq!(score_candidate(&gym_only, &profile, &policy, &oracle), 1);
    assert_eq!(max_score(&profile, &policy), 2);
}

#[test]
fn test_parking_counts_spots() {
    let policy = ScoringPolicy::default();
    let oracle = PoiProximity::default();
    let profile = create_profile(AmenityWishes::default().with(Amenity::Parking));

    let no_spots = create_property(
        1,
        1000.0,
        PropertyAmenities {
            parking: Some(0),
            ..Default::default()
        },
    );
    let two_spots = create_property(
        2,
        1000.0,
        PropertyAmenities {
            parking: Some(2),
            ..Default::default()
        },
    );

    assert_eq!(score_candidate(&no_spots, &profile, &policy, &oracle), 0);
    assert_eq!(score_candidate(&two_spots, &profile, &policy, &oracle), 1);
}

#[test]
fn test_missing_amenity_data_scores_zero() {
    let policy = ScoringPolicy::default();
    let oracle = PoiProximity::default();
    let profile = create_profile(AmenityWishes::default().with(Amenity::Gym));

    let bare = PropertyCandidate {
        unit_id: 9,
        rent: 1000.0,
        ..Default::default()
    };

    assert_eq!(score_candidate(&bare, &profile, &policy, &oracle), 0);
}

#[test]
fn test_score_never_exceeds_max() {
    let policy = ScoringPolicy::default()
        .with_amenity_points(Amenity::Gym, 3)
        .with_max_proximity(ProximityDimension::School, 10);
    let school = PointOfInterest {
        kind: ProximityDimension::School,
        name: "University of Waterloo".to_string(),
        latitude: 43.4723,
        longitude: -80.5449,
    };
    let oracle = PoiProximity::new(vec![school], 5.0);

    let profile = create_profile(AmenityWishes::default().with(Amenity::Gym)).with_proximity(ProximityWeights {
        school: 4,
        ..Default::default()
    });

    let mut next_door = located_property(1, "43.4723", "-80.5449");
    next_door.amenities = Some(PropertyAmenities {
        gym: Some(true),
        ..Default::default()
    });

    let max = max_score(&profile, &policy);
    let score = score_candidate(&next_door, &profile, &policy, &oracle);

    assert_eq!(max, 3 + 4 * 10);
    assert_eq!(score, max);
}

#[test]
fn test_proximity_decays_with_distance() {
    let oracle = PoiProximity::new(
        vec![PointOfInterest {
            kind: ProximityDimension::Transit,
            name: "Waterloo Public Square".to_string(),
            latitude: 43.4643,
            longitude: -80.5204,
        }],
        5.0,
    );

    let near = located_property(1, "43.4650", "-80.5210");
    let mid = located_property(2, "43.4800", "-80.5204");
    let far = located_property(3, "43.6532", "-79.3832");
    let unparsable = located_property(4, "north", "-80.52");

    let near_score = oracle.closeness(&near, ProximityDimension::Transit, 10);
    let mid_score = oracle.closeness(&mid, ProximityDimension::Transit, 10);

    assert!(near_score > mid_score, "{} vs {}", near_score, mid_score);
    assert!(near_score <= 10);
    assert_eq!(oracle.closeness(&far, ProximityDimension::Transit, 10), 0);
    assert_eq!(oracle.closeness(&unparsable, ProximityDimension::Transit, 10), 0);
    assert_eq!(oracle.closeness(&near, ProximityDimension::School, 10), 0);
}

#[test]
fn test_percent_close_bounds() {
    assert_eq!(percent_close(0, 0), 100.0);
    assert_eq!(percent_close(0, 4), 0.0);
    assert_eq!(percent_close(4, 4), 100.0);
    assert_eq!(percent_close(1, 4), 25.0);
    assert_eq!(percent_close(9, 4), 100.0);
}

#[test]
fn test_ranking_tie_breaks_on_rent() {
    let scorer = PreferenceScorer::default();
    let profile = create_profile(AmenityWishes::default().with(Amenity::Gym));
    let gym = || PropertyAmenities {
        gym: Some(true),
        ..Default::default()
    };

    let candidates = vec![
        create_property(1, 1200.0, gym()),
        create_property(2, 1000.0, gym()),
        create_property(3, 900.0, PropertyAmenities::default()),
    ];

    let ranked = rank_candidates(candidates, &profile, &scorer);
    let order: Vec<i32> = ranked.iter().map(|c| c.property.unit_id).collect();

    assert_eq!(order, vec![2, 1, 3]);
}

#[test]
fn test_ranking_preserves_length() {
    let scorer = PreferenceScorer::default();
    let profile = create_profile(AmenityWishes::default().with(Amenity::Deck));

    let candidates: Vec<PropertyCandidate> = (0..25)
        .map(|i| {
            create_property(
                i,
                1000.0 + (i % 7) as f64 * 50.0,
                PropertyAmenities {
                    deck: Some(i % 3 == 0),
                    ..Default::default()
                },
            )
        })
        .collect();

    let ranked = rank_candidates(candidates, &profile, &scorer);
    assert_eq!(ranked.len(), 25);

    for pair in ranked.windows(2) {
        assert!(pair[0].points >= pair[1].points);
    }
}

#[test]
fn test_scoring_same_pair_is_stable() {
    let oracle = PoiProximity::new(
        vec![
            PointOfInterest {
                kind: ProximityDimension::School,
                name: "Waterloo Collegiate".to_string(),
                latitude: 43.4739,
                longitude: -80.5325,
            },
            PointOfInterest {
                kind: ProximityDimension::Hospital,
                name: "Grand River Hospital".to_string(),
                latitude: 43.4566,
                longitude: -80.5118,
            },
        ],
        5.0,
    );
    let policy = ScoringPolicy::default().with_max_proximity(ProximityDimension::School, 8);
    let scorer = PreferenceScorer::new(policy, std::sync::Arc::new(oracle));

    let profile = create_profile(AmenityWishes::default().with(Amenity::Gym).with(Amenity::Parking))
        .with_proximity(ProximityWeights {
            school: 3,
            hospital: 2,
            transit: 1,
        });

    let mut candidate = located_property(7, "43.4690", "-80.5260");
    candidate.amenities = Some(PropertyAmenities {
        gym: Some(true),
        parking: Some(2),
        ..Default::default()
    });

    let first = scorer.score(&candidate, &profile);
    let second = scorer.score(&candidate, &profile);
    let from_clone = scorer.score(&candidate.clone(), &profile.clone());

    assert!(first > 2, "expected proximity points on top of amenities, got {}", first);
    assert_eq!(first, second);
    assert_eq!(first, from_clone);
}

#[test]
fn test_closeness_is_idempotent() {
    let scorer = PreferenceScorer::default();
    let profile = create_profile(AmenityWishes::default().with(Amenity::Gym).with(Amenity::Pool));
    let candidates = vec![
        create_property(
            1,
            1000.0,
            PropertyAmenities {
                gym: Some(true),
                ..Default::default()
            },
        ),
        create_property(2, 1100.0, PropertyAmenities::default()),
    ];

    let mut ranked = rank_candidates(candidates, &profile, &scorer);
    apply_closeness(&mut ranked, 2);
    let first = ranked.clone();
    apply_closeness(&mut ranked, 2);

    assert_eq!(first, ranked);
    assert_eq!(ranked[0].percent_close, 50.0);
    assert_eq!(ranked[1].percent_close, 0.0);
}

#[test]
fn test_buckets_cover_every_candidate() {
    let scorer = PreferenceScorer::default();
    let profile = create_profile(
        AmenityWishes::default()
            .with(Amenity::Gym)
            .with(Amenity::Pool)
            .with(Amenity::Deck),
    );

    let candidates: Vec<PropertyCandidate> = (0..12)
        .map(|i| {
            create_property(
                i,
                1000.0 + i as f64,
                PropertyAmenities {
                    gym: Some(i % 2 == 0),
                    pool: Some(i % 3 == 0),
                    deck: Some(i % 4 == 0),
                    ..Default::default()
                },
            )
        })
        .collect();

    let mut ranked = rank_candidates(candidates, &profile, &scorer);
    apply_closeness(&mut ranked, scorer.max_score(&profile));
    let buckets = BucketThresholds::default().classify(ranked);

    assert_eq!(buckets.len(), 12);

    let mut seen: Vec<i32> = buckets
        .iter()
        .flat_map(|bucket| bucket.properties.iter().map(|c| c.property.unit_id))
        .collect();
    seen.sort();
    assert_eq!(seen, (0..12).collect::<Vec<_>>());

    for bucket in buckets.iter() {
        for candidate in &bucket.properties {
            assert!(candidate.percent_close >= bucket.min_percent);
            assert!((0.0..=100.0).contains(&candidate.percent_close));
        }
    }
}

#[test]
fn test_tier_lookup_is_bounds_checked() {
    let table = PriceTierTable::new(
        "Waterloo",
        vec![
            PriceBand {
                min_rent: 800.0,
                max_rent: 1200.0,
            },
            PriceBand {
                min_rent: 1200.0,
                max_rent: 1800.0,
            },
            PriceBand {
                min_rent: 1800.0,
                max_rent: 2600.0,
            },
        ],
    )
    .unwrap();

    assert_eq!(table.band(3).unwrap().max_rent, 2600.0);
    assert_eq!(
        table.band(5),
        Err(MatchError::InvalidTier {
            city: "Waterloo".to_string(),
            ordinal: 5,
            available: 3,
        })
    );
    assert!(matches!(table.band(0), Err(MatchError::InvalidTier { .. })));
}

#[test]
fn test_resolver_without_city_data() {
    let resolver = PriceBandResolver::default();
    assert_eq!(
        resolver.resolve("Atlantis", None, 1),
        Err(MatchError::NoPriceDataForCity("Atlantis".to_string()))
    );
}
