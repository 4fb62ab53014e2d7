use crate::core::distance::haversine_distance;
use crate::models::{PointOfInterest, PropertyCandidate, ProximityDimension};

/// Default radius beyond which a point of interest adds no closeness
pub const DEFAULT_PROXIMITY_RADIUS_KM: f64 = 5.0;

/// Source of proximity closeness for a property
///
/// Implementations return a value in `0..=max`; anything above `max` is
/// clamped by the scorer. Missing data must yield 0.
pub trait ProximityOracle: Send + Sync {
    fn closeness(&self, candidate: &PropertyCandidate, dimension: ProximityDimension, max: u32) -> u32;
}

/// Closeness from the distance to the nearest configured point of interest
///
/// closeness = round(max * e^(-d / (radius / 2))) inside the radius, 0 outside.
#[derive(Debug, Clone)]
pub struct PoiProximity {
    points: Vec<PointOfInterest>,
    radius_km: f64,
}

impl PoiProximity {
    pub fn new(points: Vec<PointOfInterest>, radius_km: f64) -> Self {
        Self { points, radius_km }
    }

    pub fn points(&self) -> &[PointOfInterest] {
        &self.points
    }

    /// Distance in km to the nearest point of the given kind
    fn nearest_km(&self, latitude: f64, longitude: f64, dimension: ProximityDimension) -> Option<f64> {
        self.points
            .iter()
            .filter(|point| point.kind == dimension)
            .map(|point| haversine_distance(latitude, longitude, point.latitude, point.longitude))
            .min_by(|a, b| a.total_cmp(b))
    }
}

impl Default for PoiProximity {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_PROXIMITY_RADIUS_KM)
    }
}

impl ProximityOracle for PoiProximity {
    fn closeness(&self, candidate: &PropertyCandidate, dimension: ProximityDimension, max: u32) -> u32 {
        if max == 0 || !(self.radius_km > 0.0) {
            return 0;
        }

        let Some((latitude, longitude)) = candidate.coordinates() else {
            return 0;
        };
        let Some(distance_km) = self.nearest_km(latitude, longitude, dimension) else {
            return 0;
        };

        if distance_km >= self.radius_km {
            return 0;
        }

        let decay = (-distance_km / (self.radius_km * 0.5)).exp();
        ((max as f64 * decay).round() as u32).min(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyLocation;

    fn candidate_at(latitude: &str, longitude: &str) -> PropertyCandidate {
        PropertyCandidate {
            unit_id: 1,
            rent: 1800.0,
            location: Some(PropertyLocation {
                latitude: Some(latitude.to_string()),
                longitude: Some(longitude.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn school(latitude: f64, longitude: f64) -> PointOfInterest {
        PointOfInterest {
            kind: ProximityDimension::School,
            name: "Public School".to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_on_top_of_poi_is_max() {
        let oracle = PoiProximity::new(vec![school(43.4643, -80.5204)], 5.0);
        let candidate = candidate_at("43.4643", "-80.5204");

        assert_eq!(oracle.closeness(&candidate, ProximityDimension::School, 10), 10);
    }

    #[test]
    fn test_closeness_decays_with_distance() {
        let oracle = PoiProximity::new(vec![school(43.4643, -80.5204)], 5.0);
        let near = candidate_at("43.4700", "-80.5204");
        let far = candidate_at("43.4900", "-80.5204");

        let near_score = oracle.closeness(&near, ProximityDimension::School, 10);
        let far_score = oracle.closeness(&far, ProximityDimension::School, 10);
        assert!(near_score > far_score);
        assert!(near_score <= 10);
    }

    #[test]
    fn test_outside_radius_is_zero() {
        let oracle = PoiProximity::new(vec![school(43.4643, -80.5204)], 5.0);
        let toronto = candidate_at("43.6532", "-79.3832");

        assert_eq!(oracle.closeness(&toronto, ProximityDimension::School, 10), 0);
    }

    #[test]
    fn test_missing_data_is_zero() {
        let oracle = PoiProximity::new(vec![school(43.4643, -80.5204)], 5.0);
        let no_location = PropertyCandidate {
            unit_id: 2,
            rent: 1200.0,
            ..Default::default()
        };
        let candidate = candidate_at("43.4643", "-80.5204");

        assert_eq!(oracle.closeness(&no_location, ProximityDimension::School, 10), 0);
        // No hospitals configured
        assert_eq!(oracle.closeness(&candidate, ProximityDimension::Hospital, 10), 0);
    }
}
