use crate::models::{Amenity, ProximityDimension};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Points a property earns for each wanted amenity it has, unless configured
pub const DEFAULT_AMENITY_POINTS: u32 = 1;

/// Ceiling of the proximity closeness per dimension, unless configured
pub const DEFAULT_MAX_PROXIMITY: u32 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("Unknown amenity in scoring policy: {0}")]
    UnknownAmenity(String),

    #[error("Unknown proximity dimension in scoring policy: {0}")]
    UnknownDimension(String),
}

/// Point values shared by the scorer and the max-score estimator
///
/// Both read from the same instance, so the normalization ceiling always
/// uses the formula the candidates were scored with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringPolicy {
    amenity_points: BTreeMap<Amenity, u32>,
    max_proximity: BTreeMap<ProximityDimension, u32>,
}

impl ScoringPolicy {
    pub fn new() -> Self {
        Self {
            amenity_points: BTreeMap::new(),
            max_proximity: BTreeMap::new(),
        }
    }

    /// Build a policy from name-keyed overrides, as found in configuration
    pub fn from_names(
        amenity_points: &HashMap<String, u32>,
        max_proximity: &HashMap<String, u32>,
    ) -> Result<Self, PolicyError> {
        let mut policy = Self::new();

        for (name, points) in amenity_points {
            let amenity = name
                .parse::<Amenity>()
                .map_err(|_| PolicyError::UnknownAmenity(name.clone()))?;
            policy = policy.with_amenity_points(amenity, *points);
        }

        for (name, max) in max_proximity {
            let dimension = name
                .parse::<ProximityDimension>()
                .map_err(|_| PolicyError::UnknownDimension(name.clone()))?;
            policy = policy.with_max_proximity(dimension, *max);
        }

        Ok(policy)
    }

    pub fn with_amenity_points(mut self, amenity: Amenity, points: u32) -> Self {
        self.amenity_points.insert(amenity, points);
        self
    }

    pub fn with_max_proximity(mut self, dimension: ProximityDimension, max: u32) -> Self {
        self.max_proximity.insert(dimension, max);
        self
    }

    pub fn amenity_points(&self, amenity: Amenity) -> u32 {
        self.amenity_points
            .get(&amenity)
            .copied()
            .unwrap_or(DEFAULT_AMENITY_POINTS)
    }

    pub fn max_proximity(&self, dimension: ProximityDimension) -> u32 {
        self.max_proximity
            .get(&dimension)
            .copied()
            .unwrap_or(DEFAULT_MAX_PROXIMITY)
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::new()
    }
}
