use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::core::error::MatchError;

/// Amenities a tenant can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    Parking,
    Gym,
    PetFriendly,
    Pool,
    WheelchairAccessibility,
    InHouseLaundry,
    KidsPlayarea,
    PartyHall,
    Backyard,
    Deck,
    VisitorParking,
}

impl Amenity {
    pub const ALL: [Amenity; 11] = [
        Amenity::Parking,
        Amenity::Gym,
        Amenity::PetFriendly,
        Amenity::Pool,
        Amenity::WheelchairAccessibility,
        Amenity::InHouseLaundry,
        Amenity::KidsPlayarea,
        Amenity::PartyHall,
        Amenity::Backyard,
        Amenity::Deck,
        Amenity::VisitorParking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Amenity::Parking => "parking",
            Amenity::Gym => "gym",
            Amenity::PetFriendly => "pet_friendly",
            Amenity::Pool => "pool",
            Amenity::WheelchairAccessibility => "wheelchair_accessibility",
            Amenity::InHouseLaundry => "in_house_laundry",
            Amenity::KidsPlayarea => "kids_playarea",
            Amenity::PartyHall => "party_hall",
            Amenity::Backyard => "backyard",
            Amenity::Deck => "deck",
            Amenity::VisitorParking => "visitor_parking",
        }
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Amenity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amenity::ALL
            .into_iter()
            .find(|amenity| amenity.as_str() == s)
            .ok_or_else(|| format!("unknown amenity '{}'", s))
    }
}

/// Points of interest a tenant can weight by proximity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityDimension {
    School,
    Hospital,
    Transit,
}

impl ProximityDimension {
    pub const ALL: [ProximityDimension; 3] = [
        ProximityDimension::School,
        ProximityDimension::Hospital,
        ProximityDimension::Transit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProximityDimension::School => "school",
            ProximityDimension::Hospital => "hospital",
            ProximityDimension::Transit => "transit",
        }
    }
}

impl fmt::Display for ProximityDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProximityDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProximityDimension::ALL
            .into_iter()
            .find(|dimension| dimension.as_str() == s)
            .ok_or_else(|| format!("unknown proximity dimension '{}'", s))
    }
}

/// Amenity wishes of a tenant. `false` means "don't care".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmenityWishes {
    pub parking: bool,
    pub gym: bool,
    pub pet_friendly: bool,
    pub pool: bool,
    pub wheelchair_accessibility: bool,
    pub in_house_laundry: bool,
    pub kids_playarea: bool,
    pub party_hall: bool,
    pub backyard: bool,
    pub deck: bool,
    pub visitor_parking: bool,
}

impl AmenityWishes {
    pub fn wants(&self, amenity: Amenity) -> bool {
        match amenity {
            Amenity::Parking => self.parking,
            Amenity::Gym => self.gym,
            Amenity::PetFriendly => self.pet_friendly,
            Amenity::Pool => self.pool,
            Amenity::WheelchairAccessibility => self.wheelchair_accessibility,
            Amenity::InHouseLaundry => self.in_house_laundry,
            Amenity::KidsPlayarea => self.kids_playarea,
            Amenity::PartyHall => self.party_hall,
            Amenity::Backyard => self.backyard,
            Amenity::Deck => self.deck,
            Amenity::VisitorParking => self.visitor_parking,
        }
    }

    /// Iterate over the amenities marked as wanted
    pub fn wanted(&self) -> impl Iterator<Item = Amenity> + '_ {
        Amenity::ALL.into_iter().filter(|amenity| self.wants(*amenity))
    }

    /// Mark a single amenity as wanted
    pub fn with(mut self, amenity: Amenity) -> Self {
        let flag = match amenity {
            Amenity::Parking => &mut self.parking,
            Amenity::Gym => &mut self.gym,
            Amenity::PetFriendly => &mut self.pet_friendly,
            Amenity::Pool => &mut self.pool,
            Amenity::WheelchairAccessibility => &mut self.wheelchair_accessibility,
            Amenity::InHouseLaundry => &mut self.in_house_laundry,
            Amenity::KidsPlayarea => &mut self.kids_playarea,
            Amenity::PartyHall => &mut self.party_hall,
            Amenity::Backyard => &mut self.backyard,
            Amenity::Deck => &mut self.deck,
            Amenity::VisitorParking => &mut self.visitor_parking,
        };
        *flag = true;
        self
    }
}

/// Importance weights per proximity dimension, 0 meaning unweighted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityWeights {
    pub school: u32,
    pub hospital: u32,
    pub transit: u32,
}

impl ProximityWeights {
    pub fn weight(&self, dimension: ProximityDimension) -> u32 {
        match dimension {
            ProximityDimension::School => self.school,
            ProximityDimension::Hospital => self.hospital,
            ProximityDimension::Transit => self.transit,
        }
    }

    /// Dimensions with a positive weight, paired with that weight
    pub fn weighted(&self) -> impl Iterator<Item = (ProximityDimension, u32)> + '_ {
        ProximityDimension::ALL
            .into_iter()
            .map(|dimension| (dimension, self.weight(dimension)))
            .filter(|(_, weight)| *weight > 0)
    }
}

/// Matching criteria for one tenant matching request
///
/// Built once per request through [`PreferenceProfile::new`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceProfile {
    tenant_category_id: i32,
    budget_tier: u32,
    city: String,
    location_category_id: Option<i32>,
    amenities: AmenityWishes,
    proximity: ProximityWeights,
}

impl PreferenceProfile {
    /// Create a profile with no amenity wishes and no proximity weights
    pub fn new(
        tenant_category_id: i32,
        budget_tier: u32,
        city: impl Into<String>,
    ) -> Result<Self, MatchError> {
        let city = city.into().trim().to_string();

        if tenant_category_id < 1 {
            return Err(MatchError::InvalidProfile(
                "tenant category id must be positive".to_string(),
            ));
        }
        if budget_tier < 1 {
            return Err(MatchError::InvalidProfile(
                "budget category id must be positive".to_string(),
            ));
        }
        if city.is_empty() {
            return Err(MatchError::InvalidProfile("city is required".to_string()));
        }

        Ok(Self {
            tenant_category_id,
            budget_tier,
            city,
            location_category_id: None,
            amenities: AmenityWishes::default(),
            proximity: ProximityWeights::default(),
        })
    }

    pub fn with_amenities(mut self, amenities: AmenityWishes) -> Self {
        self.amenities = amenities;
        self
    }

    pub fn with_proximity(mut self, proximity: ProximityWeights) -> Self {
        self.proximity = proximity;
        self
    }

    pub fn with_location_category(mut self, location_category_id: Option<i32>) -> Self {
        self.location_category_id = location_category_id;
        self
    }

    pub fn tenant_category_id(&self) -> i32 {
        self.tenant_category_id
    }

    /// 1-based ordinal into the city's price tiers
    pub fn budget_tier(&self) -> u32 {
        self.budget_tier
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn location_category_id(&self) -> Option<i32> {
        self.location_category_id
    }

    pub fn amenities(&self) -> &AmenityWishes {
        &self.amenities
    }

    pub fn proximity(&self) -> &ProximityWeights {
        &self.proximity
    }
}

/// Amenities row of a stored property. `None` columns mean "not present".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyAmenities {
    /// Number of parking spots
    pub parking: Option<i32>,
    pub wheelchair_accessibility: Option<bool>,
    pub gym: Option<bool>,
    pub kids_playarea: Option<bool>,
    pub party_hall: Option<bool>,
    pub backyard: Option<bool>,
    pub deck: Option<bool>,
    pub in_house_laundry: Option<bool>,
    pub visitor_parking: Option<bool>,
    pub pool: Option<bool>,
    pub pet_friendly: Option<bool>,
}

impl PropertyAmenities {
    pub fn has(&self, amenity: Amenity) -> bool {
        let flag = match amenity {
            Amenity::Parking => return self.parking.unwrap_or(0) > 0,
            Amenity::Gym => self.gym,
            Amenity::PetFriendly => self.pet_friendly,
            Amenity::Pool => self.pool,
            Amenity::WheelchairAccessibility => self.wheelchair_accessibility,
            Amenity::InHouseLaundry => self.in_house_laundry,
            Amenity::KidsPlayarea => self.kids_playarea,
            Amenity::PartyHall => self.party_hall,
            Amenity::Backyard => self.backyard,
            Amenity::Deck => self.deck,
            Amenity::VisitorParking => self.visitor_parking,
        };
        flag.unwrap_or(false)
    }
}

/// Location row of a stored property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyLocation {
    pub apt_unit_number: Option<String>,
    pub street_name: Option<String>,
    pub community: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl PropertyLocation {
    /// Parsed (latitude, longitude), if both are present and valid
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let latitude: f64 = self.latitude.as_deref()?.trim().parse().ok()?;
        let longitude: f64 = self.longitude.as_deref()?.trim().parse().ok()?;

        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        valid.then_some((latitude, longitude))
    }
}

/// Read-only projection of a stored property with its amenities and location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyCandidate {
    pub unit_id: i32,
    pub unit_number: Option<i32>,
    pub prop_cat_id: Option<i32>,
    pub prop_name: Option<String>,
    pub prop_type: Option<String>,
    pub no_of_rooms: Option<String>,
    pub area_code: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub rent: f64,
    pub lease_length: Option<String>,
    pub location: Option<PropertyLocation>,
    pub amenities: Option<PropertyAmenities>,
}

impl PropertyCandidate {
    /// Missing amenity data counts as "does not have"
    pub fn has_amenity(&self, amenity: Amenity) -> bool {
        self.amenities
            .as_ref()
            .map_or(false, |amenities| amenities.has(amenity))
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.location.as_ref().and_then(PropertyLocation::coordinates)
    }
}

/// A candidate paired with its raw score and percent closeness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub property: PropertyCandidate,
    pub points: u32,
    pub percent_close: f64,
}

/// A (minimum, maximum) rent interval, min <= max
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub min_rent: f64,
    pub max_rent: f64,
}

impl PriceBand {
    pub fn contains(&self, rent: f64) -> bool {
        rent >= self.min_rent && rent <= self.max_rent
    }
}

/// Named match-quality tier with its members in ranked order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchBucket {
    pub name: String,
    pub min_percent: f64,
    pub properties: Vec<ScoredCandidate>,
}

/// Ordered buckets; serializes as a JSON object keyed by tier name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchBuckets(pub Vec<MatchBucket>);

impl MatchBuckets {
    pub fn get(&self, name: &str) -> Option<&MatchBucket> {
        self.0.iter().find(|bucket| bucket.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchBucket> {
        self.0.iter()
    }

    /// Total number of candidates across all buckets
    pub fn len(&self) -> usize {
        self.0.iter().map(|bucket| bucket.properties.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for MatchBuckets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bucket in &self.0 {
            map.serialize_entry(&bucket.name, &bucket.properties)?;
        }
        map.end()
    }
}

/// Point of interest used for proximity closeness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub kind: ProximityDimension,
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Who a tenant action belongs to
///
/// Signed-in tenants are keyed by user id. Anonymous visitors are keyed by
/// their session id until they sign in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TenantIdentity {
    User(i32),
    Session(String),
}

impl TenantIdentity {
    /// A positive user id wins over a session id; blank sessions are ignored
    pub fn from_parts(user_id: Option<i32>, session_id: Option<&str>) -> Option<Self> {
        match (user_id, session_id.map(str::trim)) {
            (Some(id), _) if id > 0 => Some(TenantIdentity::User(id)),
            (_, Some(session)) if !session.is_empty() => Some(TenantIdentity::Session(session.to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for TenantIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenantIdentity::User(id) => write!(f, "user {}", id),
            TenantIdentity::Session(session) => write!(f, "session {}", session),
        }
    }
}

/// Tenant actions on a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenantActionKind {
    Liked,
    Disliked,
    Viewed,
    Contacted,
}

impl TenantActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantActionKind::Liked => "LIKED",
            TenantActionKind::Disliked => "DISLIKED",
            TenantActionKind::Viewed => "VIEWED",
            TenantActionKind::Contacted => "CONTACTED",
        }
    }
}
