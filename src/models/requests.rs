use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::MatchError;
use crate::models::domain::{AmenityWishes, PreferenceProfile, ProximityWeights, TenantIdentity};

/// Request to rank properties against a tenant's preferences
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TenantMatchingRequest {
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[validate(range(min = 1))]
    pub tenant_category_id: i32,
    #[validate(range(min = 1))]
    pub budget_category_id: u32,
    #[serde(default)]
    pub location_category_id: Option<i32>,
    #[validate(length(min = 1))]
    pub city: String,
    #[serde(flatten)]
    pub amenities: AmenityWishes,
    #[serde(default)]
    pub school_proximity: u32,
    #[serde(default)]
    pub hospital_proximity: u32,
    #[serde(default)]
    pub transit_proximity: u32,
}

impl TenantMatchingRequest {
    /// Build the immutable profile the matcher works on
    pub fn to_profile(&self) -> Result<PreferenceProfile, MatchError> {
        Ok(PreferenceProfile::new(self.tenant_category_id, self.budget_category_id, self.city.as_str())?
            .with_location_category(self.location_category_id)
            .with_amenities(self.amenities)
            .with_proximity(ProximityWeights {
                school: self.school_proximity,
                hospital: self.hospital_proximity,
                transit: self.transit_proximity,
            }))
    }
}

/// Request for the budget tiers of a city
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PriceRangeRequest {
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(range(min = 1))]
    pub tenant_cat_id: i32,
}

/// User or session a tenant action is keyed by, flattened into action requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantRef {
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl TenantRef {
    pub fn identity(&self) -> Option<TenantIdentity> {
        TenantIdentity::from_parts(self.user_id, self.session_id.as_deref())
    }
}

fn require_identity(tenant: &TenantRef) -> Result<(), ValidationError> {
    match tenant.identity() {
        Some(_) => Ok(()),
        None => {
            let mut error = ValidationError::new("tenant_identity");
            error.message = Some("either user_id or session_id is required".into());
            Err(error)
        }
    }
}

/// Request to like or dislike a property
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LikeDislikeRequest {
    #[serde(flatten)]
    #[validate(custom(function = "require_identity"))]
    pub tenant: TenantRef,
    #[validate(range(min = 1))]
    pub unit_id: i32,
    pub is_liked: bool,
}

/// Request to contact the owner of a property
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactRequest {
    #[serde(flatten)]
    #[validate(custom(function = "require_identity"))]
    pub tenant: TenantRef,
    #[validate(range(min = 1))]
    pub unit_id: i32,
}

/// Request for the properties a tenant acted on
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TenantActionsRequest {
    #[serde(flatten)]
    #[validate(custom(function = "require_identity"))]
    pub tenant: TenantRef,
}

/// Request for one property's details
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PropertyDetailsRequest {
    #[validate(range(min = 1))]
    pub unit_id: i32,
    /// When it names a tenant, the view is recorded for them
    #[serde(flatten)]
    pub tenant: TenantRef,
}
