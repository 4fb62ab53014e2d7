use serde::{Deserialize, Serialize};

use crate::core::MatchReport;
use crate::models::domain::{PriceBand, PropertyCandidate};

/// User-facing messages shared by the handlers
pub mod messages {
    pub const GENERAL_ERROR: &str = "An error occurred. Please try again.";
    pub const NO_PROPERTIES_FOUND: &str = "No properties found";
    pub const MATCHING_SUCCESS: &str = "Properties matched successfully.";
    pub const PROPERTIES_FETCH_SUCCESS: &str = "Properties fetched successfully.";
    pub const PROPERTIES_FETCH_FAILURE: &str = "No properties fetched";
    pub const PROPERTY_NOT_FOUND: &str = "Property not found";
    pub const PRICE_RANGE_FETCH_SUCCESS: &str = "Price range fetched successfully";
    pub const PRICE_RANGE_FETCH_FAILURE: &str = "Unable to fetch price range";
    pub const ACTION_SAVE_SUCCESS: &str = "Action saved successfully.";
    pub const CONTACT_SAVE_SUCCESS: &str = "Contact request recorded.";
}

/// Response for the tenant matching endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TenantMatchingResponse {
    pub success: bool,
    pub message: String,
    pub request_id: String,
    #[serde(flatten)]
    pub report: MatchReport,
}

/// Response for the price range endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRangeResponse {
    pub success: bool,
    pub message: String,
    pub city: String,
    pub price_range: Vec<PriceBand>,
}

/// Response carrying a list of properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertiesResponse {
    pub success: bool,
    pub message: String,
    pub properties: Vec<PropertyCandidate>,
}

/// Response carrying one property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDetailsResponse {
    pub success: bool,
    pub message: String,
    pub property: PropertyCandidate,
}

/// Plain success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardResponse {
    pub success: bool,
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
