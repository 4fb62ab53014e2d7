// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Amenity, AmenityWishes, MatchBucket, MatchBuckets, PointOfInterest, PreferenceProfile, PriceBand,
    PropertyAmenities, PropertyCandidate, PropertyLocation, ProximityDimension, ProximityWeights,
    ScoredCandidate, TenantActionKind, TenantIdentity,
};
pub use requests::{
    ContactRequest, LikeDislikeRequest, PriceRangeRequest, PropertyDetailsRequest, TenantActionsRequest,
    TenantMatchingRequest, TenantRef,
};
pub use responses::{
    messages, ErrorResponse, HealthResponse, PriceRangeResponse, PropertiesResponse, PropertyDetailsResponse,
    StandardResponse, TenantMatchingResponse,
};
