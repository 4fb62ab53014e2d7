use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use tracing::Instrument;
use validator::Validate;

use super::{error_response, AppState};
use crate::core::{MatchError, MatchOutcome};
use crate::models::{
    messages, HealthResponse, PriceRangeRequest, PriceRangeResponse, TenantMatchingRequest, TenantMatchingResponse,
};
use crate::services::with_retry;

/// Configure health, matching and price range routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/tenantMatching", web::post().to(tenant_matching))
        .route("/priceRange", web::post().to(price_range));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// HTTP status for a pipeline failure
pub(crate) fn match_error_status(error: &MatchError) -> StatusCode {
    if error.is_client_error() {
        return StatusCode::BAD_REQUEST;
    }

    match error {
        MatchError::NoPriceDataForCity(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn match_error_response(error: &MatchError) -> HttpResponse {
    let kind = match error {
        MatchError::InvalidTier { .. } => "invalid_tier",
        MatchError::NoPriceDataForCity(_) => "no_price_data",
        MatchError::MalformedPriceBands(_) => "malformed_price_data",
        MatchError::InvalidProfile(_) => "invalid_profile",
    };
    error_response(match_error_status(error), kind, error.to_string())
}

/// Tenant matching endpoint
///
/// POST /api/v1/tenantMatching
///
/// Request body:
/// ```json
/// {
///   "user_id": 12,
///   "tenant_category_id": 1,
///   "budget_category_id": 3,
///   "city": "Waterloo",
///   "gym": true,
///   "pet_friendly": true,
///   "school_proximity": 5,
///   "hospital_proximity": 0,
///   "transit_proximity": 2
/// }
/// ```
async fn tenant_matching(state: web::Data<AppState>, req: web::Json<TenantMatchingRequest>) -> impl Responder {
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("tenant_matching", request_id = %request_id, city = %req.city);

    run_tenant_matching(state, req.into_inner(), request_id)
        .instrument(span)
        .await
}

async fn run_tenant_matching(
    state: web::Data<AppState>,
    req: TenantMatchingRequest,
    request_id: String,
) -> HttpResponse {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for tenant matching request: field_errors={:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let profile = match req.to_profile() {
        Ok(profile) => profile,
        Err(e) => return match_error_response(&e),
    };

    tracing::info!(
        "Matching for tenant category {}, budget tier {}, user {:?}, session {:?}",
        profile.tenant_category_id(),
        profile.budget_tier(),
        req.user_id,
        req.session_id
    );

    let span = match state
        .city_rent_span(profile.city(), profile.tenant_category_id())
        .await
    {
        Ok(span) => span,
        Err(e) => {
            tracing::error!("Failed to fetch rent span for {}: {}", profile.city(), e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch price range", e.to_string());
        }
    };

    // A bad tier or unknown city stops here, before any candidate fetch
    let band = match state.resolver.resolve(profile.city(), span, profile.budget_tier()) {
        Ok(band) => band,
        Err(e) => {
            tracing::info!("Price band resolution failed: {}", e);
            return match_error_response(&e);
        }
    };

    let candidates = match with_retry(&state.retry, "candidate fetch", || {
        state.postgres.candidates_in_band(&profile, band)
    })
    .await
    {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to fetch candidates for {}: {}", profile.city(), e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch properties", e.to_string());
        }
    };

    match state.matcher.find_matches(&profile, band, candidates) {
        MatchOutcome::NoProperties => {
            tracing::info!("No properties in band {:.2}..{:.2}", band.min_rent, band.max_rent);
            HttpResponse::NotFound().json(serde_json::json!({ "error": messages::NO_PROPERTIES_FOUND }))
        }
        MatchOutcome::Matched(report) => {
            tracing::info!(
                "Returning {} properties in {} buckets",
                report.total_properties,
                report.buckets.iter().count()
            );
            HttpResponse::Ok().json(TenantMatchingResponse {
                success: true,
                message: messages::MATCHING_SUCCESS.to_string(),
                request_id,
                report,
            })
        }
    }
}

/// Price range endpoint
///
/// POST /api/v1/priceRange
///
/// Returns the budget tiers of a city for a tenant category.
async fn price_range(state: web::Data<AppState>, req: web::Json<PriceRangeRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let span = match state.city_rent_span(&req.city, req.tenant_cat_id).await {
        Ok(span) => span,
        Err(e) => {
            tracing::error!("Failed to fetch rent span for {}: {}", req.city, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, messages::GENERAL_ERROR, e.to_string());
        }
    };

    match state.resolver.tiers(&req.city, span) {
        Ok(table) => {
            tracing::info!("Price range fetched for {} ({} tiers)", req.city, table.len());
            HttpResponse::Ok().json(PriceRangeResponse {
                success: true,
                message: messages::PRICE_RANGE_FETCH_SUCCESS.to_string(),
                city: table.city().to_string(),
                price_range: table.bands().to_vec(),
            })
        }
        Err(MatchError::NoPriceDataForCity(city)) => {
            tracing::warn!("No price range found for city: {}", city);
            HttpResponse::Ok().json(PriceRangeResponse {
                success: false,
                message: messages::PRICE_RANGE_FETCH_FAILURE.to_string(),
                city,
                price_range: Vec::new(),
            })
        }
        Err(e) => match_error_response(&e),
    }
}
