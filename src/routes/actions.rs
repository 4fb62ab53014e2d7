use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use super::{error_response, AppState};
use crate::models::{
    messages, ContactRequest, LikeDislikeRequest, PropertiesResponse, PropertyCandidate, PropertyDetailsRequest,
    PropertyDetailsResponse, StandardResponse, TenantActionKind, TenantActionsRequest,
};
use crate::services::{with_retry, CacheKey, PostgresError};

/// Configure tenant action and property lookup routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/likeDislikeProperty", web::put().to(like_dislike_property))
        .route("/contactNow", web::post().to(contact_now))
        .route("/likedProperties", web::post().to(liked_properties))
        .route("/dislikedProperties", web::post().to(disliked_properties))
        .route("/contactedProperties", web::post().to(contacted_properties))
        .route("/viewedProperties", web::post().to(viewed_properties))
        .route("/propertyDetails", web::post().to(property_details));
}

fn postgres_error_response(e: &PostgresError) -> HttpResponse {
    match e {
        PostgresError::NotFound(_) => {
            error_response(StatusCode::NOT_FOUND, messages::PROPERTY_NOT_FOUND, e.to_string())
        }
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, messages::GENERAL_ERROR, e.to_string()),
    }
}

// Validation already rejects requests without a user or session
fn missing_identity_response() -> HttpResponse {
    error_response(
        StatusCode::BAD_REQUEST,
        "Validation failed",
        "either user_id or session_id is required",
    )
}

/// Like or dislike a property
///
/// PUT /api/v1/likeDislikeProperty
async fn like_dislike_property(state: web::Data<AppState>, req: web::Json<LikeDislikeRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let kind = if req.is_liked {
        TenantActionKind::Liked
    } else {
        TenantActionKind::Disliked
    };

    let Some(tenant) = req.tenant.identity() else {
        return missing_identity_response();
    };

    match state.postgres.record_action(&tenant, req.unit_id, kind).await {
        Ok(()) => {
            tracing::info!("{} marked property {} as {}", tenant, req.unit_id, kind.as_str());
            HttpResponse::Ok().json(StandardResponse {
                success: true,
                message: messages::ACTION_SAVE_SUCCESS.to_string(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to record {} for property {}: {}", kind.as_str(), req.unit_id, e);
            postgres_error_response(&e)
        }
    }
}

/// Record that a tenant contacted a property owner
///
/// POST /api/v1/contactNow
async fn contact_now(state: web::Data<AppState>, req: web::Json<ContactRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let Some(tenant) = req.tenant.identity() else {
        return missing_identity_response();
    };

    match state
        .postgres
        .record_action(&tenant, req.unit_id, TenantActionKind::Contacted)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(StandardResponse {
            success: true,
            message: messages::CONTACT_SAVE_SUCCESS.to_string(),
        }),
        Err(e) => {
            tracing::error!("Failed to record contact for property {}: {}", req.unit_id, e);
            postgres_error_response(&e)
        }
    }
}

async fn liked_properties(state: web::Data<AppState>, req: web::Json<TenantActionsRequest>) -> impl Responder {
    properties_for(state, req.into_inner(), TenantActionKind::Liked).await
}

async fn disliked_properties(state: web::Data<AppState>, req: web::Json<TenantActionsRequest>) -> impl Responder {
    properties_for(state, req.into_inner(), TenantActionKind::Disliked).await
}

async fn contacted_properties(state: web::Data<AppState>, req: web::Json<TenantActionsRequest>) -> impl Responder {
    properties_for(state, req.into_inner(), TenantActionKind::Contacted).await
}

async fn viewed_properties(state: web::Data<AppState>, req: web::Json<TenantActionsRequest>) -> impl Responder {
    properties_for(state, req.into_inner(), TenantActionKind::Viewed).await
}

/// Properties a tenant acted on; an empty list is still a success
async fn properties_for(state: web::Data<AppState>, req: TenantActionsRequest, kind: TenantActionKind) -> HttpResponse {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let Some(tenant) = req.tenant.identity() else {
        return missing_identity_response();
    };

    let result = with_retry(&state.retry, "tenant action lookup", || {
        state.postgres.properties_by_action(&tenant, kind)
    })
    .await;

    match result {
        Ok(properties) => {
            tracing::debug!("{} {} properties for {}", properties.len(), kind.as_str(), tenant);
            HttpResponse::Ok().json(PropertiesResponse {
                success: true,
                message: messages::PROPERTIES_FETCH_SUCCESS.to_string(),
                properties,
            })
        }
        Err(e) => {
            tracing::error!("Failed to fetch {} properties for {}: {}", kind.as_str(), tenant, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                messages::PROPERTIES_FETCH_FAILURE,
                e.to_string(),
            )
        }
    }
}

/// Full projection of one property
///
/// POST /api/v1/propertyDetails
async fn property_details(state: web::Data<AppState>, req: web::Json<PropertyDetailsRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let property = match cached_property(&state, req.unit_id).await {
        Ok(property) => property,
        Err(e) => {
            tracing::info!("Property {} lookup failed: {}", req.unit_id, e);
            return postgres_error_response(&e);
        }
    };

    // Recording the view never fails the lookup
    if let Some(tenant) = req.tenant.identity() {
        if let Err(e) = state
            .postgres
            .record_action(&tenant, req.unit_id, TenantActionKind::Viewed)
            .await
        {
            tracing::warn!("Failed to record view of {} by {}: {}", req.unit_id, tenant, e);
        }
    }

    HttpResponse::Ok().json(PropertyDetailsResponse {
        success: true,
        message: messages::PROPERTIES_FETCH_SUCCESS.to_string(),
        property,
    })
}

async fn cached_property(state: &AppState, unit_id: i32) -> Result<PropertyCandidate, PostgresError> {
    let key = CacheKey::property(unit_id);

    if let Some(cache) = &state.cache {
        match cache.fetch::<PropertyCandidate>(&key).await {
            Ok(Some(property)) => return Ok(property),
            Ok(None) => {}
            Err(e) => tracing::warn!("Property cache lookup failed for {}: {}", key, e),
        }
    }

    let property = with_retry(&state.retry, "property lookup", || {
        state.postgres.property_by_unit_id(unit_id)
    })
    .await?;

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.store(&key, &property).await {
            tracing::warn!("Failed to cache property {}: {}", key, e);
        }
    }

    Ok(property)
}
