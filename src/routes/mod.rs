// Route exports
pub mod actions;
pub mod matching;

use actix_web::{http::StatusCode, web, HttpResponse};
use std::sync::Arc;

use crate::core::{Matcher, PriceBandResolver};
use crate::models::{ErrorResponse, PriceBand};
use crate::services::{with_retry, CacheKey, PostgresClient, PostgresError, RetryPolicy, TieredCache};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    /// Runs without a cache when redis is unavailable
    pub cache: Option<TieredCache>,
    pub matcher: Matcher,
    pub resolver: PriceBandResolver,
    pub retry: RetryPolicy,
}

impl AppState {
    /// Observed rent span of a city, from cache when possible
    pub async fn city_rent_span(
        &self,
        city: &str,
        tenant_category_id: i32,
    ) -> Result<Option<PriceBand>, PostgresError> {
        let key = CacheKey::rent_span(city, tenant_category_id);

        if let Some(cache) = &self.cache {
            match cache.fetch::<PriceBand>(&key).await {
                Ok(Some(span)) => return Ok(Some(span)),
                Ok(None) => {}
                Err(e) => tracing::warn!("Rent span cache lookup failed for {}: {}", key, e),
            }
        }

        let span = with_retry(&self.retry, "rent span lookup", move || {
            self.postgres.city_rent_span(city, tenant_category_id)
        })
        .await?;

        // Only spans are cached; a city without listings is re-queried
        if let (Some(cache), Some(span)) = (&self.cache, span) {
            if let Err(e) = cache.store(&key, &span).await {
                tracing::warn!("Failed to cache rent span {}: {}", key, e);
            }
        }

        Ok(span)
    }
}

/// Build an error payload with the given status
pub(crate) fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matching::configure)
            .configure(actions::configure),
    );
}
