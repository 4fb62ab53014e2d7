use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trace_rent::config::{LoggingSettings, Settings};
use trace_rent::core::{Matcher, PreferenceScorer};
use trace_rent::routes::{self, AppState};
use trace_rent::services::{with_retry, PostgresClient, TieredCache};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

/// Install the global subscriber
///
/// `LOG_LEVEL` and `LOG_FORMAT` override the `[logging]` settings; `RUST_LOG`
/// wins over both when set.
fn init_logging(settings: &LoggingSettings) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(&LoggingSettings::default());
            return Err(startup_error("Failed to load configuration", e));
        }
    };

    init_logging(&settings.logging);

    info!("Starting TraceRent matching service...");

    // Scoring, bucketing and tiers are validated before any connection is opened
    let policy = settings
        .scoring
        .policy()
        .map_err(|e| startup_error("Invalid scoring configuration", e))?;
    let thresholds = settings
        .buckets
        .thresholds()
        .map_err(|e| startup_error("Invalid bucket configuration", e))?;
    let resolver = settings
        .matching
        .resolver()
        .map_err(|e| startup_error("Invalid matching configuration", e))?;
    let oracle = settings.scoring.proximity.oracle();

    info!(
        "Proximity oracle loaded with {} points of interest (radius {} km)",
        oracle.points().len(),
        settings.scoring.proximity.radius_km
    );

    let matcher = Matcher::new(PreferenceScorer::new(policy, Arc::new(oracle)), thresholds);
    let retry = settings.matching.retry_policy();

    info!(
        "Matcher initialized: {} budget tiers, buckets {:?}",
        resolver.tier_count(),
        matcher.thresholds().tiers().iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
    );

    // Initialize PostgreSQL client
    let pool_options = settings.database.pool_options();
    let postgres = with_retry(&retry, "PostgreSQL connect", || {
        PostgresClient::new(&settings.database.url, pool_options)
    })
    .await
    .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

    info!("PostgreSQL client initialized (max: {} connections)", pool_options.max_connections);

    // The cache is optional; without redis every lookup goes to postgres
    let cache_ttl = Duration::from_secs(settings.cache.ttl_secs.unwrap_or(300));
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match TieredCache::connect(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!("Cache initialized (local: {} entries, TTL: {:?})", l1_cache_size, cache_ttl);
            Some(c)
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), running without cache", e);
            None
        }
    };

    // Build application state
    let app_state = AppState {
        postgres: Arc::new(postgres),
        cache,
        matcher,
        resolver,
        retry,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
