use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::core::buckets::{default_tiers, BucketConfigError, BucketThresholds, BucketTier};
use crate::core::policy::{PolicyError, ScoringPolicy};
use crate::core::price_band::{PriceBandResolver, DEFAULT_TIER_COUNT};
use crate::core::proximity::{PoiProximity, DEFAULT_PROXIMITY_RADIUS_KM};
use crate::models::PointOfInterest;
use crate::services::{PoolOptions, RetryPolicy};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub buckets: BucketSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

impl DatabaseSettings {
    pub fn pool_options(&self) -> PoolOptions {
        let defaults = PoolOptions::default();
        PoolOptions {
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
            min_connections: self.min_connections.unwrap_or(defaults.min_connections),
            acquire_timeout: self
                .acquire_timeout_secs
                .map_or(defaults.acquire_timeout, Duration::from_secs),
            idle_timeout: self
                .idle_timeout_secs
                .map_or(defaults.idle_timeout, Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_tier_count")]
    pub tier_count: usize,
    pub retry_attempts: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            tier_count: default_tier_count(),
            retry_attempts: None,
            retry_backoff_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingConfigError {
    #[error("matching.tier_count must be at least 1")]
    NoTiers,
}

impl MatchingSettings {
    /// Budget tier resolver; a city cannot be split into zero tiers
    pub fn resolver(&self) -> Result<PriceBandResolver, MatchingConfigError> {
        if self.tier_count == 0 {
            return Err(MatchingConfigError::NoTiers);
        }
        Ok(PriceBandResolver::new(self.tier_count))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.retry_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff: self
                .retry_backoff_ms
                .map_or(defaults.initial_backoff, Duration::from_millis),
        }
    }
}

fn default_tier_count() -> usize { DEFAULT_TIER_COUNT }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    /// Points per amenity name; unlisted amenities use the default
    #[serde(default)]
    pub amenity_points: HashMap<String, u32>,
    #[serde(default)]
    pub proximity: ProximitySettings,
}

impl ScoringSettings {
    pub fn policy(&self) -> Result<ScoringPolicy, PolicyError> {
        ScoringPolicy::from_names(&self.amenity_points, &self.proximity.max_closeness)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProximitySettings {
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default)]
    pub max_closeness: HashMap<String, u32>,
    #[serde(default)]
    pub points_of_interest: Vec<PointOfInterest>,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            max_closeness: HashMap::new(),
            points_of_interest: Vec::new(),
        }
    }
}

impl ProximitySettings {
    pub fn oracle(&self) -> PoiProximity {
        PoiProximity::new(self.points_of_interest.clone(), self.radius_km)
    }
}

fn default_radius_km() -> f64 { DEFAULT_PROXIMITY_RADIUS_KM }

#[derive(Debug, Clone, Deserialize)]
pub struct BucketSettings {
    #[serde(default = "default_tiers")]
    pub tiers: Vec<BucketTier>,
}

impl Default for BucketSettings {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
        }
    }
}

impl BucketSettings {
    pub fn thresholds(&self) -> Result<BucketThresholds, BucketConfigError> {
        BucketThresholds::new(self.tiers.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TRACE_RENT)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TRACE_RENT__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("TRACE_RENT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional, unprefixed connection variables
///
/// `DATABASE_URL` and `REDIS_URL` win over the file values when set.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }

    builder.build()
}
