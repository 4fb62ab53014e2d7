use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Two-tier JSON cache
///
/// A per-process moka cache sits in front of redis. Entries expire from both
/// tiers after the same TTL, so a value is never served longer than that from
/// either tier.
#[derive(Clone)]
pub struct TieredCache {
    local: moka::future::Cache<String, Arc<str>>,
    redis: ConnectionManager,
    ttl: Duration,
}

impl TieredCache {
    pub async fn connect(redis_url: &str, local_capacity: u64, ttl: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let local = moka::future::Cache::builder()
            .max_capacity(local_capacity)
            .time_to_live(ttl)
            .build();

        Ok(Self { local, redis, ttl })
    }

    /// Cached value for `key`, or `None` on a miss in both tiers
    pub async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        if let Some(json) = self.local.get(key).await {
            tracing::trace!("Local cache hit: {}", key);
            return Ok(Some(serde_json::from_str(&json)?));
        }

        let mut redis = self.redis.clone();
        let stored: Option<String> = redis.get(key).await?;

        let Some(json) = stored else {
            tracing::trace!("Cache miss: {}", key);
            return Ok(None);
        };

        tracing::trace!("Redis cache hit: {}", key);
        let value = serde_json::from_str(&json)?;
        self.local.insert(key.to_string(), Arc::from(json)).await;

        Ok(Some(value))
    }

    /// Write `value` to both tiers
    pub async fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;

        let mut redis = self.redis.clone();
        redis
            .set_ex::<_, _, ()>(key, json.as_str(), self.ttl.as_secs().max(1))
            .await?;

        self.local.insert(key.to_string(), Arc::from(json)).await;
        tracing::trace!("Cached {}", key);

        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Rent span of a city for one tenant category; city names are case-insensitive
    pub fn rent_span(city: &str, tenant_category_id: i32) -> String {
        format!("rent_span:{}:{}", city.trim().to_lowercase(), tenant_category_id)
    }

    pub fn property(unit_id: i32) -> String {
        format!("property:{}", unit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceBand;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_store_then_fetch() {
        let cache = TieredCache::connect("redis://127.0.0.1:6379", 100, Duration::from_secs(60))
            .await
            .expect("Failed to connect to Redis");

        let key = CacheKey::rent_span("Waterloo", 1);
        let span = PriceBand {
            min_rent: 1100.0,
            max_rent: 2600.0,
        };

        cache.store(&key, &span).await.unwrap();
        assert_eq!(cache.fetch::<PriceBand>(&key).await.unwrap(), Some(span));

        let missing = cache
            .fetch::<PriceBand>(&CacheKey::rent_span("Atlantis", 1))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::rent_span(" Waterloo ", 2), "rent_span:waterloo:2");
        assert_eq!(CacheKey::rent_span("WATERLOO", 2), CacheKey::rent_span("waterloo", 2));
        assert_eq!(CacheKey::property(42), "property:42");
    }
}
