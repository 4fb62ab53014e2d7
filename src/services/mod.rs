// Service exports
pub mod cache;
pub mod postgres;
pub mod retry;

pub use cache::{CacheError, CacheKey, TieredCache};
pub use postgres::{PoolOptions, PostgresClient, PostgresError};
pub use retry::{with_retry, RetryPolicy, Transient};
