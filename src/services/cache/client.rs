//! Cache client interface used by higher-level services (session storage).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (connection / command).
///
/// Note:
/// - Kept independent from `AppError` so callers decide how to fail
///   (the session filter treats a failing backend as "no identity").
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// A minimal, string-based cache interface.
///
/// Session records only need whole-value reads, `SET XX` writes with a TTL,
/// `SET NX` for collision-free creation and `DEL` for logout.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Replace the value of an existing key, resetting its TTL.
    //
    // Returns:
    // - `Ok(true)`  if the key existed and was replaced
    // - `Ok(false)` if the key does not exist (nothing written)
    async fn replace_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool>;

    // Set value if the key does not exist, with TTL.
    //
    // Returns:
    // - `Ok(true)`  if the key was set (not seen before)
    // - `Ok(false)` if the key already exists
    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<bool>;

    // Delete a key. Returns number of deleted keys.
    async fn del(&self, key: &str) -> CacheResult<u64>;
}
