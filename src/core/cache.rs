use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub(crate) const ACCESS_TOKEN_PREFIX: &str = "access_token:";
pub(crate) const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";
pub(crate) const ROLE_PREFIX: &str = "user:role:";
pub(crate) const RATE_LIMIT_PREFIX: &str = "rate_limit:";
pub(crate) const RESPONSE_CACHE_PREFIX: &str = "cache:";

/// Marker stored under whitelisted access tokens.
pub(crate) const WHITELIST_MARKER: &str = "valid";

#[derive(Debug, Error)]
pub(crate) enum CacheError {
    #[error("cache is not connected")]
    Disconnected,
    #[error("cache command failed: {0}")]
    Command(#[from] redis::RedisError),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CacheEntry<'a> {
    pub(crate) key: &'a str,
    pub(crate) value: &'a str,
    pub(crate) ttl: Duration,
}

/// Key-value store with per-key expiry. Production uses Redis; tests use an
/// in-memory map.
#[async_trait]
pub(crate) trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Writes every entry or none of them.
    async fn set_many_with_ttl(&self, entries: &[CacheEntry<'_>]) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Returns whether a key was actually removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

    /// Increments a counter that never expires.
    async fn incr(&self, key: &str) -> Result<u64, CacheError>;

    /// Increments a counter, starting its expiry window on the first hit.
    async fn incr_in_window(&self, key: &str, window: Duration) -> Result<u64, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

pub(crate) fn access_token_key(token: &str) -> String {
    format!("{ACCESS_TOKEN_PREFIX}{token}")
}

pub(crate) fn refresh_token_key(email: &str) -> String {
    format!("{REFRESH_TOKEN_PREFIX}{email}")
}

pub(crate) fn role_key(email: &str) -> String {
    format!("{ROLE_PREFIX}{email}")
}

pub(crate) fn rate_limit_key(ip: &str) -> String {
    format!("{RATE_LIMIT_PREFIX}{ip}")
}

pub(crate) fn results_cache_prefix(test_id: i64) -> String {
    format!("{RESPONSE_CACHE_PREFIX}results:{test_id}:")
}

/// Generation counter for a test's results pages. Lives outside
/// `results_cache_prefix` so prefix deletes never reset it.
pub(crate) fn results_version_key(test_id: i64) -> String {
    format!("{RESPONSE_CACHE_PREFIX}results_version:{test_id}")
}

pub(crate) fn results_cache_key(test_id: i64, version: u64, page: i64, limit: i64) -> String {
    format!("{}{version}:{page}:{limit}", results_cache_prefix(test_id))
}

/// Reads the current results generation; a missing or garbled counter is 0.
pub(crate) async fn results_version(
    cache: &dyn Cache,
    test_id: i64,
) -> Result<u64, CacheError> {
    let raw = cache.get(&results_version_key(test_id)).await?;
    Ok(raw.and_then(|value| value.parse().ok()).unwrap_or(0))
}

/// Moves a test's results to a new generation, then drops the old pages.
/// Pages written later under an older generation are never read again.
pub(crate) async fn invalidate_results(
    cache: &dyn Cache,
    test_id: i64,
) -> Result<(), CacheError> {
    cache.incr(&results_version_key(test_id)).await?;
    cache.delete_prefix(&results_cache_prefix(test_id)).await?;
    Ok(())
}
