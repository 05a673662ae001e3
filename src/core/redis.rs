use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{cmd, Client, RedisError};
use tokio::sync::RwLock;

use crate::core::cache::{Cache, CacheEntry, CacheError};

const SCAN_BATCH: u64 = 200;

#[derive(Clone)]
pub(crate) struct RedisHandle {
    url: String,
    manager: Arc<RwLock<Option<ConnectionManager>>>,
}

impl RedisHandle {
    pub(crate) fn new(url: String) -> Self {
        Self { url, manager: Arc::new(RwLock::new(None)) }
    }

    pub(crate) async fn connect(&self) -> Result<(), RedisError> {
        let client = Client::open(self.url.clone())?;
        let mut manager = ConnectionManager::new(client).await?;
        cmd("PING").query_async::<_, String>(&mut manager).await?;
        let mut guard = self.manager.write().await;
        *guard = Some(manager);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        let mut guard = self.manager.write().await;
        *guard = None;
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = { self.manager.read().await.clone() };
        manager.ok_or(CacheError::Disconnected)
    }
}

fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl Cache for RedisHandle {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value = cmd("GET").arg(key).query_async::<_, Option<String>>(&mut conn).await?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn set_many_with_ttl(&self, entries: &[CacheEntry<'_>]) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        for entry in entries {
            pipe.cmd("SET")
                .arg(entry.key)
                .arg(entry.value)
                .arg("EX")
                .arg(ttl_seconds(entry.ttl))
                .ignore();
        }
        pipe.query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let count = cmd("EXISTS").arg(key).query_async::<_, i64>(&mut conn).await?;
        Ok(count > 0)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let removed = cmd("DEL").arg(key).query_async::<_, i64>(&mut conn).await?;
        Ok(removed > 0)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async::<_, (u64, Vec<String>)>(&mut conn)
                .await?;

            if !keys.is_empty() {
                let count = cmd("DEL").arg(&keys).query_async::<_, i64>(&mut conn).await?;
                removed += count.max(0) as u64;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }

    async fn incr(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;
        let current = cmd("INCR").arg(key).query_async::<_, i64>(&mut conn).await?;
        Ok(current.max(0) as u64)
    }

    async fn incr_in_window(&self, key: &str, window: Duration) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;

        let script = redis::Script::new(
            r#"
            local current = redis.call("INCR", KEYS[1])
            if current == 1 then
                redis.call("EXPIRE", KEYS[1], ARGV[1])
            end
            return current
        "#,
        );

        let current: i64 =
            script.key(key).arg(ttl_seconds(window)).invoke_async(&mut conn).await?;

        Ok(current.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}
