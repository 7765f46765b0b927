use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use time::OffsetDateTime;
use tower_sessions::{
    SessionStore,
    session::{Id, Record},
    session_store,
};

use crate::services::cache::{CacheClient, CacheError, ValkeyClient};

/// Valkey-backed session store (Redis protocol).
///
/// Each record is one JSON value at `<prefix>:<id>` whose key TTL follows
/// the record's expiry date. The session layer saves on every request, so
/// the TTL is an idle timeout. Saves use `SET XX`: a record deleted by a
/// concurrent logout is never written back.
#[derive(Clone)]
pub struct ValkeySessionStore<C: CacheClient> {
    cache: Arc<C>,
    prefix: String,
}

impl<C: CacheClient> fmt::Debug for ValkeySessionStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValkeySessionStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl ValkeySessionStore<ValkeyClient> {
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = ValkeyClient::new(redis_url).await?;

        Ok(Self::new_with_cache(Arc::new(client), "session"))
    }
}

impl<C: CacheClient> ValkeySessionStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, id: &Id) -> String {
        format!("{}:{}", self.prefix, id)
    }
}

fn backend(err: CacheError) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

fn encode(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(record).map_err(|e| session_store::Error::Encode(e.to_string()))
}

// Remaining lifetime of the record; the cache clamps it to at least 1 sec.
fn ttl(record: &Record) -> Duration {
    let seconds = (record.expiry_date - OffsetDateTime::now_utc()).whole_seconds();
    Duration::from_secs(u64::try_from(seconds).unwrap_or(0))
}

#[async_trait]
impl<C: CacheClient> SessionStore for ValkeySessionStore<C> {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        loop {
            let created = self
                .cache
                .set_if_absent_with_ttl(&self.key(&record.id), &encode(record)?, ttl(record))
                .await
                .map_err(backend)?;
            if created {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let replaced = self
            .cache
            .replace_with_ttl(&self.key(&record.id), &encode(record)?, ttl(record))
            .await
            .map_err(backend)?;

        if !replaced {
            tracing::debug!("session record is gone; not written back");
        }
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let Some(raw) = self.cache.get_string(&self.key(id)).await.map_err(backend)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| session_store::Error::Decode(e.to_string()))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.cache.del(&self.key(id)).await.map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use axum::{
        Router,
        body::Body,
        extract::Request,
        http::{StatusCode, header},
        routing::get,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::middleware::session::{self, SessionCookie};
    use crate::services::cache::CacheResult;
    use crate::services::session::testing::record;

    // Command-level stand-in for Valkey. TTLs are journaled, not enforced.
    #[derive(Clone, Default)]
    struct FakeCache {
        entries: Arc<Mutex<HashMap<String, String>>>,
        ttl_writes: Arc<Mutex<Vec<String>>>,
    }

    impl FakeCache {
        fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn ttl_writes(&self) -> Vec<String> {
            self.ttl_writes.lock().unwrap().clone()
        }

        fn journal(&self, command: &str, key: &str) {
            self.ttl_writes
                .lock()
                .unwrap()
                .push(format!("{command} {key}"));
        }
    }

    #[async_trait]
    impl CacheClient for FakeCache {
        async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
            Ok(self.raw(key))
        }

        async fn replace_with_ttl(
            &self,
            key: &str,
            value: &str,
            _ttl: Duration,
        ) -> CacheResult<bool> {
            self.journal("replace", key);
            let mut entries = self.entries.lock().unwrap();
            match entries.get_mut(key) {
                Some(slot) => {
                    *slot = value.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn set_if_absent_with_ttl(
            &self,
            key: &str,
            value: &str,
            _ttl: Duration,
        ) -> CacheResult<bool> {
            self.journal("create", key);
            let mut entries = self.entries.lock().unwrap();
            if entries.contains_key(key) {
                return Ok(false);
            }
            entries.insert(key.to_string(), value.to_string());
            Ok(true)
        }

        async fn del(&self, key: &str) -> CacheResult<u64> {
            Ok(self.entries.lock().unwrap().remove(key).map_or(0, |_| 1))
        }
    }

    // Every command fails, as with a lost connection.
    #[derive(Clone)]
    struct DownCache;

    #[async_trait]
    impl CacheClient for DownCache {
        async fn get_string(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::BackendConnection("connection refused".into()))
        }

        async fn replace_with_ttl(&self, _: &str, _: &str, _: Duration) -> CacheResult<bool> {
            Err(CacheError::BackendConnection("connection refused".into()))
        }

        async fn set_if_absent_with_ttl(&self, _: &str, _: &str, _: Duration) -> CacheResult<bool> {
            Err(CacheError::BackendConnection("connection refused".into()))
        }

        async fn del(&self, _key: &str) -> CacheResult<u64> {
            Err(CacheError::BackendConnection("connection refused".into()))
        }
    }

    fn store(cache: &FakeCache) -> ValkeySessionStore<FakeCache> {
        ValkeySessionStore::new_with_cache(Arc::new(cache.clone()), "session")
    }

    #[tokio::test]
    async fn records_round_trip_under_the_prefixed_key() {
        let cache = FakeCache::default();
        let store = store(&cache);
        let mut created = record(json!({"auth.id": 42}), time::Duration::minutes(5));
        store.create(&mut created).await.unwrap();

        assert!(cache.raw(&format!("session:{}", created.id)).is_some());
        let loaded = store.load(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.data.get("auth.id"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn create_picks_a_fresh_id_on_collision() {
        let cache = FakeCache::default();
        let store = store(&cache);
        let mut first = record(json!({}), time::Duration::minutes(5));
        store.create(&mut first).await.unwrap();

        let mut second = record(json!({}), time::Duration::minutes(5));
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(store.load(&second.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn save_after_delete_does_not_resurrect() {
        let cache = FakeCache::default();
        let store = store(&cache);
        let mut live = record(json!({"auth.id": 42}), time::Duration::minutes(5));
        store.create(&mut live).await.unwrap();

        store.delete(&live.id).await.unwrap();
        store.save(&live).await.unwrap();

        assert!(store.load(&live.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn backend_failures_surface_as_backend_errors() {
        let store = ValkeySessionStore::new_with_cache(Arc::new(DownCache), "session");

        assert!(matches!(
            store.load(&Id::default()).await,
            Err(session_store::Error::Backend(_))
        ));
    }

    async fn read_only(session: tower_sessions::Session) -> StatusCode {
        match session.get_value("auth.id").await {
            Ok(_) => StatusCode::OK,
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tokio::test]
    async fn every_read_extends_the_idle_timeout() {
        let cache = FakeCache::default();
        let store = store(&cache);
        let mut live = record(json!({"auth.id": 42}), time::Duration::minutes(5));
        store.create(&mut live).await.unwrap();

        let cookie = SessionCookie::new("SESSION", false, Duration::from_secs(60));
        let app = Router::new()
            .route("/read", get(read_only))
            .layer(session::layer(store, &cookie));

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/read")
                        .header(header::COOKIE, format!("SESSION={}", live.id))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let key = format!("session:{}", live.id);
        assert_eq!(
            cache.ttl_writes(),
            [
                format!("create {key}"),
                format!("replace {key}"),
                format!("replace {key}"),
                format!("replace {key}"),
            ]
        );
    }
}
