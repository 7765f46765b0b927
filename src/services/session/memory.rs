//! Process-local session store.
//!
//! Records carry their own expiry date (set by the session layer on every
//! save). Expired records are invisible to `load` and removed by
//! `delete_expired`, which `spawn_expiry_sweep` runs periodically.
use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::{sync::Mutex, task::JoinHandle};
use tower_sessions::{
    SessionStore,
    session::{Id, Record},
    session_store::{self, ExpiredDeletion},
};

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    records: Arc<Mutex<HashMap<Id, Record>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_active(record: &Record) -> bool {
    record.expiry_date > OffsetDateTime::now_utc()
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    // Only existing records are replaced: a record deleted by a concurrent
    // logout stays deleted.
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        if let Some(slot) = self.records.lock().await.get_mut(&record.id) {
            *slot = record.clone();
        }
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .records
            .lock()
            .await
            .get(id)
            .filter(|record| is_active(record))
            .cloned())
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.records.lock().await.remove(id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for MemorySessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        self.records.lock().await.retain(|_, record| is_active(record));
        Ok(())
    }
}

/// Runs `delete_expired` every `period` for as long as the runtime lives.
pub fn spawn_expiry_sweep<S>(store: S, period: Duration) -> JoinHandle<()>
where
    S: ExpiredDeletion + Clone,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(err) = store.delete_expired().await {
                tracing::warn!(error = %err, "expired session sweep failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::services::session::testing::record;

    #[tokio::test]
    async fn expired_records_are_invisible_and_swept() {
        let store = MemorySessionStore::new();

        for _ in 0..1000 {
            let mut expired = record(json!({}), time::Duration::seconds(-1));
            store.create(&mut expired).await.unwrap();
        }
        let mut live = record(json!({"auth.id": 42}), time::Duration::minutes(5));
        store.create(&mut live).await.unwrap();
        assert_eq!(store.records.lock().await.len(), 1001);

        store.delete_expired().await.unwrap();

        assert_eq!(store.records.lock().await.len(), 1);
        assert!(store.load(&live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_records_do_not_load() {
        let store = MemorySessionStore::new();
        let mut expired = record(json!({"auth.id": 42}), time::Duration::seconds(-1));
        store.create(&mut expired).await.unwrap();

        assert!(store.load(&expired.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_does_not_resurrect_a_deleted_record() {
        let store = MemorySessionStore::new();
        let mut live = record(json!({"auth.id": 42}), time::Duration::minutes(5));
        store.create(&mut live).await.unwrap();

        store.delete(&live.id).await.unwrap();
        store.save(&live).await.unwrap();

        assert!(store.load(&live.id).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_task_runs_periodically() {
        let store = MemorySessionStore::new();
        let mut expired = record(json!({}), time::Duration::seconds(-1));
        store.create(&mut expired).await.unwrap();

        let sweep = spawn_expiry_sweep(store.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(store.records.lock().await.is_empty());
        sweep.abort();
    }
}
