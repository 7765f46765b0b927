use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tower_sessions::{
    SessionStore,
    session::{Id, Record},
    session_store,
};

/// The configured session store, selected at startup.
///
/// Lets the session layer and `AppState` have one concrete type whatever
/// backend `SESSION_STORE_URL` picks.
#[derive(Clone)]
pub struct SessionBackend {
    name: &'static str,
    store: Arc<dyn SessionStore>,
}

impl SessionBackend {
    pub fn new(name: &'static str, store: impl SessionStore) -> Self {
        Self {
            name,
            store: Arc::new(store),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for SessionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBackend")
            .field("name", &self.name)
            .field("store", &self.store)
            .finish()
    }
}

#[async_trait]
impl SessionStore for SessionBackend {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.store.create(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.store.save(record).await
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        self.store.load(id).await
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.store.delete(id).await
    }
}
