/// Factory: build the session store selected by `Config`.
use std::time::Duration;

use crate::config::Config;
use crate::services::cache::CacheError;
use crate::services::session::{
    MemorySessionStore, SessionBackend, ValkeySessionStore, spawn_expiry_sweep,
};

// Upper bound between two sweeps of the in-memory store.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

pub async fn build_session_store(config: &Config) -> Result<SessionBackend, CacheError> {
    let backend = match config.session_store_url.as_deref() {
        Some(url) => SessionBackend::new("valkey", ValkeySessionStore::new(url).await?),
        None => {
            let store = MemorySessionStore::new();
            spawn_expiry_sweep(store.clone(), config.session_ttl.min(MAX_SWEEP_PERIOD));
            SessionBackend::new("memory", store)
        }
    };

    tracing::info!(session_backend = backend.name(), "session store ready");
    Ok(backend)
}
