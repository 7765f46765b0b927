pub mod backend;
pub mod factory;
pub mod handle;
pub mod memory;
pub mod valkey;

pub use backend::SessionBackend;
pub use factory::build_session_store;
pub use handle::{RequestSessions, SessionError, SessionResult};
pub use memory::{MemorySessionStore, spawn_expiry_sweep};
pub use valkey::ValkeySessionStore;
