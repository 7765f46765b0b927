pub mod resource_ctx;
pub mod sessions;

pub use resource_ctx::CurrentResource;
pub use sessions::Sessions;
