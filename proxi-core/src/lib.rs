pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod schema;
pub mod service;
pub mod store;
pub mod types;

pub use config::{Config, ConfigError};
pub use context::ProxiContext;
pub use db::DbPool;
pub use error::{StoreError, StoreResult};
pub use service::{Operations, SharedOperations, StoreOperations};
pub use store::{NotificationStore, PgStore, PositionStore, UserStore};
pub use types::{Notification, ProPosition, User};
