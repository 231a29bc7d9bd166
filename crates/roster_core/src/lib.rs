//! Core persistence for roster user records.
//!
//! Callers depend on [`UserRepository`] (or the validating [`UserService`] /
//! async [`AsyncUserService`] wrappers); the SQLite table behind
//! [`SqliteUserStore`] is never accessed directly.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, RosterConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::{parse_age, User, UserId, UserValidationError, NEW_USER_ID};
pub use repo::user_repo::UserRepository;
pub use service::async_service::AsyncUserService;
pub use service::user_service::{ServiceError, ServiceResult, UserService};
pub use store::user_store::{SqliteUserStore, StoreError, StoreResult, UserStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
