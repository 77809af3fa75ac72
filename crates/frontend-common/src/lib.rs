//! Shared frontend core for the job marketplace
//!
//! Holds the session store, the resilient request executor every screen goes
//! through, durable storage backends and frontend configuration.

pub mod auth;
pub mod client;
pub mod config;
pub mod logging;
pub mod services;
pub mod storage;

pub use auth::{Session, SessionError, SessionStore};
pub use client::{create_session, install_session, session};
pub use config::{AuthConfig, ClientSettings};
pub use services::{ApiExecutor, ExecutorState, SessionRefresher};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStorage;
