//! Client configuration and initialization

use crate::auth::SessionStore;
use crate::config::ClientSettings;
use crate::storage::KeyValueStorage;
pub use jobboard_http::client::error::ClientError;
use jobboard_http::MarketClient;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Global session instance
static SESSION: OnceCell<SessionStore> = OnceCell::new();

/// Build an HTTP client from settings
pub fn build_client(settings: &ClientSettings) -> Result<MarketClient, ClientError> {
    MarketClient::builder()
        .base_url(settings.base_url.clone())
        .timeout(settings.timeout())
        .build()
}

/// Build a session store whose client sends that session's token
pub fn create_session(
    settings: &ClientSettings,
    storage: Arc<dyn KeyValueStorage>,
) -> Result<SessionStore, ClientError> {
    Ok(SessionStore::new(build_client(settings)?, storage))
}

/// Make `session` the process-wide session; returns it back if one is already installed
pub fn install_session(session: SessionStore) -> Result<(), SessionStore> {
    SESSION.set(session)
}

/// The process-wide session, if installed
pub fn session() -> Option<&'static SessionStore> {
    SESSION.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn settings(base_url: &str) -> ClientSettings {
        ClientSettings {
            base_url: base_url.to_string(),
            ..ClientSettings::default()
        }
    }

    #[test]
    fn session_is_installed_once() {
        assert!(session().is_none());

        let first = create_session(
            &settings("http://first.example.com/api"),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();
        install_session(first).unwrap();

        let second = create_session(
            &settings("http://second.example.com/api"),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();
        let rejected = install_session(second).unwrap_err();
        assert_eq!(rejected.client().base_url(), "http://second.example.com/api");

        let installed = session().unwrap();
        assert_eq!(installed.client().base_url(), "http://first.example.com/api");
        assert!(!installed.is_authenticated());
    }

    #[test]
    fn build_client_trims_trailing_slash() {
        let client = build_client(&settings("http://localhost:8080/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }
}
