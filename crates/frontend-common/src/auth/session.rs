//! Session store
//!
//! Single source of truth for "is there an authenticated user". The token and
//! the profile live together in one [`Session`] value guarded by a mutex, and
//! are mirrored to durable storage under [`AuthConfig::TOKEN_KEY`] and
//! [`AuthConfig::USER_KEY`]. Both are always written or cleared under a
//! single lock acquisition, so no reader can observe one without the other.
//! The lock is never held across an `.await`.

use crate::config::AuthConfig;
use crate::services::executor::SessionRefresher;
use crate::storage::{KeyValueStorage, StorageError};
use async_trait::async_trait;
use jobboard_http::types::{LoginRequest, RegisterRequest, UserProfile, UserUpdate};
use jobboard_http::{ClientError, MarketClient, TokenSource};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Session error types
#[derive(Debug, Error)]
pub enum SessionError {
    /// The API rejected the request
    #[error(transparent)]
    Api(#[from] ClientError),

    /// Durable storage could not be written
    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),

    /// The profile could not be serialized
    #[error("Failed to serialize profile: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation needs an active session
    #[error("No active session")]
    NotAuthenticated,
}

/// Current authentication state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub is_loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            is_loading: true, // Start with loading until the stored session is checked
        }
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

/// State shared between the store and the HTTP client's token interceptor
struct SessionShared {
    state: Mutex<Session>,
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionShared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist and publish a token/profile pair
    fn commit(&self, token: String, user: UserProfile) -> Result<(), SessionError> {
        let serialized = serde_json::to_string(&user)?;
        let mut state = self.lock();

        let persisted = self
            .storage
            .set(AuthConfig::TOKEN_KEY, &token)
            .and_then(|()| self.storage.set(AuthConfig::USER_KEY, &serialized));
        if let Err(err) = persisted {
            self.remove_persisted();
            state.token = None;
            state.user = None;
            return Err(err.into());
        }

        state.token = Some(token);
        state.user = Some(user);
        Ok(())
    }

    /// Drop the session from memory and durable storage
    fn clear(&self) {
        let mut state = self.lock();
        self.remove_persisted();
        state.token = None;
        state.user = None;
    }

    fn remove_persisted(&self) {
        for key in [AuthConfig::TOKEN_KEY, AuthConfig::USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %err, "Failed to remove persisted session entry");
            }
        }
    }

    fn read_persisted(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|value| !value.is_empty()),
            Err(err) => {
                warn!(key, error = %err, "Failed to read persisted session entry");
                None
            }
        }
    }

    /// The persisted pair, or `None` when either half is missing or unreadable
    fn load_persisted(&self) -> Option<(String, UserProfile)> {
        let token = self.read_persisted(AuthConfig::TOKEN_KEY);
        let user = self.read_persisted(AuthConfig::USER_KEY);

        match (token, user) {
            (Some(token), Some(user)) => match serde_json::from_str::<UserProfile>(&user) {
                Ok(user) => Some((token, user)),
                Err(err) => {
                    warn!(error = %err, "Stored profile is unreadable, discarding session");
                    self.clear();
                    None
                }
            },
            (None, None) => None,
            _ => {
                debug!("Found half of a stored session, discarding it");
                self.clear();
                None
            }
        }
    }

    /// Publish a validated stored session unless it changed while validating
    fn restore(&self, token: String, user: UserProfile) -> bool {
        let mut state = self.lock();
        if self.read_persisted(AuthConfig::TOKEN_KEY).as_deref() != Some(token.as_str()) {
            debug!("Stored session changed during validation, not restoring");
            return false;
        }
        state.token = Some(token);
        state.user = Some(user);
        true
    }
}

impl TokenSource for SessionShared {
    fn bearer_token(&self) -> Option<String> {
        let in_memory = self.lock().token.clone();
        // Before the stored session is restored, requests carry the persisted token
        in_memory.or_else(|| self.read_persisted(AuthConfig::TOKEN_KEY))
    }

    fn validation_rejected(&self) {
        info!("Token rejected by the validation endpoint, clearing session");
        self.clear();
    }
}

/// Handle to the session store
///
/// Cheap to clone; all clones share the same session.
#[derive(Clone)]
pub struct SessionStore {
    shared: Arc<SessionShared>,
    client: MarketClient,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.snapshot();
        f.debug_struct("SessionStore")
            .field("authenticated", &session.is_authenticated())
            .field("username", &session.user.as_ref().map(|u| u.username.as_str()))
            .field("is_loading", &session.is_loading)
            .field("client", &self.client)
            .finish()
    }
}

impl SessionStore {
    /// Create a store over `storage`, wiring `client`'s token interceptor to it
    pub fn new(client: MarketClient, storage: Arc<dyn KeyValueStorage>) -> Self {
        let shared = Arc::new(SessionShared {
            state: Mutex::new(Session::default()),
            storage,
        });
        let client = client.with_token_source(shared.clone());
        Self { shared, client }
    }

    /// Client whose requests carry this session's token
    pub fn client(&self) -> &MarketClient {
        &self.client
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.shared.lock().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.shared.lock().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.shared.lock().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.shared.lock().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.lock().is_loading
    }

    /// Restore the stored session, if still valid, and finish loading
    pub async fn initialize(&self) -> bool {
        let restored = self.refresh_session().await;
        self.shared.lock().is_loading = false;
        restored
    }

    /// Log in and load the profile; nothing is stored unless both succeed
    pub async fn login(&self, credentials: &LoginRequest) -> Result<UserProfile, SessionError> {
        let response = self.client.login(credentials).await?;
        let user = self.establish(response.access_token).await?;
        info!(username = %user.username, "Logged in");
        Ok(user)
    }

    /// Register and log in with the returned token
    pub async fn register(&self, new_user: &RegisterRequest) -> Result<UserProfile, SessionError> {
        let response = self.client.register(new_user).await?;
        let user = self.establish(response.access_token).await?;
        info!(username = %user.username, user_type = %user.user_type, "Registered");
        Ok(user)
    }

    async fn establish(&self, token: String) -> Result<UserProfile, SessionError> {
        let user = self.client.get_profile_with_token(&token).await?;
        self.shared.commit(token, user.clone())?;
        Ok(user)
    }

    /// Forget the session locally. Always succeeds and never touches the network.
    pub fn logout(&self) {
        self.shared.clear();
        info!("Logged out");
    }

    /// Check the stored token with the backend
    ///
    /// Returns false without any request when nothing usable is stored. On a
    /// positive answer the stored profile is restored; on a negative answer or
    /// any failure the session is cleared.
    pub async fn refresh_session(&self) -> bool {
        let Some((token, user)) = self.shared.load_persisted() else {
            debug!("No stored session to refresh");
            return false;
        };

        match self.client.validate_token().await {
            Ok(true) => self.shared.restore(token, user),
            Ok(false) => {
                info!("Stored token is no longer valid");
                self.shared.clear();
                false
            }
            Err(err) => {
                warn!(error = %err, "Token validation failed");
                self.shared.clear();
                false
            }
        }
    }

    /// Validate the current token and replace the profile with a fresh copy from the server
    pub async fn reload_profile(&self) -> bool {
        let Some(token) = self.shared.bearer_token() else {
            return false;
        };

        let reloaded = match self.client.validate_token().await {
            Ok(true) => self.client.get_profile_with_token(&token).await.map(Some),
            Ok(false) => Ok(None),
            Err(err) => Err(err),
        };

        match reloaded {
            Ok(Some(user)) => match self.shared.commit(token, user) {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "Failed to store reloaded profile");
                    self.shared.clear();
                    false
                }
            },
            Ok(None) => {
                info!("Token is no longer valid, clearing session");
                self.shared.clear();
                false
            }
            Err(err) => {
                warn!(error = %err, "Profile reload failed");
                self.shared.clear();
                false
            }
        }
    }

    /// Replace the profile without touching the token
    pub fn update_profile(&self, user: UserProfile) -> Result<(), SessionError> {
        let serialized = serde_json::to_string(&user)?;
        let mut state = self.shared.lock();
        if state.token.is_none() {
            return Err(SessionError::NotAuthenticated);
        }
        self.shared.storage.set(AuthConfig::USER_KEY, &serialized)?;
        state.user = Some(user);
        Ok(())
    }

    /// Send a profile edit to the server and adopt the stored result
    pub async fn save_profile(&self, update: &UserUpdate) -> Result<UserProfile, SessionError> {
        let user = self.client.update_profile(update).await?;
        self.update_profile(user.clone())?;
        Ok(user)
    }
}

#[async_trait]
impl SessionRefresher for SessionStore {
    async fn refresh_session(&self) -> bool {
        SessionStore::refresh_session(self).await
    }

    fn invalidate(&self) {
        info!("Session invalidated after an authentication failure");
        self.shared.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use jobboard_http::types::UserType;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            id: 1,
            username: name.to_string(),
            full_name: "Ana Ilic".into(),
            email: "ana@example.com".into(),
            phone: "0601234567".into(),
            city: "Belgrade".into(),
            bio: None,
            user_type: UserType::Freelancer,
            created_at: "2024-01-15".into(),
            updated_at: None,
        }
    }

    fn store_for(server: &MockServer, storage: Arc<MemoryStorage>) -> SessionStore {
        let client = MarketClient::new(server.uri()).unwrap();
        SessionStore::new(client, storage)
    }

    fn persist(storage: &MemoryStorage, token: &str, user: &UserProfile) {
        storage.set(AuthConfig::TOKEN_KEY, token).unwrap();
        storage
            .set(AuthConfig::USER_KEY, &serde_json::to_string(user).unwrap())
            .unwrap();
    }

    fn assert_paired(store: &SessionStore, storage: &MemoryStorage) {
        let session = store.snapshot();
        assert_eq!(session.token.is_some(), session.user.is_some());
        let token = storage.get(AuthConfig::TOKEN_KEY).unwrap();
        let user = storage.get(AuthConfig::USER_KEY).unwrap();
        assert_eq!(token.is_some(), user.is_some());
    }

    #[tokio::test]
    async fn starts_empty_and_loading() {
        let server = MockServer::start().await;
        let store = store_for(&server, Arc::new(MemoryStorage::new()));

        let session = store.snapshot();
        assert!(session.is_loading);
        assert!(!store.is_authenticated());
        assert_eq!(session.token, None);
    }

    #[tokio::test]
    async fn login_stores_token_and_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "accessToken": "tok-1", "tokenType": "Bearer" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile("ana")))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        let store = store_for(&server, storage.clone());

        let user = store
            .login(&LoginRequest {
                username: "ana".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();

        assert_eq!(user, profile("ana"));
        assert_eq!(store.token().as_deref(), Some("tok-1"));
        assert_eq!(store.user(), Some(profile("ana")));
        assert_eq!(
            storage.get(AuthConfig::TOKEN_KEY).unwrap().as_deref(),
            Some("tok-1")
        );
        assert_paired(&store, &storage);
    }

    #[tokio::test]
    async fn rejected_login_leaves_session_cleared() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": 401,
                "message": "Invalid username or password"
            })))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        let store = store_for(&server, storage.clone());

        let result = store
            .login(&LoginRequest {
                username: "x".into(),
                password: "bad".into(),
            })
            .await;

        assert!(matches!(result, Err(SessionError::Api(ref e)) if e.is_unauthorized()));
        assert_eq!(store.token(), None);
        assert_eq!(store.user(), None);
        assert_eq!(storage.get(AuthConfig::TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(AuthConfig::USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn failed_profile_fetch_after_login_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "tok" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        let store = store_for(&server, storage.clone());

        let result = store
            .register(&RegisterRequest {
                username: "ana".into(),
                password: "secret".into(),
                full_name: "Ana Ilic".into(),
                email: "ana@example.com".into(),
                phone: "0601234567".into(),
                city: "Belgrade".into(),
                user_type: UserType::Freelancer,
            })
            .await;

        assert!(result.is_err());
        assert!(!store.is_authenticated());
        assert_eq!(storage.get(AuthConfig::TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let server = MockServer::start().await;
        let storage = Arc::new(MemoryStorage::new());
        persist(&storage, "tok", &profile("ana"));
        let store = store_for(&server, storage.clone());

        store.logout();
        let once = store.snapshot();
        store.logout();
        let twice = store.snapshot();

        assert_eq!(once, twice);
        assert_eq!(twice.token, None);
        assert_eq!(storage.get(AuthConfig::TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(AuthConfig::USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn refresh_without_stored_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(true))
            .expect(0)
            .mount(&server)
            .await;

        let store = store_for(&server, Arc::new(MemoryStorage::new()));
        assert!(!store.refresh_session().await);
    }

    #[tokio::test]
    async fn refresh_restores_exact_stored_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .and(header("authorization", "Bearer stored"))
            .respond_with(ResponseTemplate::new(200).set_body_json(true))
            .expect(1)
            .mount(&server)
            .await;

        let mut stored = profile("ana");
        stored.bio = Some("Rust developer".into());
        let storage = Arc::new(MemoryStorage::new());
        persist(&storage, "stored", &stored);
        let store = store_for(&server, storage.clone());

        assert!(store.initialize().await);
        assert_eq!(store.user(), Some(stored));
        assert_eq!(store.token().as_deref(), Some("stored"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn refresh_with_rejected_token_clears_everything() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(false))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        persist(&storage, "old", &profile("ana"));
        let store = store_for(&server, storage.clone());

        assert!(!store.refresh_session().await);
        assert!(!store.is_authenticated());
        assert_eq!(storage.get(AuthConfig::TOKEN_KEY).unwrap(), None);
        assert_paired(&store, &storage);
    }

    #[tokio::test]
    async fn validate_401_clears_at_transport_layer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        persist(&storage, "old", &profile("ana"));
        let store = store_for(&server, storage.clone());

        let direct = store.client().validate_token().await;

        assert!(matches!(direct, Err(ref e) if e.is_unauthorized()));
        assert_eq!(storage.get(AuthConfig::TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(AuthConfig::USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn unparsable_stored_profile_means_no_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(true))
            .expect(0)
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        storage.set(AuthConfig::TOKEN_KEY, "tok").unwrap();
        storage.set(AuthConfig::USER_KEY, "{not json").unwrap();
        let store = store_for(&server, storage.clone());

        assert!(!store.refresh_session().await);
        assert_eq!(storage.get(AuthConfig::TOKEN_KEY).unwrap(), None);
        assert_paired(&store, &storage);
    }

    #[tokio::test]
    async fn update_profile_round_trips() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(true))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        persist(&storage, "tok", &profile("ana"));
        let store = store_for(&server, storage.clone());
        assert!(store.refresh_session().await);

        let mut edited = profile("ana");
        edited.city = "Kragujevac".into();
        edited.bio = None;
        store.update_profile(edited.clone()).unwrap();

        assert_eq!(store.user(), Some(edited.clone()));
        assert_eq!(store.token().as_deref(), Some("tok"));
        let persisted: UserProfile =
            serde_json::from_str(&storage.get(AuthConfig::USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, edited);
    }

    #[tokio::test]
    async fn update_profile_requires_session() {
        let server = MockServer::start().await;
        let storage = Arc::new(MemoryStorage::new());
        let store = store_for(&server, storage.clone());

        let result = store.update_profile(profile("ana"));

        assert!(matches!(result, Err(SessionError::NotAuthenticated)));
        assert_eq!(storage.get(AuthConfig::USER_KEY).unwrap(), None);
        assert_paired(&store, &storage);
    }

    #[tokio::test]
    async fn reload_profile_fetches_fresh_copy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(true))
            .mount(&server)
            .await;
        let mut fresh = profile("ana");
        fresh.city = "Subotica".into();
        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fresh.clone()))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        persist(&storage, "tok", &profile("ana"));
        let store = store_for(&server, storage.clone());

        assert!(store.reload_profile().await);
        assert_eq!(store.user(), Some(fresh));
        assert_paired(&store, &storage);
    }

    #[tokio::test]
    async fn save_profile_adopts_server_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(true))
            .mount(&server)
            .await;
        let mut saved = profile("ana");
        saved.phone = "0611111111".into();
        Mock::given(method("PUT"))
            .and(path("/users/profile"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(saved.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        persist(&storage, "tok", &profile("ana"));
        let store = store_for(&server, storage.clone());
        assert!(store.refresh_session().await);

        let update = UserUpdate::from(&saved);
        let result = store.save_profile(&update).await.unwrap();

        assert_eq!(result, saved);
        assert_eq!(store.user(), Some(saved));
    }
}
