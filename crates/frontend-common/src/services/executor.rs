//! Resilient request executor
//!
//! Gives every API-driven action the same loading/error behaviour and the same
//! reaction to an expired session: refresh once, retry once, otherwise ask for
//! a new login.

use crate::auth::error_handler::trigger_login_required;
use crate::auth::error_messages::{forbidden_by_authentication, user_message};
use crate::config::AuthConfig;
use async_trait::async_trait;
use jobboard_http::ClientError;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Session operations the executor relies on
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Revalidate the stored session; false means the user must log in again
    async fn refresh_session(&self) -> bool;

    /// Drop the session after the server refused it outright
    fn invalidate(&self);
}

/// Observable executor state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutorState {
    pub loading: bool,
    /// Empty when there is no error
    pub error: String,
}

type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&ClientError) + Send + Sync>;
type LoginCallback = Arc<dyn Fn() + Send + Sync>;

/// Where an unauthorized call goes next. Entered after the first 401.
enum Recovery<R> {
    Refreshing(Option<R>),
    Retrying(R),
    FailedToLogin,
    Skipped,
}

/// Clears the busy flag however the call ends
struct LoadingGuard<'a> {
    state: &'a Mutex<ExecutorState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

/// Runs API operations with uniform loading, error and refresh-retry handling
pub struct ApiExecutor<T> {
    refresher: Arc<dyn SessionRefresher>,
    state: Arc<Mutex<ExecutorState>>,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
    on_login_required: Option<LoginCallback>,
}

impl<T> Clone for ApiExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            refresher: self.refresher.clone(),
            state: self.state.clone(),
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
            on_login_required: self.on_login_required.clone(),
        }
    }
}

impl<T> fmt::Debug for ApiExecutor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiExecutor")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<T> ApiExecutor<T> {
    pub fn new(refresher: Arc<dyn SessionRefresher>) -> Self {
        Self {
            refresher,
            state: Arc::new(Mutex::new(ExecutorState::default())),
            on_success: None,
            on_error: None,
            on_login_required: None,
        }
    }

    /// Called with every successful result
    pub fn on_success(mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Called with every failure that ends up as a recorded error
    pub fn on_error(mut self, callback: impl Fn(&ClientError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Called instead of the global handler when the session cannot be refreshed
    pub fn on_login_required(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_login_required = Some(Arc::new(callback));
        self
    }

    fn lock(&self) -> MutexGuard<'_, ExecutorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ExecutorState {
        self.lock().clone()
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> String {
        self.lock().error.clone()
    }

    /// Dismiss the current error
    pub fn clear_error(&self) {
        self.lock().error.clear();
    }

    /// Run `operation`; on a 401 the session is refreshed but nothing is retried
    pub async fn execute<Op>(&self, operation: Op) -> Option<T>
    where
        Op: Future<Output = Result<T, ClientError>>,
    {
        self.run(operation, None::<Op>).await
    }

    /// Run `operation`; on a 401 refresh the session and run `retry` once
    ///
    /// `retry` is not polled unless the refresh succeeds.
    pub async fn execute_with_retry<Op, Retry>(&self, operation: Op, retry: Retry) -> Option<T>
    where
        Op: Future<Output = Result<T, ClientError>>,
        Retry: Future<Output = Result<T, ClientError>>,
    {
        self.run(operation, Some(retry)).await
    }

    async fn run<Op, Retry>(&self, operation: Op, retry: Option<Retry>) -> Option<T>
    where
        Op: Future<Output = Result<T, ClientError>>,
        Retry: Future<Output = Result<T, ClientError>>,
    {
        {
            let mut state = self.lock();
            state.loading = true;
            state.error.clear();
        }
        let _loading = LoadingGuard { state: &self.state };

        match operation.await {
            Ok(value) => return Some(self.succeed(value)),
            Err(err) if err.is_unauthorized() => {
                debug!(error = %err, "Request unauthorized, refreshing session");
            }
            Err(err) => {
                self.fail(&err, AuthConfig::REQUEST_FAILED);
                return None;
            }
        }

        let mut step = Recovery::Refreshing(retry);
        loop {
            step = match step {
                Recovery::Refreshing(retry) => {
                    if !self.refresher.refresh_session().await {
                        Recovery::FailedToLogin
                    } else if let Some(retry) = retry {
                        Recovery::Retrying(retry)
                    } else {
                        Recovery::Skipped
                    }
                }
                // Terminal: the retry future is consumed, so it cannot run twice
                Recovery::Retrying(retry) => {
                    return match retry.await {
                        Ok(value) => Some(self.succeed(value)),
                        Err(err) => {
                            self.fail(&err, AuthConfig::RETRY_FAILED);
                            None
                        }
                    };
                }
                Recovery::FailedToLogin => {
                    self.require_login();
                    return None;
                }
                Recovery::Skipped => {
                    debug!("Session refreshed, caller supplied no retry");
                    return None;
                }
            };
        }
    }

    fn succeed(&self, value: T) -> T {
        if let Some(callback) = &self.on_success {
            callback(&value);
        }
        value
    }

    fn fail(&self, error: &ClientError, fallback: &str) {
        let message = user_message(error, fallback);
        warn!(error = %error, message = %message, "Request failed");

        if forbidden_by_authentication(error) {
            self.refresher.invalidate();
        }

        self.lock().error = message;
        if let Some(callback) = &self.on_error {
            callback(error);
        }
    }

    fn require_login(&self) {
        info!("Session could not be refreshed, login required");
        match &self.on_login_required {
            Some(callback) => callback(),
            None => {
                if !trigger_login_required() {
                    warn!("Login required but no handler is installed");
                }
            }
        }
    }
}
