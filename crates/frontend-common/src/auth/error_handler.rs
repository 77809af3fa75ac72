//! Global login-required handler
//!
//! Executors built without their own navigation callback fall back to this
//! process-wide hook when a session refresh fails. The application installs it
//! once, next to its router.

use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, PoisonError};

type LoginRequiredCallback = Arc<dyn Fn() + Send + Sync>;

/// Global login-required callback
static LOGIN_REQUIRED_CALLBACK: Lazy<Mutex<Option<LoginRequiredCallback>>> =
    Lazy::new(|| Mutex::new(None));

/// Set the global login-required callback
pub fn set_login_required_callback(callback: LoginRequiredCallback) {
    *LOGIN_REQUIRED_CALLBACK
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = Some(callback);
}

/// Clear the login-required callback
pub fn clear_login_required_callback() {
    *LOGIN_REQUIRED_CALLBACK
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = None;
}

/// Trigger the login-required callback; returns false when none is installed
pub fn trigger_login_required() -> bool {
    // Clone out of the lock so the callback may reinstall itself
    let callback = LOGIN_REQUIRED_CALLBACK
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match callback {
        Some(callback) => {
            callback();
            true
        }
        None => false,
    }
}
