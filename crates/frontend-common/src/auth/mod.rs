//! Authentication module

pub mod error_handler;
pub mod error_messages;
pub mod session;

// Re-export commonly used items
pub use error_handler::{
    clear_login_required_callback, set_login_required_callback, trigger_login_required,
};
pub use session::{Session, SessionError, SessionStore};
