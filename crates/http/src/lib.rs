//! Jobboard HTTP client
//!
//! Typed access to the job marketplace REST API: authentication, profiles,
//! jobs, applications, skills and reference data.

pub mod client;
pub mod types;

pub use client::error::{ClientError, ErrorKind};
pub use client::{MarketClient, MarketClientBuilder, TokenSource};
