pub mod executor;

pub use executor::{ApiExecutor, ExecutorState, SessionRefresher};
