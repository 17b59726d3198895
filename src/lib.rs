//! # FitHaus
//!
//! The core of a fitness-tracking backend on PostgreSQL: filtered and paginated
//! listings compiled from query parameters, visibility-aware assembly of
//! workouts with their exercises, and transactional mutations such as copying
//! a workout or toggling a like.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fithaus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let fithaus = FitHaus::new(&config).await?;
//!     fithaus.migrate(false).await?;
//!
//!     let requester = Requester::user(1);
//!     let page = fithaus
//!         .workouts()
//!         .list(&requester, &[("min_price", "0"), ("like_title", "leg"), ("limit", "5")])
//!         .await?;
//!     println!("{} of {} workouts", page.items.len(), page.total);
//!
//!     fithaus.shutdown().await;
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod assembler;
pub mod collaborators;
pub mod core;
pub mod errors;
pub mod generation;
pub mod identity;
pub mod migration;
pub mod prelude;
pub mod responses;
pub mod services;
pub mod visibility;

#[cfg(test)]
mod test_support;

// Re-export the main public types for convenience
pub use core::FitHaus;
pub use errors::{FitHausError, ServiceError, StatusClass};
pub use identity::Requester;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, GenerationConfig, QueryConfig, UnknownKeyPolicy};

// Re-export internal crates used in the public API
pub use query_engine;
pub use store_object;
pub use task_queue;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
