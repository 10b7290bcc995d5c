//! Unified error handling for the parkwatch crate
//!
//! Domain-specific errors live next to the code that raises them
//! ([`FetchError`] in the collector, [`StoreError`] in the store); this
//! module wraps them into a single [`Error`] enum for use across module
//! boundaries.
//!
//! Note the narrow surface: per-facility fetch and extraction failures are
//! absorbed into `FacilityState` and never travel as errors, and snapshot
//! load failures are absorbed as an empty store. What remains here is
//! construction-time failure (bad configuration, HTTP client build) and
//! persistence write failure.

use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::collector::fetcher::FetchError;
pub use crate::store::StoreError;

/// Unified error type for the parkwatch crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Snapshot persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
