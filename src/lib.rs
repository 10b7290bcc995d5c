//! parkwatch - Live parking occupancy collector
//!
//! Collects occupancy status for the Aix-en-Provence SEMEPA parking
//! facilities by periodically fetching each facility's status page,
//! extracting a count or status phrase from it, and exposing the most
//! recent consistent snapshot to any number of readers.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and the built-in facility set
//! - [`collector`] - Sweep orchestration, HTTP fetching, status extraction
//! - [`store`] - Durable snapshot store with atomic publish
//! - [`scheduler`] - Background sweep loop and on-demand refresh coordination
//! - [`models`] - Core data structures and types
//!
//! # Example
//!
//! ```no_run
//! use parkwatch::config::Config;
//! use parkwatch::scheduler::Scheduler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let scheduler = Scheduler::from_config(&config)?;
//!     scheduler.start().await;
//!
//!     // Readers consult the store; the background loop keeps it fresh
//!     if let Some(snapshot) = scheduler.snapshot().await {
//!         println!("{} facilities open", snapshot.open_count());
//!     }
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::collector::{Collector, FetchError, Fetcher};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::{Facility, FacilityState, FacilityStatus, Snapshot};
    pub use crate::scheduler::Scheduler;
    pub use crate::store::{SnapshotStore, StoreError};
}

// Direct re-exports for convenience
pub use models::{Facility, FacilityState, FacilityStatus, Snapshot};
