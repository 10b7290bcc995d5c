//! Sweep orchestration: fetch and extract every configured facility
//!
//! A sweep walks the facilities in configuration order, fetches each status
//! page, and extracts a status from it. Per-facility failures become
//! `FetchError` or `NoData` entries in the resulting snapshot; they never
//! fail the sweep itself, so one unreachable facility cannot prevent the
//! others from updating.

pub mod extract;
pub mod fetcher;

pub use extract::{extract, FULL_THRESHOLD};
pub use fetcher::{FetchError, Fetcher};

use std::time::Instant;

use crate::models::{Facility, FacilityStatus, Snapshot};

/// Runs full sweeps over the configured facility set
pub struct Collector {
    /// Facility descriptors, in configuration order
    facilities: Vec<Facility>,

    /// Status page fetcher
    fetcher: Fetcher,
}

impl Collector {
    /// Create a collector over a facility set
    pub fn new(facilities: Vec<Facility>, fetcher: Fetcher) -> Self {
        Self {
            facilities,
            fetcher,
        }
    }

    /// The facility set this collector sweeps
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    /// Run one full sweep and assemble a snapshot
    ///
    /// Always returns a snapshot covering every configured facility, in
    /// configuration order. Each entry is timestamped when it is finalized,
    /// so entries within one sweep differ by the per-facility fetch time.
    pub async fn run_sweep(&self) -> Snapshot {
        let started = Instant::now();
        let mut snapshot = Snapshot::begin();

        for facility in &self.facilities {
            let status = self.sweep_one(facility).await;
            tracing::debug!(
                facility = %facility.name,
                state = %status.state,
                available = status.available,
                "facility swept"
            );
            snapshot.push(status);
        }

        tracing::info!(
            facilities = snapshot.len(),
            open = snapshot.open_count(),
            available = snapshot.total_available(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sweep complete"
        );

        snapshot
    }

    async fn sweep_one(&self, facility: &Facility) -> FacilityStatus {
        match self.fetcher.fetch(facility).await {
            Ok(body) => extract(&facility.name, &body, facility.capacity),
            Err(e) => {
                tracing::warn!(facility = %facility.name, error = %e, "fetch failed");
                FacilityStatus::fetch_error(&facility.name)
            }
        }
    }
}
