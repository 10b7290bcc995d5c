// Core data structures for the parkwatch collector

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Display marker for a facility that is open but effectively full.
pub const FULL_MARKER: &str = "FULL";

/// Display marker when neither status pattern matches the fetched page.
pub const NO_DATA_MARKER: &str = "N/A";

/// Display marker for a facility whose endpoint could not be reached.
pub const ERROR_MARKER: &str = "Error";

/// One tracked parking structure
///
/// Facilities are loaded once from configuration at startup and stay
/// immutable for the process lifetime. `name` is the unique key used
/// everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    /// Unique facility name (e.g., "Rotonde")
    pub name: String,

    /// Base URL of the status endpoint
    pub base_url: String,

    /// Opaque per-facility identifier, passed as the `page_id` query parameter
    pub page_id: u32,

    /// Total number of spaces; 0 means unknown
    #[serde(default)]
    pub capacity: u32,

    /// Latitude, consumed only by map-style consumers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude, consumed only by map-style consumers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Facility {
    /// Create a facility without coordinates
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        page_id: u32,
        capacity: u32,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            page_id,
            capacity,
            latitude: None,
            longitude: None,
        }
    }

    /// Attach map coordinates
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Both coordinates, if the facility has them
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Observed state of a facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacilityState {
    /// Open with spaces available
    Open,

    /// Open but at (or within a couple of spaces of) capacity
    Full,

    /// Upstream shows a closure or diagnostic message instead of a count
    Closed,

    /// Page fetched but neither status pattern matched
    NoData,

    /// Endpoint unreachable within the request budget
    FetchError,
}

impl FacilityState {
    /// Whether the facility is taking cars at all (open, possibly full)
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::Full)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Full => "full",
            Self::Closed => "closed",
            Self::NoData => "no-data",
            Self::FetchError => "fetch-error",
        }
    }
}

impl std::fmt::Display for FacilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of one facility as produced by a single sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityStatus {
    /// Facility name this status belongs to
    pub facility: String,

    /// Free spaces; 0 whenever the count is unavailable or unknown
    pub available: u32,

    /// Derived state
    pub state: FacilityState,

    /// Human-readable rendering ("x / capacity", a status phrase, or a marker)
    pub display: String,

    /// When this status was finalized. Stamped per facility, not per sweep,
    /// so entries within one snapshot may differ by a few seconds.
    pub observed_at: DateTime<Utc>,
}

impl FacilityStatus {
    /// Status for a facility whose endpoint could not be reached
    pub fn fetch_error(facility: impl Into<String>) -> Self {
        Self {
            facility: facility.into(),
            available: 0,
            state: FacilityState::FetchError,
            display: ERROR_MARKER.to_string(),
            observed_at: Utc::now(),
        }
    }

    /// Observation time rendered in the deployment reference zone
    pub fn observed_in(&self, tz: Tz) -> DateTime<Tz> {
        self.observed_at.with_timezone(&tz)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Latest consistent set of per-facility statuses
///
/// A snapshot always covers every configured facility (failures are entries,
/// not omissions). Snapshots are superseded whole by the next sweep and never
/// mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sweep start time
    pub taken_at: DateTime<Utc>,

    /// Per-facility statuses, in facility configuration order
    pub entries: Vec<FacilityStatus>,
}

impl Snapshot {
    /// Start an empty snapshot for a sweep beginning now
    pub fn begin() -> Self {
        Self {
            taken_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Append one facility's status
    pub fn push(&mut self, status: FacilityStatus) {
        self.entries.push(status);
    }

    /// Look up a facility by name
    pub fn get(&self, facility: &str) -> Option<&FacilityStatus> {
        self.entries.iter().find(|s| s.facility == facility)
    }

    /// Number of facilities covered
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Facilities currently taking cars
    pub fn open_count(&self) -> usize {
        self.entries.iter().filter(|s| s.state.is_open()).count()
    }

    /// Sum of free spaces across all facilities
    pub fn total_available(&self) -> u32 {
        self.entries.iter().map(|s| s.available).sum()
    }

    /// Age of the snapshot in seconds
    pub fn age_seconds(&self) -> i64 {
        (Utc::now() - self.taken_at).num_seconds()
    }

    /// Sweep time rendered in the deployment reference zone
    pub fn taken_in(&self, tz: Tz) -> DateTime<Tz> {
        self.taken_at.with_timezone(&tz)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(facility: &str, available: u32, state: FacilityState) -> FacilityStatus {
        FacilityStatus {
            facility: facility.to_string(),
            available,
            state,
            display: available.to_string(),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_facility_coordinates() {
        let plain = Facility::new("Carnot", "https://example.test/", 211, 675);
        assert!(plain.coordinates().is_none());

        let located = plain.with_coordinates(43.5255598, 5.4554612);
        assert_eq!(located.coordinates(), Some((43.5255598, 5.4554612)));
    }

    #[test]
    fn test_state_is_open() {
        assert!(FacilityState::Open.is_open());
        assert!(FacilityState::Full.is_open());
        assert!(!FacilityState::Closed.is_open());
        assert!(!FacilityState::NoData.is_open());
        assert!(!FacilityState::FetchError.is_open());
    }

    #[test]
    fn test_snapshot_lookup_and_counts() {
        let mut snapshot = Snapshot::begin();
        snapshot.push(status("Rotonde", 431, FacilityState::Open));
        snapshot.push(status("Mignet", 0, FacilityState::Full));
        snapshot.push(status("Rambot", 0, FacilityState::FetchError));

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.open_count(), 2);
        assert_eq!(snapshot.total_available(), 431);
        assert_eq!(snapshot.get("Mignet").unwrap().state, FacilityState::Full);
        assert!(snapshot.get("Pasteur").is_none());
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut snapshot = Snapshot::begin();
        snapshot.push(status("Rotonde", 431, FacilityState::Open));

        let json = snapshot.to_json().unwrap();
        let parsed = Snapshot::from_json(&json).unwrap();

        assert_eq!(parsed.taken_at, snapshot.taken_at);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].facility, "Rotonde");
    }

    #[test]
    fn test_observed_in_reference_zone() {
        let st = FacilityStatus::fetch_error("Cardeurs");
        let paris = st.observed_in(chrono_tz::Europe::Paris);
        assert_eq!(paris.timestamp(), st.observed_at.timestamp());
    }
}
