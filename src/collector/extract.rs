//! Status extraction from fetched facility pages
//!
//! The upstream pages render availability inside a single markup slot that
//! sometimes holds a number and sometimes a textual placeholder. Two patterns
//! are tried in priority order:
//!
//! 1. A numeric pattern capturing the free-space count
//! 2. A looser textual pattern capturing whatever phrase fills the same slot
//!
//! "FULL" is recognized in both branches so that "closed for capacity" stays
//! distinguishable from "closed for maintenance" downstream. Extraction is a
//! pure function over the raw body; it performs no I/O.

use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

use crate::models::{FacilityState, FacilityStatus, FULL_MARKER, NO_DATA_MARKER};

/// A count at or below this renders as "FULL" rather than a number.
pub const FULL_THRESHOLD: u32 = 2;

static NUMERIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<p class="nbPlaces"><span[^>]*>(\d+)</span>"#).unwrap());

static TEXTUAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<p class="nbPlaces"><span[^>]*>([^<]+)</span>"#).unwrap());

/// Extract a facility status from a fetched page body
///
/// `capacity` only feeds the "x / capacity" rendering; a zero capacity still
/// yields a valid status. The returned status is stamped with the extraction
/// time, not the sweep start.
pub fn extract(facility: &str, raw: &str, capacity: u32) -> FacilityStatus {
    let (available, state, display) = classify(raw, capacity);

    FacilityStatus {
        facility: facility.to_string(),
        available,
        state,
        display,
        observed_at: Utc::now(),
    }
}

fn classify(raw: &str, capacity: u32) -> (u32, FacilityState, String) {
    if let Some(caps) = NUMERIC_PATTERN.captures(raw) {
        if let Ok(available) = caps[1].parse::<u32>() {
            return if available <= FULL_THRESHOLD {
                (available, FacilityState::Full, FULL_MARKER.to_string())
            } else if capacity == 0 {
                // Unknown capacity: no "x / y" rendering to derive
                (available, FacilityState::Open, available.to_string())
            } else {
                (
                    available,
                    FacilityState::Open,
                    format!("{available} / {capacity}"),
                )
            };
        }
    }

    if let Some(caps) = TEXTUAL_PATTERN.captures(raw) {
        let phrase = caps[1].trim();
        return if phrase.eq_ignore_ascii_case(FULL_MARKER) {
            (0, FacilityState::Full, FULL_MARKER.to_string())
        } else {
            (0, FacilityState::Closed, phrase.to_string())
        };
    }

    (0, FacilityState::NoData, NO_DATA_MARKER.to_string())
}
