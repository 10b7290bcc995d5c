//! Shared helpers for parkwatch integration tests

use parkwatch::config::FetchConfig;
use parkwatch::models::Facility;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A realistic facility status page with the given content in the
/// availability slot
pub fn facility_page(slot: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Parking</title></head>
<body>
<div class="parking-status">
  <p class="nbPlaces"><span style="color:#2e7d32">{slot}</span></p>
</div>
</body>
</html>"#
    )
}

/// Fetch configuration suitable for tests: short timeout, no pacing
pub fn fast_fetch_config() -> FetchConfig {
    FetchConfig {
        timeout_secs: 1,
        request_gap_ms: 0,
        ..FetchConfig::default()
    }
}

/// A facility whose base URL is replaced by the mock server in tests
pub fn facility(name: &str, page_id: u32, capacity: u32) -> Facility {
    Facility::new(name, "https://unused.invalid/", page_id, capacity)
}

/// Mount a response for one facility's `page_id` on the mock server
pub async fn mount_facility(server: &MockServer, page_id: u32, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page_id", page_id.to_string()))
        .respond_with(template)
        .mount(server)
        .await;
}
