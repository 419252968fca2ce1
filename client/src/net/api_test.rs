use super::*;

// =============================================================
// Error classification
// =============================================================

#[test]
fn auth_statuses_map_to_unauthorized() {
    assert_eq!(ApiError::from_status(401), ApiError::Unauthorized);
    assert_eq!(ApiError::from_status(403), ApiError::Unauthorized);
    assert!(ApiError::from_status(401).is_auth_failure());
}

#[test]
fn other_statuses_are_not_auth_failures() {
    assert_eq!(ApiError::from_status(500), ApiError::Status(500));
    assert!(!ApiError::from_status(404).is_auth_failure());
    assert!(!ApiError::Network("offline".to_owned()).is_auth_failure());
    assert!(!ApiError::Unavailable.is_auth_failure());
}

#[test]
fn error_messages_carry_detail() {
    assert_eq!(ApiError::Status(502).to_string(), "request failed with status 502");
    assert_eq!(ApiError::Decode("eof".to_owned()).to_string(), "invalid response body: eof");
}

// =============================================================
// URLs
// =============================================================

#[test]
fn events_url_appends_limit_and_first_page() {
    assert_eq!(events_url("/api/v1/events", 5), "/api/v1/events?limit=5&page=1");
}

#[test]
fn events_url_extends_existing_query() {
    assert_eq!(events_url("/api/v1/events?severity=red", 3), "/api/v1/events?severity=red&limit=3&page=1");
}

#[test]
fn camera_preview_url_uses_snapshot_endpoint() {
    assert_eq!(camera_preview_url("cam-9"), "/api/v1/cameras/cam-9/snapshot");
}

// =============================================================
// Non-browser builds
// =============================================================

#[test]
fn session_check_fails_without_browser() {
    assert!(!has_session_token("token"));
    assert!(read_session_token("token").is_none());
}

#[test]
fn fetch_is_unavailable_without_browser() {
    let result = futures::executor::block_on(fetch_recent_events("/api/v1/events", Some("t"), 5));
    assert_eq!(result, Err(ApiError::Unavailable));
}

#[test]
fn http_source_reads_config() {
    let config = MonitorConfig::default();
    let source = HttpEventSource::from_config(&config);
    assert_eq!(source.events_url(), "/api/v1/events");
    assert!(!source.has_session());
    let result = futures::executor::block_on(source.fetch_recent(5));
    assert_eq!(result, Err(ApiError::Unavailable));
}
