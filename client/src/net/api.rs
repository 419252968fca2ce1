//! REST helpers for the event-listing API and the session check.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, token from
//! `localStorage`.
//! Server-side and native test builds: no browser, so fetches report
//! [`ApiError::Unavailable`] and the session check fails.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is an [`ApiError`]. The poller only needs to tell auth
//! failures (stop) from everything else (retry next tick).

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::types::EventRecord;
#[cfg(feature = "hydrate")]
use super::types::EventPage;
use crate::config::MonitorConfig;
use crate::poller::EventSource;

/// Failure of a backend request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("session expired or not authorized")]
    Unauthorized,
    #[error("request failed with status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("event API is only available in the browser")]
    Unavailable,
}

impl ApiError {
    /// Classify a non-success HTTP status. 401 and 403 both mean the session is gone.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            other => Self::Status(other),
        }
    }

    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// First page of the newest `limit` events under `base`.
#[must_use]
pub fn events_url(base: &str, limit: usize) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}limit={limit}&page=1")
}

/// Snapshot endpoint used as the zone editor background.
#[must_use]
pub fn camera_preview_url(camera_id: &str) -> String {
    format!("/api/v1/cameras/{camera_id}/snapshot")
}

/// Read the bearer token stored under `key`. Empty values count as absent.
#[cfg_attr(not(feature = "hydrate"), allow(unused_variables))]
pub fn read_session_token(key: &str) -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        let storage = web_sys::window()?.local_storage().unwrap_or(None)?;
        storage.get_item(key).unwrap_or(None).filter(|token| !token.is_empty())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

/// Session check: a non-empty token is present.
#[must_use]
pub fn has_session_token(key: &str) -> bool {
    read_session_token(key).is_some()
}

/// Fetch the newest `limit` events, newest first.
///
/// # Errors
///
/// [`ApiError::Unauthorized`] on 401/403, [`ApiError::Status`] on other
/// non-success codes, [`ApiError::Network`] or [`ApiError::Decode`] when the
/// request or body fails, [`ApiError::Unavailable`] outside the browser.
#[allow(clippy::unused_async)]
#[cfg_attr(not(feature = "hydrate"), allow(unused_variables))]
pub async fn fetch_recent_events(base: &str, token: Option<&str>, limit: usize) -> Result<Vec<EventRecord>, ApiError> {
    #[cfg(feature = "hydrate")]
    {
        let url = events_url(base, limit);
        let mut request = gloo_net::http::Request::get(&url);
        if let Some(token) = token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        if !(200..300).contains(&status) {
            return Err(ApiError::from_status(status));
        }
        let page: EventPage = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(page.items)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(ApiError::Unavailable)
    }
}

/// [`EventSource`] backed by the backend REST API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpEventSource {
    events_url: String,
    token_key: String,
}

impl HttpEventSource {
    #[must_use]
    pub fn new(events_url: impl Into<String>, token_key: impl Into<String>) -> Self {
        Self { events_url: events_url.into(), token_key: token_key.into() }
    }

    #[must_use]
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.events_url.clone(), config.token_key.clone())
    }

    #[must_use]
    pub fn events_url(&self) -> &str {
        &self.events_url
    }
}

impl EventSource for HttpEventSource {
    fn has_session(&self) -> bool {
        has_session_token(&self.token_key)
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<EventRecord>, ApiError> {
        let token = read_session_token(&self.token_key);
        fetch_recent_events(&self.events_url, token.as_deref(), limit).await
    }
}
