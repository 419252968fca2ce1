//! Monitor client configuration read from a key/value lookup.
//!
//! In the browser the lookup is `localStorage` (`monitor.*` keys) so an
//! operator can retune polling without a rebuild. Invalid or missing values
//! fall back to the defaults below.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_EVENTS_URL: &str = "/api/v1/events";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;
pub const MIN_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_POLL_BATCH: usize = 5;
/// Largest page the backend serves.
pub const MAX_POLL_BATCH: usize = 100;
pub const DEFAULT_TOKEN_KEY: &str = "token";

pub const EVENTS_URL_KEY: &str = "monitor.events_url";
pub const POLL_INTERVAL_KEY: &str = "monitor.poll_interval_ms";
pub const POLL_BATCH_KEY: &str = "monitor.poll_batch";
pub const TOKEN_KEY_KEY: &str = "monitor.token_key";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorConfig {
    pub events_url: String,
    pub poll_interval: Duration,
    pub poll_batch: usize,
    /// `localStorage` key holding the bearer token.
    pub token_key: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            events_url: DEFAULT_EVENTS_URL.to_owned(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            poll_batch: DEFAULT_POLL_BATCH,
            token_key: DEFAULT_TOKEN_KEY.to_owned(),
        }
    }
}

impl MonitorConfig {
    /// Build a config from an arbitrary lookup.
    ///
    /// Optional keys:
    /// - `monitor.events_url`: default `/api/v1/events` (trailing `/` trimmed)
    /// - `monitor.poll_interval_ms`: default 10000, at least 1000
    /// - `monitor.poll_batch`: default 5, clamped to 1..=100
    /// - `monitor.token_key`: default `token`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let events_url = non_empty(lookup(EVENTS_URL_KEY))
            .map_or_else(|| DEFAULT_EVENTS_URL.to_owned(), |url| url.trim_end_matches('/').to_owned());
        let interval_ms = parse_or(lookup(POLL_INTERVAL_KEY), DEFAULT_POLL_INTERVAL_MS).max(MIN_POLL_INTERVAL_MS);
        let poll_batch = parse_or(lookup(POLL_BATCH_KEY), DEFAULT_POLL_BATCH).clamp(1, MAX_POLL_BATCH);
        let token_key = non_empty(lookup(TOKEN_KEY_KEY)).unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_owned());

        Self { events_url, poll_interval: Duration::from_millis(interval_ms), poll_batch, token_key }
    }

    /// Read overrides from `localStorage`; defaults outside the browser.
    pub fn from_local_storage() -> Self {
        #[cfg(feature = "hydrate")]
        {
            let storage = web_sys::window().and_then(|w| w.local_storage().unwrap_or(None));
            Self::from_lookup(|key| storage.as_ref().and_then(|s| s.get_item(key).unwrap_or(None)))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Self::default()
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    match raw.as_deref().map(str::trim).map(str::parse::<T>) {
        Some(Ok(value)) => value,
        _ => default,
    }
}
