//! # monitor-client
//!
//! Leptos + WASM frontend pieces for the camera monitor: the detection-zone
//! editor host and the event notification pipeline.
//!
//! | Module | Role |
//! |--------|------|
//! | `config` | `MonitorConfig` read from `localStorage` overrides |
//! | `net` | Event DTOs and REST helpers |
//! | `poller` | `EventPoller`, periodic new-event detection |
//! | `state` | Toast stack and zone editor panel snapshots |
//! | `components` | `ZoneEditor` and `NotificationToasts` |
//! | `util` | DOM input, viewport and image loading glue |
//!
//! Zone editing itself lives in the `zone-canvas` crate.

pub mod components;
pub mod config;
pub mod net;
pub mod poller;
pub mod state;
pub mod util;

/// Route panics and `log` output to the browser console. Call once at startup.
#[cfg(feature = "hydrate")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        leptos::logging::warn!("console logger already initialised: {err}");
    }
}
